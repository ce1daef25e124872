//! In-memory sinks that keep everything they are given, in order.

use crate::announce::{Announcement, AnnouncementSink};
use crate::error::TransportError;
use crate::motion::{MotionCommand, MotionSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;

/// One outbound event as seen by a recording sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recorded {
    Motion(MotionCommand),
    Announce {
        code: String,
        sequence_id: Option<u32>,
    },
}

#[derive(Default)]
struct Journal {
    entries: Vec<(Instant, Recorded)>,
    fail_motion: bool,
    fail_announce: bool,
}

/// Shared journal behind both recording sinks, so a test sees one ordered timeline.
#[derive(Clone, Default)]
pub struct RecordingLink {
    inner: Arc<Mutex<Journal>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn motion_sink(&self) -> RecordingMotionSink {
        RecordingMotionSink(self.clone())
    }

    pub fn announcer(&self) -> RecordingAnnouncer {
        RecordingAnnouncer(self.clone())
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.inner.lock().entries.iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn timed_events(&self) -> Vec<(Instant, Recorded)> {
        self.inner.lock().entries.clone()
    }

    pub fn motions(&self) -> Vec<MotionCommand> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter_map(|(_, e)| match e {
                Recorded::Motion(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn announcements(&self) -> Vec<(String, Option<u32>)> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter_map(|(_, e)| match e {
                Recorded::Announce { code, sequence_id } => Some((code.clone(), *sequence_id)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Makes every following motion command fail as if the link were unplugged.
    pub fn fail_motion(&self, fail: bool) {
        self.inner.lock().fail_motion = fail;
    }

    pub fn fail_announce(&self, fail: bool) {
        self.inner.lock().fail_announce = fail;
    }
}

#[derive(Clone)]
pub struct RecordingMotionSink(RecordingLink);

impl MotionSink for RecordingMotionSink {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError> {
        let mut journal = self.0.inner.lock();
        if journal.fail_motion {
            return Err(TransportError::unavailable("recording motion sink", "injected failure"));
        }
        journal
            .entries
            .push((Instant::now(), Recorded::Motion(*command)));
        Ok(())
    }
}

#[derive(Clone)]
pub struct RecordingAnnouncer(RecordingLink);

impl AnnouncementSink for RecordingAnnouncer {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError> {
        let mut journal = self.0.inner.lock();
        if journal.fail_announce {
            return Err(TransportError::unavailable("recording announcer", "injected failure"));
        }
        journal.entries.push((
            Instant::now(),
            Recorded::Announce {
                code: announcement.code.to_string(),
                sequence_id: announcement.sequence_id,
            },
        ));
        Ok(())
    }
}
