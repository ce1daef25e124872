use crate::announce::{Announcement, AnnouncementSink};
use crate::error::TransportError;
use crate::motion::{MotionCommand, MotionSink};
use log::info;

/// Dry-run motion sink: commands are only logged.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogMotionSink;

impl MotionSink for LogMotionSink {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError> {
        info!("[dry-run] motion {}", command);
        Ok(())
    }
}

/// Dry-run announcement sink.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogAnnouncer;

impl AnnouncementSink for LogAnnouncer {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError> {
        info!("[dry-run] announce {}", announcement);
        Ok(())
    }
}
