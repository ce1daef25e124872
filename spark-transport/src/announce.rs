use crate::error::TransportError;
use std::fmt::{Display, Formatter};

/// A path-planner status code, optionally tagged with the command sequence it follows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Announcement<'a> {
    pub code: &'a str,
    pub sequence_id: Option<u32>,
}

impl<'a> Announcement<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            code,
            sequence_id: None,
        }
    }

    pub fn with_sequence(code: &'a str, sequence_id: u32) -> Self {
        Self {
            code,
            sequence_id: Some(sequence_id),
        }
    }
}

impl Display for Announcement<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.sequence_id {
            Some(id) => write!(f, "{} (#{})", self.code, id),
            None => write!(f, "{}", self.code),
        }
    }
}

pub trait AnnouncementSink: Send + Sync {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError>;
}

impl<T: AnnouncementSink + ?Sized> AnnouncementSink for Box<T> {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError> {
        (**self).announce(announcement)
    }
}

impl<T: AnnouncementSink + ?Sized> AnnouncementSink for std::sync::Arc<T> {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError> {
        (**self).announce(announcement)
    }
}
