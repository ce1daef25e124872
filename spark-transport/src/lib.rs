pub mod error;
pub mod logging;
pub mod motion;
pub mod announce;
pub mod recording;
pub mod serial;
pub mod zenoh_link;

pub use announce::{Announcement, AnnouncementSink};
pub use error::TransportError;
pub use motion::{MotionCommand, MotionSink};
