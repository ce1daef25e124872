pub mod detection;
pub mod error;
pub mod source;

pub use detection::{BoundingBox, Detection, DetectionFrame, ObstacleClass, Point, RawDetection};
pub use error::DetectionError;
pub use source::DetectionSource;
