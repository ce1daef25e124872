use thiserror::Error;

/// Reasons a single detector output cannot take part in the navigation rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("unknown obstacle class id {0}")]
    UnknownObstacleClass(u8),

    #[error("detection has no track id")]
    MissingTrackId,

    #[error("degenerate detection: pixel width {width}")]
    DegenerateDetection { width: f32 },
}
