mod json_lines;

pub use json_lines::JsonLinesSource;

use crate::detection::DetectionFrame;

/// Supplies detector output one frame at a time.
pub trait DetectionSource {
    /// Returns the next frame, or `None` once the producer is exhausted.
    async fn next_frame(&mut self) -> anyhow::Result<Option<DetectionFrame>>;
}
