use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Direction {
    Left,
    Right,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

impl Direction {
    /// Lateral direction of an obstacle relative to the frame midpoint.
    ///
    /// A centroid left of the midpoint (in image coordinates) is `Right`, anything
    /// else is `Left`. The steering rules are written against this mapping.
    pub fn from_centroid(centroid_x: f32, frame_mid_x: f32) -> Self {
        if centroid_x < frame_mid_x {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Sign of the lateral velocity that steers toward this side. Right is positive.
    pub fn lateral_sign(&self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}
