use crate::error::DetectionError;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(TryFromPrimitive, Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum ObstacleClass {
    MovingObstacle = 0,
    StaticObstacle = 1,
}

impl Display for ObstacleClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObstacleClass::MovingObstacle => write!(f, "moving obstacle"),
            ObstacleClass::StaticObstacle => write!(f, "static obstacle"),
        }
    }
}

impl ObstacleClass {
    pub fn from_id(class_id: u8) -> Result<Self, DetectionError> {
        Self::try_from(class_id).map_err(|e| DetectionError::UnknownObstacleClass(e.number))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn euclidean_distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned box in pixel space, corners as emitted by the detector.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn centroid(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// One detector output exactly as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: u8,
    #[serde(default)]
    pub track_id: Option<u32>,
    pub bbox: BoundingBox,
}

impl RawDetection {
    pub fn new(class_id: u8, track_id: Option<u32>, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            track_id,
            bbox,
        }
    }
}

/// A tracked detection whose class id has been resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Detection {
    pub class: ObstacleClass,
    pub track_id: u32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn centroid(&self) -> Point {
        self.bbox.centroid()
    }

    pub fn pixel_width(&self) -> f32 {
        self.bbox.width()
    }

    pub fn pixel_height(&self) -> f32 {
        self.bbox.height()
    }
}

impl TryFrom<&RawDetection> for Detection {
    type Error = DetectionError;

    fn try_from(raw: &RawDetection) -> Result<Self, Self::Error> {
        let track_id = raw.track_id.ok_or(DetectionError::MissingTrackId)?;
        let class = ObstacleClass::from_id(raw.class_id)?;
        Ok(Detection {
            class,
            track_id,
            bbox: raw.bbox,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(default)]
    pub frame_index: u64,
    /// Frame size in pixels, when the producer knows it.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl DetectionFrame {
    pub fn new(frame_index: u64, detections: Vec<RawDetection>) -> Self {
        Self {
            frame_index,
            width: None,
            height: None,
            detections,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Detections that carry a track id. Untracked outputs are dropped here and
    /// never reach the rules or the gap computation.
    pub fn tracked(&self) -> impl Iterator<Item = &RawDetection> {
        self.detections.iter().filter(|d| d.track_id.is_some())
    }
}
