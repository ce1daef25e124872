use crate::navigate::{LEFT_ZONE_MAX_X, MID_ZONE_MAX_X, MID_ZONE_MIN_X, NARROW_MAX_WIDTH};
use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// Pixel-space boundaries used to place an obstacle on the planner's grid.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoneBoundaries {
    pub left_max_x: f32,
    pub mid_min_x: f32,
    pub mid_max_x: f32,
    pub narrow_max_width: f32,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        Self {
            left_max_x: LEFT_ZONE_MAX_X,
            mid_min_x: MID_ZONE_MIN_X,
            mid_max_x: MID_ZONE_MAX_X,
            narrow_max_width: NARROW_MAX_WIDTH,
        }
    }
}

impl ZoneBoundaries {
    pub fn is_ordered(&self) -> bool {
        self.left_max_x < self.mid_min_x
            && self.mid_min_x <= self.mid_max_x
            && self.narrow_max_width > 0.0
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum LateralZone {
    Left,
    Mid,
    Right,
}

impl Display for LateralZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LateralZone::Left => write!(f, "left"),
            LateralZone::Mid => write!(f, "mid"),
            LateralZone::Right => write!(f, "right"),
        }
    }
}

impl LateralZone {
    /// `x <= left_max_x` is Left, `mid_min_x <= x <= mid_max_x` is Mid, everything
    /// else is Right, including centroids that fall between `left_max_x` and `mid_min_x`.
    pub fn classify(centroid_x: f32, boundaries: &ZoneBoundaries) -> Self {
        if centroid_x <= boundaries.left_max_x {
            LateralZone::Left
        } else if centroid_x >= boundaries.mid_min_x && centroid_x <= boundaries.mid_max_x {
            LateralZone::Mid
        } else {
            LateralZone::Right
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum WidthClass {
    Narrow,
    Wide,
}

impl Display for WidthClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthClass::Narrow => write!(f, "narrow"),
            WidthClass::Wide => write!(f, "wide"),
        }
    }
}

impl WidthClass {
    pub fn classify(pixel_width: f32, boundaries: &ZoneBoundaries) -> Self {
        if pixel_width <= boundaries.narrow_max_width {
            WidthClass::Narrow
        } else {
            WidthClass::Wide
        }
    }
}
