use crate::navigate::{KNOWN_OBSTACLE_WIDTH_CM, MOVING_FOCAL_LENGTH, STATIC_FOCAL_LENGTH};
use serde::Deserialize;
use spark_detect::{DetectionError, ObstacleClass};
use std::fmt::{Display, Formatter};

/// Pinhole calibration for one obstacle class.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct CalibrationProfile {
    /// Real-world width of the obstacle, in centimeters.
    pub known_width: f32,
    /// Focal length in pixels.
    pub focal_length: f32,
}

impl CalibrationProfile {
    pub const fn new(known_width: f32, focal_length: f32) -> Self {
        Self {
            known_width,
            focal_length,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.known_width.is_finite()
            && self.focal_length.is_finite()
            && self.known_width > 0.0
            && self.focal_length > 0.0
    }

    /// Focal length from a reference shot of an object of known width at a known distance.
    ///
    /// Args:
    ///     pixel_width (f32): Width of the object's bounding box in the reference shot.
    ///     known_distance (f32): Camera-to-object distance of the reference shot, in centimeters.
    ///     known_width (f32): Physical width of the object, in centimeters.
    pub fn focal_length_from_reference(
        pixel_width: f32,
        known_distance: f32,
        known_width: f32,
    ) -> f32 {
        (pixel_width * known_distance) / known_width
    }
}

/// Per-class calibration table.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalibrationSet {
    pub moving: CalibrationProfile,
    #[serde(rename = "static")]
    pub stationary: CalibrationProfile,
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self {
            moving: CalibrationProfile::new(KNOWN_OBSTACLE_WIDTH_CM, MOVING_FOCAL_LENGTH),
            stationary: CalibrationProfile::new(KNOWN_OBSTACLE_WIDTH_CM, STATIC_FOCAL_LENGTH),
        }
    }
}

impl CalibrationSet {
    pub fn profile(&self, class: ObstacleClass) -> &CalibrationProfile {
        match class {
            ObstacleClass::MovingObstacle => &self.moving,
            ObstacleClass::StaticObstacle => &self.stationary,
        }
    }
}

/// Camera-to-obstacle distance in centimeters, valid for the current frame only.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct DistanceEstimate(f32);

impl Display for DistanceEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}cm", self.0)
    }
}

impl DistanceEstimate {
    /// `|known_width * focal_length| / pixel_width`.
    ///
    /// A zero, negative or non-finite pixel width is a degenerate detection.
    pub fn estimate(
        pixel_width: f32,
        calibration: &CalibrationProfile,
    ) -> Result<Self, DetectionError> {
        if !pixel_width.is_finite() || pixel_width <= 0.0 {
            return Err(DetectionError::DegenerateDetection { width: pixel_width });
        }

        Ok(DistanceEstimate(
            (calibration.known_width * calibration.focal_length).abs() / pixel_width,
        ))
    }

    pub fn centimeters(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_pinhole_formula() -> anyhow::Result<()> {
        let calibration = CalibrationProfile::new(35.0, 600.0);
        assert_eq!(DistanceEstimate::estimate(70.0, &calibration)?.centimeters(), 300.0);
        assert_eq!(DistanceEstimate::estimate(210.0, &calibration)?.centimeters(), 100.0);
        Ok(())
    }

    #[test]
    fn shrinks_as_the_box_grows() -> anyhow::Result<()> {
        let calibration = CalibrationProfile::new(35.0, 630.0);
        let mut previous = f32::INFINITY;
        for width in [1.0, 12.5, 40.0, 99.0, 220.5, 352.0, 639.0] {
            let distance = DistanceEstimate::estimate(width, &calibration)?.centimeters();
            assert!(distance < previous);
            previous = distance;
        }
        Ok(())
    }

    #[test]
    fn negative_calibration_is_taken_by_magnitude() -> anyhow::Result<()> {
        let calibration = CalibrationProfile::new(-35.0, 600.0);
        assert_eq!(DistanceEstimate::estimate(70.0, &calibration)?.centimeters(), 300.0);
        assert!(!calibration.is_valid());
        Ok(())
    }

    #[test]
    fn rejects_degenerate_widths() {
        let calibration = CalibrationProfile::new(35.0, 600.0);
        for width in [0.0, -4.0, f32::NAN] {
            assert!(matches!(
                DistanceEstimate::estimate(width, &calibration),
                Err(DetectionError::DegenerateDetection { .. })
            ));
        }
    }

    #[test]
    fn profile_is_chosen_by_class() {
        let set = CalibrationSet::default();
        assert_eq!(set.profile(ObstacleClass::MovingObstacle).focal_length, 600.0);
        assert_eq!(set.profile(ObstacleClass::StaticObstacle).focal_length, 630.0);
    }

    #[test]
    fn focal_length_from_reference_shot() {
        // A 35cm target at 90cm spanning 233.3px.
        let focal = CalibrationProfile::focal_length_from_reference(233.33334, 90.0, 35.0);
        assert!((focal - 600.0).abs() < 0.01);
    }
}
