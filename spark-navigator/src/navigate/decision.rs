use crate::navigate::pattern::{BlockPattern, BlockPatternResolver};
use crate::navigate::property::direction::Direction;
use crate::navigate::property::distance::DistanceEstimate;
use crate::navigate::property::gap::FrameObstacleSet;
use crate::navigate::property::zone::LateralZone;
use crate::navigate::{
    CONGESTION_GAP, CONGESTION_RANGE_CM, CONGESTION_STOP_DISTANCE_CM, MOVING_STOP_DISTANCE_CM,
    STATIC_STOP_DISTANCE_CM,
};
use serde::Deserialize;
use spark_detect::{Detection, ObstacleClass};
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub moving_stop_cm: f32,
    pub static_stop_cm: f32,
    pub congestion_range_cm: f32,
    pub congestion_gap: u32,
    pub congestion_stop_cm: f32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            moving_stop_cm: MOVING_STOP_DISTANCE_CM,
            static_stop_cm: STATIC_STOP_DISTANCE_CM,
            congestion_range_cm: CONGESTION_RANGE_CM,
            congestion_gap: CONGESTION_GAP,
            congestion_stop_cm: CONGESTION_STOP_DISTANCE_CM,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum NavigationDecision {
    Clear,
    StopAndSteer {
        direction: Direction,
        pattern: BlockPattern,
    },
    StopOnly,
    StopAndBlock(BlockPattern),
}

impl Display for NavigationDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationDecision::Clear => write!(f, "clear"),
            NavigationDecision::StopAndSteer { direction, pattern } => {
                write!(f, "stop and steer {} ({})", direction, pattern)
            }
            NavigationDecision::StopOnly => write!(f, "stop"),
            NavigationDecision::StopAndBlock(pattern) => write!(f, "stop and block ({})", pattern),
        }
    }
}

/// Everything the rules need to know about one detection in the current frame.
#[derive(Copy, Clone, Debug)]
pub struct ObstacleAssessment {
    pub detection: Detection,
    pub distance: DistanceEstimate,
    pub direction: Direction,
    pub zone: LateralZone,
}

impl Display for ObstacleAssessment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "track {} ({}): distance {}, direction {}, zone {}",
            self.detection.track_id,
            self.detection.class,
            self.distance,
            self.direction,
            self.zone
        )
    }
}

/// R1 and R2. Moving obstacles are steered around, static ones stop the vehicle.
///
/// The right-hand steer uses `<` and the left-hand steer `<=`.
pub fn avoidance_rule(
    assessment: &ObstacleAssessment,
    thresholds: &RuleThresholds,
) -> Option<NavigationDecision> {
    let distance = assessment.distance.centimeters();
    let moving_stop = thresholds.moving_stop_cm;
    match (assessment.detection.class, assessment.direction) {
        (ObstacleClass::MovingObstacle, Direction::Right) if distance < moving_stop => {
            Some(NavigationDecision::StopAndSteer {
                direction: Direction::Right,
                pattern: BlockPattern::SteerRight,
            })
        }
        (ObstacleClass::MovingObstacle, Direction::Left) if distance <= moving_stop => {
            Some(NavigationDecision::StopAndSteer {
                direction: Direction::Left,
                pattern: BlockPattern::SteerLeft,
            })
        }
        (ObstacleClass::StaticObstacle, _) if distance <= thresholds.static_stop_cm => {
            Some(NavigationDecision::StopOnly)
        }
        _ => None,
    }
}

/// R3. Two obstacles closer together than the vehicle can pass, one of them near.
pub fn congestion_rule(
    assessment: &ObstacleAssessment,
    obstacles: &FrameObstacleSet,
    resolver: &BlockPatternResolver,
    thresholds: &RuleThresholds,
) -> Option<NavigationDecision> {
    let distance = assessment.distance.centimeters();
    if obstacles.len() < 2 || distance >= thresholds.congestion_range_cm {
        return None;
    }

    let closest = obstacles.closest_pair()?;
    if closest.truncated_gap() < thresholds.congestion_gap
        && distance <= thresholds.congestion_stop_cm
    {
        let pattern = resolver.resolve(assessment.zone, assessment.detection.pixel_width());
        return Some(NavigationDecision::StopAndBlock(pattern));
    }

    None
}

/// Runs every rule against one detection. R1 and R2 are exclusive; R3 is checked
/// independently, so one detection can yield two decisions. Returns `[Clear]`
/// when nothing fires.
pub fn evaluate(
    assessment: &ObstacleAssessment,
    obstacles: &FrameObstacleSet,
    resolver: &BlockPatternResolver,
    thresholds: &RuleThresholds,
) -> Vec<NavigationDecision> {
    let decisions: Vec<_> = avoidance_rule(assessment, thresholds)
        .into_iter()
        .chain(congestion_rule(assessment, obstacles, resolver, thresholds))
        .collect();

    if decisions.is_empty() {
        vec![NavigationDecision::Clear]
    } else {
        decisions
    }
}
