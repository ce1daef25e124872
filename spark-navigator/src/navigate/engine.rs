use crate::config::{ManeuverConfig, NavigatorConfig};
use crate::navigate::decision::{self, NavigationDecision, ObstacleAssessment, RuleThresholds};
use crate::navigate::pattern::BlockPatternResolver;
use crate::navigate::property::direction::Direction;
use crate::navigate::property::distance::{CalibrationSet, DistanceEstimate};
use crate::navigate::property::gap::FrameObstacleSet;
use log::{debug, info, warn};
use spark_detect::{Detection, DetectionError, DetectionFrame};
use spark_transport::MotionCommand;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Counter carried by steering commands and the resume announcement that follows them.
///
/// The engine and the dispatcher share one counter. Only a steer that has been
/// sent and has settled advances it.
#[derive(Clone, Debug)]
pub struct CommandSequenceId(Arc<AtomicU32>);

impl CommandSequenceId {
    pub fn new(initial: u32) -> Self {
        Self(Arc::new(AtomicU32::new(initial)))
    }

    pub fn current(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Wraps at `u32::MAX`.
    pub(crate) fn advance(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SettlePhase {
    /// Holding still after a stop.
    Stop,
    /// Letting a lateral command play out.
    Running,
}

impl Display for SettlePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlePhase::Stop => write!(f, "STOP"),
            SettlePhase::Running => write!(f, "RUNNING"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Step {
    Motion(MotionCommand),
    /// Lateral command, stamped with the current sequence id when it is sent.
    Steer { lateral: i32 },
    Announce { code: &'static str },
    Settle {
        phase: SettlePhase,
        ticks: u32,
        tick: Duration,
    },
    /// Path-resume announcement. After a steer the sequence id is advanced first
    /// and the new value goes out with it.
    Resume { advance: bool },
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Motion(command) => write!(f, "motion {}", command),
            Step::Steer { lateral } => write!(f, "steer {}", lateral),
            Step::Announce { code } => write!(f, "announce {}", code),
            Step::Settle { phase, ticks, .. } => write!(f, "settle {} x{}", phase, ticks),
            Step::Resume { advance: true } => write!(f, "resume (next sequence)"),
            Step::Resume { advance: false } => write!(f, "resume"),
        }
    }
}

/// The ordered command sequence produced for one decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    pub track_id: u32,
    pub decision: NavigationDecision,
    pub steps: Vec<Step>,
}

impl Maneuver {
    pub fn settle_time(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Settle { ticks, tick, .. } => *tick * *ticks,
                _ => Duration::ZERO,
            })
            .sum()
    }
}

#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    Skipped {
        index: usize,
        reason: DetectionError,
    },
    Assessed {
        assessment: ObstacleAssessment,
        decisions: Vec<NavigationDecision>,
    },
}

/// Per-detection results for one frame, before anything is planned.
#[derive(Debug, Clone, Default)]
pub struct FrameAssessment {
    pub obstacle_count: usize,
    pub outcomes: Vec<DetectionOutcome>,
}

impl FrameAssessment {
    pub fn decisions(&self) -> impl Iterator<Item = (u32, NavigationDecision)> + '_ {
        self.outcomes.iter().flat_map(|outcome| match outcome {
            DetectionOutcome::Assessed {
                assessment,
                decisions,
            } => decisions
                .iter()
                .map(|d| (assessment.detection.track_id, *d))
                .collect::<Vec<_>>(),
            DetectionOutcome::Skipped { .. } => Vec::new(),
        })
    }
}

/// Per-frame decision state machine. Across frames it keeps only the command
/// sequence id and the end of the current settle window.
pub struct NavigationEngine {
    calibration: CalibrationSet,
    thresholds: RuleThresholds,
    resolver: BlockPatternResolver,
    maneuver: ManeuverConfig,
    default_frame_width: u32,
    sequence: CommandSequenceId,
    cooldown_until: Option<Instant>,
    last_frame_at: Option<Instant>,
}

impl NavigationEngine {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            calibration: config.calibration,
            thresholds: config.thresholds,
            resolver: BlockPatternResolver::new(config.zones),
            maneuver: config.maneuver.clone(),
            default_frame_width: config.camera.frame_width,
            sequence: CommandSequenceId::new(config.maneuver.initial_sequence_id),
            cooldown_until: None,
            last_frame_at: None,
        }
    }

    pub fn sequence_id(&self) -> u32 {
        self.sequence.current()
    }

    /// Handle for the dispatcher, which advances the id once a steer completes.
    pub fn sequence(&self) -> CommandSequenceId {
        self.sequence.clone()
    }

    pub fn cooldown_until(&self) -> Option<Instant> {
        self.cooldown_until
    }

    pub fn is_settling(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Estimates distance, direction and zone for every tracked detection and runs
    /// the rules. Nothing is planned and no state changes.
    pub fn assess(&self, frame: &DetectionFrame) -> FrameAssessment {
        let frame_width = frame.width.unwrap_or(self.default_frame_width);
        let frame_mid_x = frame_width as f32 / 2.0;

        let tracked: Vec<_> = frame.tracked().collect();
        let skipped_untracked = frame.detections.len() - tracked.len();
        if skipped_untracked > 0 {
            debug!(
                "Frame {}: skipping {} detection(s) without track id",
                frame.frame_index, skipped_untracked
            );
        }

        let obstacles =
            FrameObstacleSet::new(tracked.iter().map(|d| d.bbox.centroid()).collect());

        let outcomes = tracked
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let assessed = Detection::try_from(*raw).and_then(|detection| {
                    let distance = DistanceEstimate::estimate(
                        detection.pixel_width(),
                        self.calibration.profile(detection.class),
                    )?;
                    let centroid_x = detection.centroid().x;
                    Ok(ObstacleAssessment {
                        detection,
                        distance,
                        direction: Direction::from_centroid(centroid_x, frame_mid_x),
                        zone: self.resolver.zone(centroid_x),
                    })
                });

                match assessed {
                    Ok(assessment) => {
                        debug!("Frame {}: {}", frame.frame_index, assessment);
                        let decisions = decision::evaluate(
                            &assessment,
                            &obstacles,
                            &self.resolver,
                            &self.thresholds,
                        );
                        DetectionOutcome::Assessed {
                            assessment,
                            decisions,
                        }
                    }
                    Err(reason) => {
                        match reason {
                            DetectionError::UnknownObstacleClass(_) => warn!(
                                "Frame {}: detection {} rejected: {}",
                                frame.frame_index, index, reason
                            ),
                            _ => debug!(
                                "Frame {}: detection {} skipped: {}",
                                frame.frame_index, index, reason
                            ),
                        }
                        DetectionOutcome::Skipped { index, reason }
                    }
                }
            })
            .collect();

        FrameAssessment {
            obstacle_count: obstacles.len(),
            outcomes,
        }
    }

    /// Assesses a frame and plans a maneuver for every decision that is not `Clear`.
    ///
    /// While a previously planned settle window is still open, the frame is only
    /// observed and nothing is planned. Planning a maneuver opens a new window
    /// covering the settle time of every maneuver returned.
    pub fn process_frame(&mut self, frame: &DetectionFrame, now: Instant) -> Vec<Maneuver> {
        if let Some(previous) = self.last_frame_at.replace(now) {
            let elapsed = now.saturating_duration_since(previous).as_secs_f32();
            if elapsed > 0.0 {
                debug!("Frame {}: {:.1} fps", frame.frame_index, 1.0 / elapsed);
            }
        }
        debug!(
            "Frame {}: {} detection(s)",
            frame.frame_index,
            frame.detections.len()
        );

        if self.is_settling(now) {
            debug!("Frame {}: settling, decisions suppressed", frame.frame_index);
            return Vec::new();
        }

        let assessment = self.assess(frame);
        let maneuvers: Vec<Maneuver> = assessment
            .decisions()
            .filter(|(_, decision)| *decision != NavigationDecision::Clear)
            .map(|(track_id, decision)| {
                info!("Frame {}: track {} -> {}", frame.frame_index, track_id, decision);
                self.plan(track_id, decision)
            })
            .collect();

        if !maneuvers.is_empty() {
            let settle: Duration = maneuvers.iter().map(Maneuver::settle_time).sum();
            self.cooldown_until = Some(now + settle);
        }

        maneuvers
    }

    fn plan(&self, track_id: u32, decision: NavigationDecision) -> Maneuver {
        let (ticks, tick) = (self.maneuver.settle_ticks, self.maneuver.tick());
        let hold = move |phase| Step::Settle { phase, ticks, tick };

        let steps = match decision {
            NavigationDecision::Clear => Vec::new(),
            NavigationDecision::StopOnly => vec![
                Step::Motion(MotionCommand::STOP),
                hold(SettlePhase::Stop),
                Step::Resume { advance: false },
            ],
            NavigationDecision::StopAndBlock(pattern) => vec![
                Step::Motion(MotionCommand::STOP),
                Step::Announce {
                    code: pattern.code(),
                },
                hold(SettlePhase::Stop),
                Step::Resume { advance: false },
            ],
            NavigationDecision::StopAndSteer { direction, pattern } => vec![
                Step::Motion(MotionCommand::STOP),
                Step::Announce {
                    code: pattern.code(),
                },
                hold(SettlePhase::Stop),
                Step::Steer {
                    lateral: direction.lateral_sign() * self.maneuver.lateral_speed,
                },
                hold(SettlePhase::Running),
                Step::Resume { advance: true },
            ],
        };

        Maneuver {
            track_id,
            decision,
            steps,
        }
    }
}
