use crate::navigate::engine::{CommandSequenceId, Maneuver, Step};
use crate::navigate::pattern::RESUME_CODE;
use log::{error, info};
use spark_transport::{Announcement, AnnouncementSink, MotionCommand, MotionSink, TransportError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("track {track_id}: {step} failed: {source}")]
    Transport {
        track_id: u32,
        step: String,
        #[source]
        source: TransportError,
    },
}

/// Executes maneuvers against the motor controller and the route planner.
///
/// Commands are fire-and-forget. A failed step ends its maneuver, so a steer is
/// never sent after a stop that did not go out, and the sequence id only moves
/// once a steer has been sent and has settled.
pub struct CommandDispatcher<M, A> {
    motion: M,
    announcer: A,
    sequence: CommandSequenceId,
}

impl<M: MotionSink, A: AnnouncementSink> CommandDispatcher<M, A> {
    pub fn new(motion: M, announcer: A, sequence: CommandSequenceId) -> Self {
        Self {
            motion,
            announcer,
            sequence,
        }
    }

    pub async fn execute(&self, maneuver: &Maneuver) -> Result<(), DispatchError> {
        info!("Track {}: {}", maneuver.track_id, maneuver.decision);

        for step in &maneuver.steps {
            let sent = match step {
                Step::Motion(command) => {
                    if command.is_stop() {
                        info!("---STOP---");
                    } else {
                        info!("Steering {}", command);
                    }
                    self.motion.send(command)
                }
                Step::Steer { lateral } => {
                    let command = MotionCommand::lateral(self.sequence.current(), *lateral);
                    info!("Steering {}", command);
                    self.motion.send(&command)
                }
                Step::Announce { code } => self.announce(Announcement::new(code)),
                Step::Resume { advance: false } => self.announce(Announcement::new(RESUME_CODE)),
                Step::Resume { advance: true } => {
                    let next = self.sequence.advance();
                    self.announce(Announcement::with_sequence(RESUME_CODE, next))
                }
                Step::Settle { phase, ticks, tick } => {
                    for i in 1..=*ticks {
                        info!("{} {}", phase, i);
                        tokio::time::sleep(*tick).await;
                    }
                    Ok(())
                }
            };

            sent.map_err(|source| DispatchError::Transport {
                track_id: maneuver.track_id,
                step: step.to_string(),
                source,
            })?;
        }

        Ok(())
    }

    fn announce(&self, announcement: Announcement<'_>) -> Result<(), TransportError> {
        info!("Announcing {}", announcement);
        self.announcer.announce(&announcement)
    }

    /// Runs maneuvers one after another. A failed maneuver is logged and the
    /// next one still runs.
    pub async fn execute_all(&self, maneuvers: &[Maneuver]) -> usize {
        let mut failed = 0;
        for maneuver in maneuvers {
            if let Err(e) = self.execute(maneuver).await {
                error!("{}", e);
                failed += 1;
            }
        }
        failed
    }
}
