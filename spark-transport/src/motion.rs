use crate::error::TransportError;
use std::fmt::{Display, Formatter};

/// Velocity command for the motor controller, in controller units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MotionCommand {
    pub sequence_id: u32,
    /// Right is positive.
    pub lateral: i32,
    pub forward: i32,
    pub rotation: i32,
}

impl MotionCommand {
    pub const STOP: MotionCommand = MotionCommand {
        sequence_id: 0,
        lateral: 0,
        forward: 0,
        rotation: 0,
    };

    pub fn lateral(sequence_id: u32, lateral: i32) -> Self {
        Self {
            sequence_id,
            lateral,
            forward: 0,
            rotation: 0,
        }
    }

    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}

impl Display for MotionCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} lateral={} forward={} rotation={}",
            self.sequence_id, self.lateral, self.forward, self.rotation
        )
    }
}

/// Fire-and-forget sink for motion commands. No acknowledgement, no retry.
pub trait MotionSink: Send + Sync {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError>;
}

impl<T: MotionSink + ?Sized> MotionSink for Box<T> {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError> {
        (**self).send(command)
    }
}

impl<T: MotionSink + ?Sized> MotionSink for std::sync::Arc<T> {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError> {
        (**self).send(command)
    }
}
