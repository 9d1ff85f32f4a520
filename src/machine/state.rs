//! Runtime motion state.
//!
//! One state machine controls the whole core and only the tick context
//! drives its transitions. Interpolation scratch state lives inside the
//! `Stepping` variant, so it exists exactly as long as a segment is being
//! executed.

use crate::motion::LineInterpolator;

/// Sub-phase of the homing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HomingPhase {
    /// Step the carriage away from the switch first, so the power-on jolt
    /// (or a carriage parked on the switch) cannot fake a trigger.
    Clear,
    /// Step toward the switch at reduced rate until it closes.
    Seek,
    /// Back off at the slowest rate until the switch opens again; the
    /// release edge is the Y reference.
    Release,
}

/// The controlling state of the motion core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MotionState {
    /// Establishing the Y reference against the home switch.
    Homing(HomingPhase),
    /// Idle at a position; commands are consumed from this state.
    Ready,
    /// Executing one interpolated segment.
    Stepping(LineInterpolator),
}

/// Snapshot of the machine's activity, for status queries and displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineStatus {
    /// Seeking the home switch.
    Homing,
    /// Idle, waiting for commands.
    Ready,
    /// Executing a motion segment.
    Stepping,
}

impl MotionState {
    /// Collapse to the public status snapshot.
    pub(crate) fn status(&self) -> MachineStatus {
        match self {
            MotionState::Homing(_) => MachineStatus::Homing,
            MotionState::Ready => MachineStatus::Ready,
            MotionState::Stepping(_) => MachineStatus::Stepping,
        }
    }
}
