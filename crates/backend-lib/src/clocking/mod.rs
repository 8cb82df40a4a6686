//! Work-session clock state.

mod coordinator;
mod state;

pub use coordinator::{ClockInOutcome, ClockOutOutcome, ClockingCoordinator};
pub use state::{ClockEvent, ClockState, SessionStateMachine, TransitionRejected};
