//! Clock-in/clock-out state machine.
//!
//! Two states, cyclic, with `NotClockedIn` as the default when the stored
//! flag has never been set.
use timeclock_common::EmployeeNo;

use crate::directory::{Applied, DirectoryHandle, FieldChanges, Step};
use crate::error::CoreError;

/// Clock state of one employee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockState {
    #[default]
    NotClockedIn,
    ClockedIn,
}

/// Requested transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    ClockIn,
    ClockOut,
}

/// A transition that is not valid from the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejected {
    AlreadyClockedIn,
    NotClockedIn,
}

impl ClockState {
    /// Normalize the stored tri-state flag
    pub fn from_stored(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => ClockState::ClockedIn,
            Some(false) | None => ClockState::NotClockedIn,
        }
    }

    pub fn is_clocked_in(self) -> bool {
        self == ClockState::ClockedIn
    }

    /// The only source of truth for which transitions are valid
    pub fn next(self, event: ClockEvent) -> Result<ClockState, TransitionRejected> {
        match (self, event) {
            (ClockState::NotClockedIn, ClockEvent::ClockIn) => Ok(ClockState::ClockedIn),
            (ClockState::ClockedIn, ClockEvent::ClockIn) => Err(TransitionRejected::AlreadyClockedIn),
            (ClockState::ClockedIn, ClockEvent::ClockOut) => Ok(ClockState::NotClockedIn),
            (ClockState::NotClockedIn, ClockEvent::ClockOut) => Err(TransitionRejected::NotClockedIn),
        }
    }
}

/// Applies clock transitions to directory records
#[derive(Clone)]
pub struct SessionStateMachine {
    directory: DirectoryHandle,
}

impl SessionStateMachine {
    pub fn new(directory: DirectoryHandle) -> Self {
        Self { directory }
    }

    /// Current state, `None` when the employee does not exist
    pub async fn current(&self, employee_no: EmployeeNo) -> Result<Option<ClockState>, CoreError> {
        let record = self.directory.find(employee_no).await?;
        Ok(record.map(|r| r.clock_state()))
    }

    /// Apply `event` to the stored state with a conditional write.
    ///
    /// A rejected transition writes nothing.
    pub async fn apply(
        &self,
        employee_no: EmployeeNo,
        event: ClockEvent,
    ) -> Result<Applied<Result<ClockState, TransitionRejected>>, CoreError> {
        self.directory
            .read_check_write(employee_no, |record| {
                match record.clock_state().next(event) {
                    Ok(next) => Step::Write(
                        FieldChanges {
                            is_clocked_in: Some(next.is_clocked_in()),
                            ..FieldChanges::default()
                        },
                        Ok(next),
                    ),
                    Err(rejected) => Step::Stop(Err(rejected)),
                }
            })
            .await
    }
}
