//! Clocking coordinator: caller-facing clock-in/clock-out operations.
use metrics::counter;
use timeclock_common::EmployeeNo;

use super::state::{ClockEvent, SessionStateMachine};
use crate::directory::{Applied, DirectoryHandle};
use crate::error::CoreError;
use crate::metrics::{CLOCK_IN, CLOCK_OUT};

/// Outcome of a clock-in request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockInOutcome {
    Success,
    AlreadyClockedIn,
    NotFound,
}

/// Outcome of a clock-out request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutOutcome {
    Success,
    NotClockedIn,
    NotFound,
}

impl ClockInOutcome {
    fn label(self) -> &'static str {
        match self {
            ClockInOutcome::Success => "success",
            ClockInOutcome::AlreadyClockedIn => "already_clocked_in",
            ClockInOutcome::NotFound => "not_found",
        }
    }
}

impl ClockOutOutcome {
    fn label(self) -> &'static str {
        match self {
            ClockOutOutcome::Success => "success",
            ClockOutOutcome::NotClockedIn => "not_clocked_in",
            ClockOutOutcome::NotFound => "not_found",
        }
    }
}

#[derive(Clone)]
pub struct ClockingCoordinator {
    machine: SessionStateMachine,
}

impl ClockingCoordinator {
    pub fn new(directory: DirectoryHandle) -> Self {
        Self {
            machine: SessionStateMachine::new(directory),
        }
    }

    pub async fn clock_in(&self, employee_no: EmployeeNo) -> Result<ClockInOutcome, CoreError> {
        let outcome = match self.machine.apply(employee_no, ClockEvent::ClockIn).await? {
            Applied::Missing => ClockInOutcome::NotFound,
            Applied::Done(Ok(_)) => ClockInOutcome::Success,
            // clock-in can only be rejected as already clocked in
            Applied::Done(Err(_)) => ClockInOutcome::AlreadyClockedIn,
        };

        counter!(CLOCK_IN, "outcome" => outcome.label()).increment(1);
        tracing::info!(%employee_no, outcome = outcome.label(), "clock-in");
        Ok(outcome)
    }

    pub async fn clock_out(&self, employee_no: EmployeeNo) -> Result<ClockOutOutcome, CoreError> {
        let outcome = match self.machine.apply(employee_no, ClockEvent::ClockOut).await? {
            Applied::Missing => ClockOutOutcome::NotFound,
            Applied::Done(Ok(_)) => ClockOutOutcome::Success,
            Applied::Done(Err(_)) => ClockOutOutcome::NotClockedIn,
        };

        counter!(CLOCK_OUT, "outcome" => outcome.label()).increment(1);
        tracing::info!(%employee_no, outcome = outcome.label(), "clock-out");
        Ok(outcome)
    }

    /// Pure read; an absent employee reads as not clocked in
    pub async fn is_clocked_in(&self, employee_no: EmployeeNo) -> Result<bool, CoreError> {
        let state = self.machine.current(employee_no).await?;
        Ok(state.is_some_and(|s| s.is_clocked_in()))
    }
}
