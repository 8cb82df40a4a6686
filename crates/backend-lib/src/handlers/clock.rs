// ============================
// crates/backend-lib/src/handlers/clock.rs
// ============================
//! Clock-in/clock-out endpoints.
use axum::{extract::State, Json};
use timeclock_common::{ClockStatusResponse, MessageResponse};

use super::EmployeePath;
use crate::clocking::{ClockInOutcome, ClockOutOutcome};
use crate::error::AppError;
use crate::AppState;

/// `POST /api/clock/{employee_no}/clock-in`
pub async fn clock_in(
    State(state): State<AppState>,
    EmployeePath(employee_no): EmployeePath,
) -> Result<Json<MessageResponse>, AppError> {
    match state.clocking.clock_in(employee_no).await? {
        ClockInOutcome::Success => Ok(Json(MessageResponse::new("Clocked in successfully."))),
        ClockInOutcome::AlreadyClockedIn => Err(AppError::AlreadyClockedIn),
        ClockInOutcome::NotFound => Err(AppError::NotFound),
    }
}

/// `POST /api/clock/{employee_no}/clock-out`
pub async fn clock_out(
    State(state): State<AppState>,
    EmployeePath(employee_no): EmployeePath,
) -> Result<Json<MessageResponse>, AppError> {
    match state.clocking.clock_out(employee_no).await? {
        ClockOutOutcome::Success => Ok(Json(MessageResponse::new("Clocked out successfully."))),
        ClockOutOutcome::NotClockedIn => Err(AppError::NotClockedIn),
        ClockOutOutcome::NotFound => Err(AppError::NotFound),
    }
}

/// `GET /api/clock/{employee_no}/clock-in-status`
pub async fn clock_in_status(
    State(state): State<AppState>,
    EmployeePath(employee_no): EmployeePath,
) -> Result<Json<ClockStatusResponse>, AppError> {
    let is_clocked_in = state.clocking.is_clocked_in(employee_no).await?;
    Ok(Json(ClockStatusResponse { is_clocked_in }))
}
