// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers. Thin adapters from JSON requests to the coordinators.

pub mod auth;
pub mod clock;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use timeclock_common::EmployeeNo;

use crate::error::AppError;
use crate::validation::validate_employee_no;

/// `{employee_no}` path segment, validated.
///
/// Both a non-numeric segment and a non-positive number are rejected with
/// the JSON error envelope.
pub struct EmployeePath(pub EmployeeNo);

impl<S> FromRequestParts<S> for EmployeePath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(validate_employee_no(raw)?))
    }
}
