// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation at the transport boundary.

use thiserror::Error;
use timeclock_common::EmployeeNo;

/// Longest password accepted anywhere, in bytes
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid employee number: {0}")]
    InvalidEmployeeNo(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a raw employee number
pub fn validate_employee_no(raw: i64) -> ValidationResult<EmployeeNo> {
    EmployeeNo::try_from(raw).map_err(|e| ValidationError::InvalidEmployeeNo(e.to_string()))
}

/// Validate a submitted password.
///
/// Only shape is checked here; strength is a credential-store policy.
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password must not be empty".to_string(),
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} bytes"
        )));
    }

    Ok(password)
}
