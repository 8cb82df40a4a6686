// crates/backend-lib/src/error.rs

//! Central error types + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use timeclock_common::{EmployeeNo, ErrorBody, ErrorResponse};

use crate::directory::StorageError;
use crate::validation::ValidationError;

/// Faults raised by the core.
///
/// Expected domain outcomes (not found, wrong password, already clocked in, ...)
/// are returned as outcome enums and never appear here.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("update of employee {employee_no} still conflicted after retry")]
    Conflict { employee_no: EmployeeNo },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Employee not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    Disabled,

    #[error("Already clocked in")]
    AlreadyClockedIn,

    #[error("Not clocked in")]
    NotClockedIn,

    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Disabled => StatusCode::FORBIDDEN,
            AppError::AlreadyClockedIn | AppError::NotClockedIn => StatusCode::CONFLICT,
            AppError::StorageConflict(_) | AppError::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NF_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Disabled => "AUTH_002",
            AppError::AlreadyClockedIn => "CLOCK_001",
            AppError::NotClockedIn => "CLOCK_002",
            AppError::StorageConflict(_) => "STORE_001",
            AppError::StorageUnavailable(_) => "STORE_002",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::NotFound => "Employee not found.".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided.".to_string(),
            AppError::InvalidCredentials => "Invalid credentials.".to_string(),
            AppError::Disabled => "This account has been disabled.".to_string(),
            AppError::AlreadyClockedIn => "Already clocked in.".to_string(),
            AppError::NotClockedIn => "Not clocked in.".to_string(),
            AppError::StorageConflict(_) => {
                "The record was modified concurrently, please try again".to_string()
            },
            AppError::StorageUnavailable(_) => "Service temporarily unavailable".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    /// Whether this is a true fault rather than an expected caller-facing outcome
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            AppError::StorageConflict(_) | AppError::StorageUnavailable(_) | AppError::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_fault() {
            tracing::error!(code = error_code, error = %self, "request failed");
        } else {
            tracing::debug!(code = error_code, outcome = %self, "request rejected");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: error_code.to_string(),
                message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Storage(e) => AppError::StorageUnavailable(e.to_string()),
            CoreError::Conflict { .. } => AppError::StorageConflict(err.to_string()),
            CoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};
    use std::time::Duration;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidInput("empty password".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Disabled.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AlreadyClockedIn.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotClockedIn.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::StorageUnavailable("down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_faults_are_faults() {
        assert!(!AppError::NotFound.is_fault());
        assert!(!AppError::InvalidCredentials.is_fault());
        assert!(!AppError::AlreadyClockedIn.is_fault());
        assert!(!AppError::NotClockedIn.is_fault());
        assert!(!AppError::InvalidInput(String::new()).is_fault());
        assert!(AppError::StorageConflict(String::new()).is_fault());
        assert!(AppError::StorageUnavailable(String::new()).is_fault());
        assert!(AppError::Internal(String::new()).is_fault());
    }

    #[test]
    fn test_core_error_conversion() {
        let timeout: AppError = CoreError::from(StorageError::Timeout(Duration::from_millis(5))).into();
        assert!(matches!(timeout, AppError::StorageUnavailable(_)));

        let io: AppError =
            CoreError::from(StorageError::Io(IoError::new(ErrorKind::Other, "disk gone"))).into();
        assert_eq!(io.error_code(), "STORE_002");

        let conflict: AppError = CoreError::Conflict {
            employee_no: EmployeeNo::new(3).unwrap(),
        }
        .into();
        assert!(matches!(conflict, AppError::StorageConflict(_)));
        assert_eq!(conflict.error_code(), "STORE_001");
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let response = AppError::AlreadyClockedIn.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("application/json"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "CLOCK_001");
    }
}
