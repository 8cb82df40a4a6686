// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between time-clock clients and the server.
//! This module defines the request/response payloads and supporting types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity key of an employee record.
///
/// Always positive. Raw numbers arriving over the wire are validated at the
/// boundary and converted with [`EmployeeNo::new`] or `TryFrom<i64>`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EmployeeNo(u32);

impl EmployeeNo {
    /// Wrap a raw number, rejecting zero
    pub fn new(raw: u32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EmployeeNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw number that cannot be an employee number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEmployeeNo(pub i64);

impl fmt::Display for InvalidEmployeeNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "employee number must be a positive integer, got {}", self.0)
    }
}

impl std::error::Error for InvalidEmployeeNo {}

impl TryFrom<i64> for EmployeeNo {
    type Error = InvalidEmployeeNo;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .ok()
            .and_then(EmployeeNo::new)
            .ok_or(InvalidEmployeeNo(raw))
    }
}

/// Login request
/// # Fields
/// * `employee_no` - Raw employee number, validated before use
/// * `password` - Candidate password
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub employee_no: i64,
    pub password: String,
}

/// Public part of an employee record returned after authentication.
/// Never carries credential material.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub employee_no: EmployeeNo,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub position: String,
    #[serde(default)]
    pub is_manager: Option<bool>,
}

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Human readable outcome, prompts for a password change on first login
    pub message: String,
    /// Caller must run the password-change flow before granting full access
    pub first_login_required: bool,
    pub employee: EmployeeSummary,
}

/// Password change request
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Response to a successful password change
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponse {
    pub message: String,
    /// Always false after a successful change
    pub is_first_login: bool,
}

/// Plain acknowledgement used by the clock-in/clock-out endpoints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Current clock state of an employee
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClockStatusResponse {
    pub is_clocked_in: bool,
}

/// Error envelope returned for every non-success response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    /// Stable machine readable code, e.g. `CLOCK_001`
    pub code: String,
    pub message: String,
}
