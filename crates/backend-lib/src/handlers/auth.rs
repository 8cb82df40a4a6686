// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Login and password-change endpoints.
use axum::{extract::State, Json};
use timeclock_common::{ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse};
use zeroize::Zeroizing;

use super::EmployeePath;
use crate::auth::{ChangePasswordOutcome, LoginOutcome};
use crate::error::AppError;
use crate::validation::{validate_employee_no, validate_password};
use crate::AppState;

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let LoginRequest { employee_no, password } = request;
    let password = Zeroizing::new(password);

    let employee_no = validate_employee_no(employee_no)?;
    validate_password(&password)?;

    match state.auth.login(employee_no, &password).await? {
        LoginOutcome::Authenticated {
            employee,
            first_login_required,
        } => {
            let message = if first_login_required {
                "Please change your password."
            } else {
                "Login successful"
            };
            Ok(Json(LoginResponse {
                message: message.to_string(),
                first_login_required,
                employee,
            }))
        },
        // an unknown number looks exactly like a wrong password
        LoginOutcome::NotFound | LoginOutcome::InvalidCredentials => Err(AppError::InvalidCredentials),
        LoginOutcome::Disabled => Err(AppError::Disabled),
    }
}

/// `POST /api/auth/{employee_no}/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    EmployeePath(employee_no): EmployeePath,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, AppError> {
    let new_password = Zeroizing::new(request.new_password);
    validate_password(&new_password)?;

    match state.auth.change_password(employee_no, &new_password).await? {
        ChangePasswordOutcome::Changed { is_first_login } => Ok(Json(ChangePasswordResponse {
            message: "Password changed successfully".to_string(),
            is_first_login,
        })),
        ChangePasswordOutcome::NotFound => Err(AppError::NotFound),
        ChangePasswordOutcome::InvalidInput(reason) => Err(AppError::InvalidInput(reason)),
    }
}
