// ============================
// crates/backend-lib/src/auth/coordinator.rs
// ============================
//! Login and password-change flows.
use metrics::counter;
use timeclock_common::{EmployeeNo, EmployeeSummary};

use super::credential::{CredentialError, CredentialStore};
use crate::directory::DirectoryHandle;
use crate::error::CoreError;
use crate::metrics::LOGIN;

/// Outcome of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// `first_login_required` is advisory; nothing here blocks other actions
    Authenticated {
        employee: EmployeeSummary,
        first_login_required: bool,
    },
    InvalidCredentials,
    NotFound,
    Disabled,
}

impl LoginOutcome {
    fn label(&self) -> &'static str {
        match self {
            LoginOutcome::Authenticated { .. } => "authenticated",
            LoginOutcome::InvalidCredentials => "invalid_credentials",
            LoginOutcome::NotFound => "not_found",
            LoginOutcome::Disabled => "disabled",
        }
    }
}

/// Outcome of a password change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangePasswordOutcome {
    Changed { is_first_login: bool },
    NotFound,
    InvalidInput(String),
}

pub struct AuthCoordinator {
    directory: DirectoryHandle,
    credentials: CredentialStore,
    enforce_disabled: bool,
}

impl AuthCoordinator {
    pub fn new(directory: DirectoryHandle, credentials: CredentialStore, enforce_disabled: bool) -> Self {
        Self {
            directory,
            credentials,
            enforce_disabled,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Authenticate an employee. Failed attempts have no side effects.
    ///
    /// Every path runs exactly one password verification, so the response
    /// time does not tell whether the employee exists.
    pub async fn login(&self, employee_no: EmployeeNo, password: &str) -> Result<LoginOutcome, CoreError> {
        let outcome = match self.directory.find(employee_no).await? {
            None => {
                self.credentials.verify_dummy(password).await?;
                LoginOutcome::NotFound
            },
            Some(record) if self.enforce_disabled && record.is_disabled => {
                self.credentials.verify_dummy(password).await?;
                LoginOutcome::Disabled
            },
            Some(record) => {
                if self.credentials.verify_record(&record, password).await? {
                    LoginOutcome::Authenticated {
                        employee: record.summary(),
                        first_login_required: record.is_first_login,
                    }
                } else {
                    LoginOutcome::InvalidCredentials
                }
            },
        };

        counter!(LOGIN, "outcome" => outcome.label()).increment(1);
        tracing::info!(%employee_no, outcome = outcome.label(), "login");
        Ok(outcome)
    }

    pub async fn change_password(
        &self,
        employee_no: EmployeeNo,
        new_password: &str,
    ) -> Result<ChangePasswordOutcome, CoreError> {
        if new_password.is_empty() {
            return Ok(ChangePasswordOutcome::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        match self.credentials.set_password(employee_no, new_password).await {
            Ok(()) => Ok(ChangePasswordOutcome::Changed {
                is_first_login: false,
            }),
            Err(CredentialError::NotFound) => Ok(ChangePasswordOutcome::NotFound),
            Err(CredentialError::InvalidInput(reason)) => Ok(ChangePasswordOutcome::InvalidInput(reason)),
            Err(CredentialError::Fault(e)) => Err(e),
        }
    }
}
