//! Credential store: owns the password hash and first-login flag of each
//! employee record.
//!
//! Plaintext never leaves this module except as the generated temporary
//! password handed back to the creating caller.
use std::sync::Arc;

use dashmap::DashSet;
use metrics::counter;
use scrypt::Params;
use thiserror::Error;
use timeclock_common::EmployeeNo;
use zeroize::Zeroizing;

use super::password::{
    generate_temporary_password, hash_password, scrypt_params, validate_password_strength,
    verify_password, Verification,
};
use crate::config::{ConfigError, PasswordSettings};
use crate::directory::{Applied, DirectoryHandle, EmployeeRecord, FieldChanges, Step};
use crate::error::CoreError;
use crate::metrics::{PASSWORD_CHANGED, REHASH_FLAGGED};
use crate::validation::validate_password;

/// Plaintext behind the dummy hash; never a valid login
const DUMMY_PASSWORD: &str = "timeclock-dummy-credential";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("employee not found")]
    NotFound,

    #[error("invalid password: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fault(#[from] CoreError),
}

/// Hash of a newly provisioned credential
pub struct ProvisionedCredential {
    pub password_hash: String,
    /// Set when no password was supplied and one had to be generated
    pub temporary_password: Option<Zeroizing<String>>,
}

pub struct CredentialStore {
    directory: DirectoryHandle,
    settings: PasswordSettings,
    params: Params,
    /// Hashed with `params`, verified against when there is no real hash
    dummy_hash: Arc<str>,
    /// Employees whose stored hash is malformed or uses a retired algorithm
    rehash: Arc<DashSet<EmployeeNo>>,
}

impl CredentialStore {
    pub fn new(directory: DirectoryHandle, settings: PasswordSettings) -> Result<Self, ConfigError> {
        let params = scrypt_params(settings.scrypt_log_n)
            .map_err(|_| ConfigError::InvalidHashCost(settings.scrypt_log_n))?;
        let dummy_hash = hash_password(DUMMY_PASSWORD, params)
            .map_err(|e| ConfigError::Invalid(format!("cannot derive dummy password hash: {e}")))?;
        Ok(Self {
            directory,
            settings,
            params,
            dummy_hash: Arc::from(dummy_hash),
            rehash: Arc::new(DashSet::new()),
        })
    }

    /// Check a candidate password for `employee_no`
    pub async fn verify(&self, employee_no: EmployeeNo, candidate: &str) -> Result<bool, CredentialError> {
        let record = self
            .directory
            .find(employee_no)
            .await
            .map_err(CoreError::from)?
            .ok_or(CredentialError::NotFound)?;
        Ok(self.verify_record(&record, candidate).await?)
    }

    /// Check a candidate password against an already fetched record
    pub(crate) async fn verify_record(&self, record: &EmployeeRecord, candidate: &str) -> Result<bool, CoreError> {
        let employee_no = record.employee_no;
        let hash = record.password_hash.clone();
        let candidate = Zeroizing::new(candidate.to_owned());

        let verification = tokio::task::spawn_blocking(move || verify_password(&hash, &candidate))
            .await
            .map_err(|e| CoreError::Internal(format!("password verification task failed: {e}")))?;

        // Only a current-format hash can authenticate
        Ok(match verification {
            Verification::Match => true,
            Verification::Mismatch => false,
            Verification::LegacyMatch => {
                self.flag_for_rehash(employee_no, "legacy hash algorithm");
                false
            },
            Verification::Malformed => {
                self.flag_for_rehash(employee_no, "malformed stored hash");
                false
            },
        })
    }

    /// Run one verification against the dummy hash and discard the result.
    ///
    /// Keeps login paths that have no stored hash as slow as a real check.
    pub async fn verify_dummy(&self, candidate: &str) -> Result<Verification, CoreError> {
        let hash = Arc::clone(&self.dummy_hash);
        let candidate = Zeroizing::new(candidate.to_owned());

        tokio::task::spawn_blocking(move || verify_password(&hash, &candidate))
            .await
            .map_err(|e| CoreError::Internal(format!("password verification task failed: {e}")))
    }

    /// Replace the password and clear the first-login flag.
    ///
    /// The only path that clears `is_first_login`.
    pub async fn set_password(&self, employee_no: EmployeeNo, new_password: &str) -> Result<(), CredentialError> {
        self.check_acceptable(new_password)?;
        let hash = self.hash(new_password).await?;

        let applied = self
            .directory
            .read_check_write(employee_no, |_| {
                Step::Write(
                    FieldChanges {
                        password_hash: Some(hash.clone()),
                        is_first_login: Some(false),
                        is_clocked_in: None,
                    },
                    (),
                )
            })
            .await?;

        match applied {
            Applied::Missing => Err(CredentialError::NotFound),
            Applied::Done(()) => {
                self.rehash.remove(&employee_no);
                counter!(PASSWORD_CHANGED).increment(1);
                tracing::info!(%employee_no, "password changed");
                Ok(())
            },
        }
    }

    pub fn generate_temporary_password(&self) -> Zeroizing<String> {
        Zeroizing::new(generate_temporary_password(self.settings.temporary_length))
    }

    /// Hash a caller-supplied password for a new record, or generate a
    /// temporary one when none is given
    pub async fn provision(&self, password: Option<&str>) -> Result<ProvisionedCredential, CredentialError> {
        match password.filter(|p| !p.is_empty()) {
            Some(password) => {
                self.check_acceptable(password)?;
                Ok(ProvisionedCredential {
                    password_hash: self.hash(password).await?,
                    temporary_password: None,
                })
            },
            None => {
                let temporary = self.generate_temporary_password();
                Ok(ProvisionedCredential {
                    password_hash: self.hash(&temporary).await?,
                    temporary_password: Some(temporary),
                })
            },
        }
    }

    /// Employees waiting for an out-of-band rehash, in ascending order
    pub fn pending_rehash(&self) -> Vec<EmployeeNo> {
        let mut pending: Vec<EmployeeNo> = self.rehash.iter().map(|no| *no).collect();
        pending.sort();
        pending
    }

    fn check_acceptable(&self, password: &str) -> Result<(), CredentialError> {
        validate_password(password).map_err(|e| CredentialError::InvalidInput(e.to_string()))?;
        if self.settings.enforce_strength
            && !validate_password_strength(password, &self.settings.requirements)
        {
            return Err(CredentialError::InvalidInput(format!(
                "password must be at least {} characters and satisfy the complexity rules",
                self.settings.requirements.min_length
            )));
        }
        Ok(())
    }

    async fn hash(&self, plain: &str) -> Result<String, CoreError> {
        let plain = Zeroizing::new(plain.to_owned());
        let params = self.params;

        tokio::task::spawn_blocking(move || hash_password(&plain, params))
            .await
            .map_err(|e| CoreError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
    }

    fn flag_for_rehash(&self, employee_no: EmployeeNo, reason: &'static str) {
        if self.rehash.insert(employee_no) {
            counter!(REHASH_FLAGGED).increment(1);
            tracing::warn!(%employee_no, reason, "stored password hash flagged for rehash");
        }
    }
}
