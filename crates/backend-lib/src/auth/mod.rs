// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

mod coordinator;
mod credential;
pub mod password;

pub use coordinator::{AuthCoordinator, ChangePasswordOutcome, LoginOutcome};
pub use credential::{CredentialError, CredentialStore, ProvisionedCredential};
pub use password::{
    generate_temporary_password, hash_password, validate_password_strength, verify_password,
    PasswordRequirements, Verification, MIN_PASSWORD_LENGTH, TEMPORARY_PASSWORD_LENGTH,
};
