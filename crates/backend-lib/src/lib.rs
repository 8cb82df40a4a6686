// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core of the employee time-clock service: credentials, login flow and the
//! clock-in/clock-out state machine, plus a thin axum transport.

pub mod auth;
pub mod clocking;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthCoordinator, CredentialStore};
use crate::clocking::ClockingCoordinator;
use crate::config::{ConfigError, Settings};
use crate::directory::{DirectoryHandle, EmployeeDirectory};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Login and password-change flows
    pub auth: Arc<AuthCoordinator>,
    /// Clock-in/clock-out flows
    pub clocking: Arc<ClockingCoordinator>,
    /// Bounded handle on the employee directory
    pub directory: DirectoryHandle,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the coordinators around a directory backend
    pub fn new(directory: Arc<dyn EmployeeDirectory>, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let directory = DirectoryHandle::new(directory, settings.storage_timeout());
        let credentials = CredentialStore::new(directory.clone(), settings.password.clone())?;
        let auth = AuthCoordinator::new(directory.clone(), credentials, settings.enforce_disabled);
        let clocking = ClockingCoordinator::new(directory.clone());

        Ok(Self {
            auth: Arc::new(auth),
            clocking: Arc::new(clocking),
            directory,
            settings: Arc::new(settings),
        })
    }
}
