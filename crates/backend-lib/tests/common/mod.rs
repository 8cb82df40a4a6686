//! Test utilities shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use timeclock_backend::{
    auth::hash_password,
    auth::password::scrypt_params,
    config::Settings,
    directory::{EmployeeDirectory, EmployeeRecord, InMemoryDirectory, NewEmployee},
    AppState,
};
use timeclock_common::EmployeeNo;

/// Cheap scrypt cost so tests do not spend seconds hashing
pub const TEST_LOG_N: u8 = 4;

pub const INITIAL_PASSWORD: &str = "Welcome1!";

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.password.scrypt_log_n = TEST_LOG_N;
    settings.storage_timeout_ms = 1_000;
    settings
}

pub fn test_hash(password: &str) -> String {
    hash_password(password, scrypt_params(TEST_LOG_N).unwrap()).unwrap()
}

pub fn new_employee(username: &str, password: &str) -> NewEmployee {
    NewEmployee {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        username: username.to_string(),
        cell_phone_number: "555-0142".to_string(),
        position: "Cashier".to_string(),
        is_manager: Some(false),
        manager_id: None,
        password_hash: test_hash(password),
    }
}

/// App state over an in-memory directory the test can also reach directly
pub struct Fixture {
    pub state: AppState,
    pub directory: Arc<InMemoryDirectory>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let state = AppState::new(directory.clone(), settings).unwrap();
        Self { state, directory }
    }

    /// Insert a fresh employee with [`INITIAL_PASSWORD`]
    pub async fn seed(&self) -> EmployeeNo {
        self.seed_with_password(INITIAL_PASSWORD).await
    }

    pub async fn seed_with_password(&self, password: &str) -> EmployeeNo {
        let record = self
            .directory
            .insert(new_employee("ghopper", password))
            .await
            .unwrap();
        record.employee_no
    }

    pub async fn record(&self, employee_no: EmployeeNo) -> EmployeeRecord {
        self.directory
            .find_by_number(employee_no)
            .await
            .unwrap()
            .unwrap()
    }
}

pub fn employee_no(raw: u32) -> EmployeeNo {
    EmployeeNo::new(raw).unwrap()
}
