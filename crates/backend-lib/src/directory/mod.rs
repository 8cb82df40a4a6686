// ============================
// crates/backend-lib/src/directory/mod.rs
// ============================
//! Employee directory abstraction.
//!
//! The directory owns the persistent employee records. The core only reads a
//! record and writes back a restricted set of fields through a
//! compare-and-swap on the record `version`.

mod flat_file;
mod memory;

pub use flat_file::FlatFileDirectory;
pub use memory::InMemoryDirectory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use timeclock_common::{EmployeeNo, EmployeeSummary};

use crate::clocking::ClockState;
use crate::error::CoreError;
use crate::metrics::STORAGE_CONFLICT;

/// Number of times a read-check-write is re-run after losing a CAS race
const CONFLICT_RETRIES: usize = 1;

/// Faults of the backing store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage round trip timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt employee record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

fn default_first_login() -> bool {
    true
}

/// An employee record as stored by the directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub employee_no: EmployeeNo,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub cell_phone_number: String,
    pub position: String,
    #[serde(default)]
    pub is_manager: Option<bool>,
    #[serde(default)]
    pub manager_id: Option<EmployeeNo>,
    #[serde(default)]
    pub is_disabled: bool,
    pub password_hash: String,
    #[serde(default = "default_first_login")]
    pub is_first_login: bool,
    /// Stored tri-state; unset reads as not clocked in
    #[serde(default)]
    pub is_clocked_in: Option<bool>,
    /// CAS token, bumped by every successful persist
    #[serde(default)]
    pub version: u64,
}

impl EmployeeRecord {
    pub fn clock_state(&self) -> ClockState {
        ClockState::from_stored(self.is_clocked_in)
    }

    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            employee_no: self.employee_no,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            position: self.position.clone(),
            is_manager: self.is_manager,
        }
    }

    /// Apply a change set and bump the version
    fn apply(&mut self, changes: FieldChanges) {
        if let Some(hash) = changes.password_hash {
            self.password_hash = hash;
        }
        if let Some(first_login) = changes.is_first_login {
            self.is_first_login = first_login;
        }
        if let Some(clocked_in) = changes.is_clocked_in {
            self.is_clocked_in = Some(clocked_in);
        }
        self.version += 1;
    }
}

/// Profile of an employee about to be created
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub cell_phone_number: String,
    pub position: String,
    pub is_manager: Option<bool>,
    pub manager_id: Option<EmployeeNo>,
    pub password_hash: String,
}

impl NewEmployee {
    fn into_record(self, employee_no: EmployeeNo) -> EmployeeRecord {
        EmployeeRecord {
            employee_no,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            cell_phone_number: self.cell_phone_number,
            position: self.position,
            is_manager: self.is_manager,
            manager_id: self.manager_id,
            is_disabled: false,
            password_hash: self.password_hash,
            is_first_login: true,
            is_clocked_in: None,
            version: 0,
        }
    }
}

/// The only fields the core is allowed to write.
/// All present fields are applied in one write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub password_hash: Option<String>,
    pub is_first_login: Option<bool>,
    pub is_clocked_in: Option<bool>,
}

/// Result of a conditional write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Written; carries the record as now stored
    Persisted(EmployeeRecord),
    /// Stored version did not match the expected one
    Conflict,
    /// No record with that number
    Absent,
}

/// Trait for employee directory backends
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Look up a record by number
    async fn find_by_number(&self, employee_no: EmployeeNo)
        -> Result<Option<EmployeeRecord>, StorageError>;

    /// Apply `changes` only if the stored version still equals `expected_version`
    async fn persist(
        &self,
        employee_no: EmployeeNo,
        expected_version: u64,
        changes: FieldChanges,
    ) -> Result<PersistOutcome, StorageError>;

    /// Create a record under the next free number
    async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError>;

    /// Delete a record, returning whether it existed
    async fn remove(&self, employee_no: EmployeeNo) -> Result<bool, StorageError>;
}

/// What a read-check-write step decided after looking at the current record
#[derive(Debug)]
pub enum Step<T> {
    /// Persist the changes, then report `T`
    Write(FieldChanges, T),
    /// Report `T` without writing
    Stop(T),
}

/// Outcome of [`DirectoryHandle::read_check_write`]
#[derive(Debug, PartialEq, Eq)]
pub enum Applied<T> {
    Done(T),
    Missing,
}

/// Storage-client handle passed explicitly into the coordinators.
///
/// Every round trip is bounded by the configured timeout. An elapsed timeout
/// drops the backend call wherever it is, so a timed-out write may
/// already have landed.
#[derive(Clone)]
pub struct DirectoryHandle {
    inner: Arc<dyn EmployeeDirectory>,
    timeout: Duration,
}

impl DirectoryHandle {
    pub fn new(inner: Arc<dyn EmployeeDirectory>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: std::future::Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))?
    }

    pub async fn find(&self, employee_no: EmployeeNo) -> Result<Option<EmployeeRecord>, StorageError> {
        self.bounded(self.inner.find_by_number(employee_no)).await
    }

    /// Conditional write, bounded by the handle's timeout.
    ///
    /// A [`StorageError::Timeout`] means the outcome is unknown: the backend
    /// may already have committed the write when the deadline fired. The
    /// record is still in exactly one state; re-read it to learn which.
    pub async fn persist(
        &self,
        employee_no: EmployeeNo,
        expected_version: u64,
        changes: FieldChanges,
    ) -> Result<PersistOutcome, StorageError> {
        self.bounded(self.inner.persist(employee_no, expected_version, changes))
            .await
    }

    pub async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError> {
        self.bounded(self.inner.insert(employee)).await
    }

    /// Run a read-check-write against one record.
    ///
    /// `decide` sees the freshly read record and either stops or asks for a
    /// conditional write. A lost CAS race re-runs the whole sequence once;
    /// a second loss is reported as [`CoreError::Conflict`].
    pub async fn read_check_write<T, F>(
        &self,
        employee_no: EmployeeNo,
        mut decide: F,
    ) -> Result<Applied<T>, CoreError>
    where
        F: FnMut(&EmployeeRecord) -> Step<T>,
    {
        for attempt in 0..=CONFLICT_RETRIES {
            let Some(record) = self.find(employee_no).await? else {
                return Ok(Applied::Missing);
            };

            let (changes, value) = match decide(&record) {
                Step::Stop(value) => return Ok(Applied::Done(value)),
                Step::Write(changes, value) => (changes, value),
            };

            match self.persist(employee_no, record.version, changes).await? {
                PersistOutcome::Persisted(_) => return Ok(Applied::Done(value)),
                PersistOutcome::Absent => return Ok(Applied::Missing),
                PersistOutcome::Conflict => {
                    counter!(STORAGE_CONFLICT).increment(1);
                    tracing::debug!(%employee_no, attempt, "lost compare-and-swap race");
                },
            }
        }

        tracing::warn!(%employee_no, "record kept changing underneath read-check-write");
        Err(CoreError::Conflict { employee_no })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a directory and reports a conflict for the first `n` persists
    struct Contended {
        inner: InMemoryDirectory,
        conflicts_left: AtomicUsize,
    }

    #[async_trait]
    impl EmployeeDirectory for Contended {
        async fn find_by_number(
            &self,
            employee_no: EmployeeNo,
        ) -> Result<Option<EmployeeRecord>, StorageError> {
            self.inner.find_by_number(employee_no).await
        }

        async fn persist(
            &self,
            employee_no: EmployeeNo,
            expected_version: u64,
            changes: FieldChanges,
        ) -> Result<PersistOutcome, StorageError> {
            let left = self.conflicts_left.load(Ordering::SeqCst);
            if left > 0 {
                self.conflicts_left.store(left - 1, Ordering::SeqCst);
                return Ok(PersistOutcome::Conflict);
            }
            self.inner.persist(employee_no, expected_version, changes).await
        }

        async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError> {
            self.inner.insert(employee).await
        }

        async fn remove(&self, employee_no: EmployeeNo) -> Result<bool, StorageError> {
            self.inner.remove(employee_no).await
        }
    }

    fn new_employee() -> NewEmployee {
        NewEmployee {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: "ada".to_string(),
            cell_phone_number: "555-0100".to_string(),
            position: "Engineer".to_string(),
            is_manager: None,
            manager_id: None,
            password_hash: "$scrypt$placeholder".to_string(),
        }
    }

    async fn contended(conflicts: usize) -> (DirectoryHandle, EmployeeNo) {
        let dir = Contended {
            inner: InMemoryDirectory::new(),
            conflicts_left: AtomicUsize::new(conflicts),
        };
        let record = dir.insert(new_employee()).await.unwrap();
        (
            DirectoryHandle::new(Arc::new(dir), Duration::from_secs(1)),
            record.employee_no,
        )
    }

    fn clock_in_step(record: &EmployeeRecord) -> Step<bool> {
        if record.clock_state() == ClockState::ClockedIn {
            Step::Stop(false)
        } else {
            Step::Write(
                FieldChanges {
                    is_clocked_in: Some(true),
                    ..FieldChanges::default()
                },
                true,
            )
        }
    }

    #[tokio::test]
    async fn retries_once_after_conflict() {
        let (handle, no) = contended(1).await;

        let applied = handle.read_check_write(no, clock_in_step).await.unwrap();
        assert_eq!(applied, Applied::Done(true));

        let record = handle.find(no).await.unwrap().unwrap();
        assert_eq!(record.is_clocked_in, Some(true));
        assert_eq!(record.version, 1);
    }

    #[tokio::test]
    async fn gives_up_after_second_conflict() {
        let (handle, no) = contended(2).await;

        let err = handle.read_check_write(no, clock_in_step).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict { employee_no } if employee_no == no));

        let record = handle.find(no).await.unwrap().unwrap();
        assert_eq!(record.is_clocked_in, None);
        assert_eq!(record.version, 0);
    }

    #[tokio::test]
    async fn missing_record_is_reported_not_raised() {
        let (handle, _) = contended(0).await;
        let absent = EmployeeNo::new(999).unwrap();

        let applied = handle.read_check_write(absent, clock_in_step).await.unwrap();
        assert_eq!(applied, Applied::Missing);
    }

    /// Commits every persist, then never answers
    struct CommitThenStall(InMemoryDirectory);

    #[async_trait]
    impl EmployeeDirectory for CommitThenStall {
        async fn find_by_number(
            &self,
            employee_no: EmployeeNo,
        ) -> Result<Option<EmployeeRecord>, StorageError> {
            self.0.find_by_number(employee_no).await
        }

        async fn persist(
            &self,
            employee_no: EmployeeNo,
            expected_version: u64,
            changes: FieldChanges,
        ) -> Result<PersistOutcome, StorageError> {
            self.0.persist(employee_no, expected_version, changes).await?;
            std::future::pending().await
        }

        async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError> {
            self.0.insert(employee).await
        }

        async fn remove(&self, employee_no: EmployeeNo) -> Result<bool, StorageError> {
            self.0.remove(employee_no).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_write_may_have_committed() {
        let dir = CommitThenStall(InMemoryDirectory::new());
        let no = dir.insert(new_employee()).await.unwrap().employee_no;
        let handle = DirectoryHandle::new(Arc::new(dir), Duration::from_millis(100));

        let err = handle.read_check_write(no, clock_in_step).await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(StorageError::Timeout(_))));

        // the write landed in one piece; a re-read sees it
        let record = handle.find(no).await.unwrap().unwrap();
        assert_eq!(record.clock_state(), ClockState::ClockedIn);
        assert_eq!(record.version, 1);
        assert_eq!(
            handle.read_check_write(no, clock_in_step).await.unwrap(),
            Applied::Done(false)
        );
    }

    #[test]
    fn unset_clock_flag_reads_as_not_clocked_in() {
        let record = new_employee().into_record(EmployeeNo::new(1).unwrap());
        assert_eq!(record.is_clocked_in, None);
        assert_eq!(record.clock_state(), ClockState::NotClockedIn);
        assert!(record.is_first_login);
    }
}
