//! In-process directory, used for tests and ephemeral deployments.
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use timeclock_common::EmployeeNo;

use super::{EmployeeDirectory, EmployeeRecord, FieldChanges, NewEmployee, PersistOutcome, StorageError};

/// Directory backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    records: DashMap<EmployeeNo, EmployeeRecord>,
    last_no: AtomicU32,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, replacing any record with the same number
    pub fn put(&self, record: EmployeeRecord) {
        self.last_no
            .fetch_max(record.employee_no.get(), Ordering::SeqCst);
        self.records.insert(record.employee_no, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn find_by_number(
        &self,
        employee_no: EmployeeNo,
    ) -> Result<Option<EmployeeRecord>, StorageError> {
        Ok(self.records.get(&employee_no).map(|entry| entry.value().clone()))
    }

    async fn persist(
        &self,
        employee_no: EmployeeNo,
        expected_version: u64,
        changes: FieldChanges,
    ) -> Result<PersistOutcome, StorageError> {
        // The shard write guard is held across compare and apply
        let Some(mut entry) = self.records.get_mut(&employee_no) else {
            return Ok(PersistOutcome::Absent);
        };
        if entry.version != expected_version {
            return Ok(PersistOutcome::Conflict);
        }
        entry.apply(changes);
        Ok(PersistOutcome::Persisted(entry.clone()))
    }

    async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError> {
        let raw = self.last_no.fetch_add(1, Ordering::SeqCst) + 1;
        let employee_no = EmployeeNo::new(raw)
            .ok_or_else(|| StorageError::Unavailable("employee number space exhausted".to_string()))?;
        let record = employee.into_record(employee_no);
        self.records.insert(employee_no, record.clone());
        Ok(record)
    }

    async fn remove(&self, employee_no: EmployeeNo) -> Result<bool, StorageError> {
        Ok(self.records.remove(&employee_no).is_some())
    }
}
