// ============================
// crates/backend-lib/src/directory/flat_file.rs
// ============================
//! Flat-file implementation of the employee directory.
//!
//! Layout: `<root>/employees/<employee_no>.json`, one pretty-printed record
//! per file. Records are replaced by writing a sibling temp file and renaming
//! it over the existing file, so readers never see a half-written record.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use dashmap::DashMap;
use timeclock_common::EmployeeNo;
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex};

use super::{EmployeeDirectory, EmployeeRecord, FieldChanges, NewEmployee, PersistOutcome, StorageError};

/// Flat-file implementation of the [`EmployeeDirectory`] trait
#[derive(Clone)]
pub struct FlatFileDirectory {
    root: PathBuf,
    /// Per-employee write locks; CAS on one file is serialized in-process
    locks: Arc<DashMap<EmployeeNo, Arc<Mutex<()>>>>,
    last_no: Arc<AtomicU32>,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        let employees = root.join("employees");
        fs::create_dir_all(&employees)?;

        // Resume number allocation after the highest record on disk
        let mut last_no = 0;
        for entry in fs::read_dir(&employees)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(no) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            {
                last_no = last_no.max(no);
            }
        }

        tracing::debug!(root = %root.display(), last_no, "opened flat-file directory");

        Ok(Self {
            root,
            locks: Arc::new(DashMap::new()),
            last_no: Arc::new(AtomicU32::new(last_no)),
        })
    }

    fn record_path(&self, employee_no: EmployeeNo) -> PathBuf {
        self.root
            .join("employees")
            .join(format!("{employee_no}.json"))
    }

    fn lock_for(&self, employee_no: EmployeeNo) -> Arc<Mutex<()>> {
        self.locks
            .entry(employee_no)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_record(&self, employee_no: EmployeeNo) -> Result<Option<EmployeeRecord>, StorageError> {
        let path = self.record_path(employee_no);

        let content = match tokio_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: EmployeeRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Replace the record file in one rename
    async fn write_record(&self, record: &EmployeeRecord) -> Result<(), StorageError> {
        let path = self.record_path(record.employee_no);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)?;
        let mut file = tokio_fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for FlatFileDirectory {
    async fn find_by_number(
        &self,
        employee_no: EmployeeNo,
    ) -> Result<Option<EmployeeRecord>, StorageError> {
        self.read_record(employee_no).await
    }

    async fn persist(
        &self,
        employee_no: EmployeeNo,
        expected_version: u64,
        changes: FieldChanges,
    ) -> Result<PersistOutcome, StorageError> {
        let lock = self.lock_for(employee_no);
        let _guard = lock.lock().await;

        let Some(mut record) = self.read_record(employee_no).await? else {
            return Ok(PersistOutcome::Absent);
        };
        if record.version != expected_version {
            return Ok(PersistOutcome::Conflict);
        }

        record.apply(changes);
        self.write_record(&record).await?;
        Ok(PersistOutcome::Persisted(record))
    }

    async fn insert(&self, employee: NewEmployee) -> Result<EmployeeRecord, StorageError> {
        let raw = self.last_no.fetch_add(1, Ordering::SeqCst) + 1;
        let employee_no = EmployeeNo::new(raw)
            .ok_or_else(|| StorageError::Unavailable("employee number space exhausted".to_string()))?;

        let lock = self.lock_for(employee_no);
        let _guard = lock.lock().await;

        let record = employee.into_record(employee_no);
        self.write_record(&record).await?;
        tracing::info!(%employee_no, "employee record created");
        Ok(record)
    }

    async fn remove(&self, employee_no: EmployeeNo) -> Result<bool, StorageError> {
        let lock = self.lock_for(employee_no);
        let _guard = lock.lock().await;

        match tokio_fs::remove_file(self.record_path(employee_no)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
