//! Record store contract and its file-backed implementation.
//!
//! `FileStore` keeps every record in one TOML document. Each operation takes
//! the lock file next to the document (shared for reads, exclusive for
//! writes), loads the document, and writes changes back through a temp file
//! that is renamed over the original, so callers never see a partial write.

use crate::constants;
use crate::core::calendar;
use crate::core::file_lock::FileLock;
use crate::error::StorageError;
use crate::models::record::{CredentialRecord, NewRecord};
use crate::models::smtp::StoredSmtpSettings;
use crate::models::store_file::{StoreFile, STORE_VERSION};
use crate::util::fs as store_fs;
use crate::util::path as store_path;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistence and queries the reminder engine relies on.
pub trait RecordStore {
    /// Insert a record and return its newly assigned id.
    fn add_record(&self, record: &NewRecord) -> Result<i64, StorageError>;

    /// All records, ordered by expiry date then id.
    fn list_records(&self) -> Result<Vec<CredentialRecord>, StorageError>;

    /// Delete a record. Returns whether it existed.
    fn remove_record(&self, id: i64) -> Result<bool, StorageError>;

    /// Records expiring within `[today, today + window_days]`, ordered like
    /// [`RecordStore::list_records`].
    fn query_due_for_reminders(
        &self,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<Vec<CredentialRecord>, StorageError>;

    /// Record that a reminder went out on `today`. Repeating the call for the
    /// same day leaves the record untouched.
    fn mark_reminded(&self, id: i64, today: NaiveDate) -> Result<(), StorageError>;

    /// SMTP settings held in the store, possibly incomplete.
    fn smtp_settings(&self) -> Result<Option<StoredSmtpSettings>, StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = store_path::with_suffix(&path, ".lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the store directory and an empty document if none exists.
    /// Returns `true` when a new document was written.
    pub fn initialize(&self) -> Result<bool, StorageError> {
        self.ensure_parent()?;
        let _lock = FileLock::exclusive(&self.lock_path)?;
        if self.exists() {
            return Ok(false);
        }
        self.save(&StoreFile::default())?;
        tracing::info!(path = %self.path.display(), "initialized record store");
        Ok(true)
    }

    /// Replace the store-held SMTP settings.
    pub fn save_smtp_settings(&self, settings: StoredSmtpSettings) -> Result<(), StorageError> {
        self.write(|doc| {
            doc.smtp = Some(settings);
        })
    }

    /// Drop the store-held SMTP settings. Returns whether any were set.
    pub fn clear_smtp_settings(&self) -> Result<bool, StorageError> {
        self.write(|doc| doc.smtp.take().is_some())
    }

    fn read(&self) -> Result<StoreFile, StorageError> {
        if !self.dir().exists() {
            return Ok(StoreFile::default());
        }
        // No lock file means no writer has run; persist is an atomic rename,
        // so reading without the lock still sees a whole document.
        if !self.lock_path.exists() {
            return self.load();
        }
        let _lock = FileLock::shared(&self.lock_path)?;
        self.load()
    }

    fn write<T>(&self, mutate: impl FnOnce(&mut StoreFile) -> T) -> Result<T, StorageError> {
        self.ensure_parent()?;
        let _lock = FileLock::exclusive(&self.lock_path)?;
        let mut doc = self.load()?;
        let out = mutate(&mut doc);
        self.save(&doc)?;
        Ok(out)
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn ensure_parent(&self) -> Result<(), StorageError> {
        store_fs::ensure_dir(self.dir(), constants::STORE_DIR_MODE)
            .map_err(|source| self.io_error(source))
    }

    fn load(&self) -> Result<StoreFile, StorageError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let doc: StoreFile = toml::from_str(&content).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if doc.store.version > STORE_VERSION {
            return Err(StorageError::Version {
                path: self.path.clone(),
                version: doc.store.version,
            });
        }
        tracing::debug!(
            path = %self.path.display(),
            records = doc.records.len(),
            "loaded record store"
        );
        Ok(doc)
    }

    fn save(&self, doc: &StoreFile) -> Result<(), StorageError> {
        let content = toml::to_string_pretty(doc)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".certmon-")
            .suffix(".tmp")
            .tempfile_in(self.dir())
            .map_err(|source| self.io_error(source))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|source| self.io_error(source))?;
        store_fs::set_permissions(tmp.path(), constants::STORE_FILE_MODE)
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path).map_err(|err| StorageError::Persist {
            path: self.path.clone(),
            source: err.error,
        })?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for FileStore {
    fn add_record(&self, record: &NewRecord) -> Result<i64, StorageError> {
        let id = self.write(|doc| {
            let id = doc.store.next_id.max(next_free_id(&doc.records));
            let now = Utc::now();
            doc.records.push(CredentialRecord {
                id,
                name: record.name.clone(),
                notify_email: record.notify_email.clone(),
                acquired_on: record.acquired_on,
                valid_months: record.valid_months,
                expires_on: record.expires_on,
                notes: record.notes.clone(),
                last_reminded_on: None,
                created_at: now,
                updated_at: now,
            });
            sort_records(&mut doc.records);
            doc.store.next_id = id + 1;
            id
        })?;
        tracing::debug!(id, name = %record.name, expires_on = %record.expires_on, "added record");
        Ok(id)
    }

    fn list_records(&self) -> Result<Vec<CredentialRecord>, StorageError> {
        let mut records = self.read()?.records;
        sort_records(&mut records);
        Ok(records)
    }

    fn remove_record(&self, id: i64) -> Result<bool, StorageError> {
        let removed = self.write(|doc| {
            let before = doc.records.len();
            doc.records.retain(|r| r.id != id);
            doc.records.len() != before
        })?;
        tracing::debug!(id, removed, "remove record");
        Ok(removed)
    }

    fn query_due_for_reminders(
        &self,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<Vec<CredentialRecord>, StorageError> {
        let end = calendar::window_end(today, window_days);
        let mut due: Vec<CredentialRecord> = self
            .read()?
            .records
            .into_iter()
            .filter(|r| r.expires_on >= today && r.expires_on <= end)
            .collect();
        sort_records(&mut due);
        Ok(due)
    }

    fn mark_reminded(&self, id: i64, today: NaiveDate) -> Result<(), StorageError> {
        self.write(|doc| {
            if let Some(record) = doc.records.iter_mut().find(|r| r.id == id) {
                if record.last_reminded_on != Some(today) {
                    record.last_reminded_on = Some(today);
                    record.updated_at = Utc::now();
                }
            }
        })
    }

    fn smtp_settings(&self) -> Result<Option<StoredSmtpSettings>, StorageError> {
        Ok(self.read()?.smtp)
    }
}

fn sort_records(records: &mut [CredentialRecord]) {
    records.sort_by(|a, b| a.expires_on.cmp(&b.expires_on).then(a.id.cmp(&b.id)));
}

fn next_free_id(records: &[CredentialRecord]) -> i64 {
    records.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::permanent_expiry;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data").join("certmon.toml"));
        store.initialize().unwrap();
        (dir, store)
    }

    fn expiring(name: &str, expires_on: NaiveDate) -> NewRecord {
        NewRecord {
            name: name.into(),
            notify_email: format!("{}@example.com", name),
            acquired_on: expires_on,
            valid_months: constants::FIXED_EXPIRY_MONTHS,
            expires_on,
            notes: None,
        }
    }

    fn permanent(name: &str) -> NewRecord {
        NewRecord {
            name: name.into(),
            notify_email: "owner@example.com".into(),
            acquired_on: date(2024, 1, 1),
            valid_months: constants::PERMANENT_MONTHS,
            expires_on: permanent_expiry(),
            notes: None,
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = test_store();
        assert!(store.exists());
        assert!(!store.initialize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_mode() {
        let (_dir, store) = test_store();
        assert_eq!(store_fs::mode_of(store.path()), Some(constants::STORE_FILE_MODE));
    }

    #[test]
    fn test_lock_file_sits_beside_document() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("records.lock"));
        store.initialize().unwrap();
        store.add_record(&expiring("a", date(2025, 1, 1))).unwrap();
        assert!(dir.path().join("records.lock.lock").is_file());
        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_reads_do_not_create_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certmon.toml");
        let lock = dir.path().join("certmon.toml.lock");
        {
            let store = FileStore::open(&path);
            store.initialize().unwrap();
            store.add_record(&expiring("a", date(2025, 1, 1))).unwrap();
        }
        std::fs::remove_file(&lock).unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.list_records().unwrap().len(), 1);
        assert!(store.smtp_settings().unwrap().is_none());
        assert!(!lock.exists());
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let (_dir, store) = test_store();
        let a = store.add_record(&expiring("a", date(2025, 1, 1))).unwrap();
        let b = store.add_record(&expiring("b", date(2025, 1, 1))).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);

        let records = store.list_records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.last_reminded_on.is_none()));
        assert!(records.iter().all(|r| r.created_at == r.updated_at));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let (_dir, store) = test_store();
        let a = store.add_record(&expiring("a", date(2025, 1, 1))).unwrap();
        assert!(store.remove_record(a).unwrap());
        let b = store.add_record(&expiring("b", date(2025, 1, 1))).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_list_orders_by_expiry_then_id() {
        let (_dir, store) = test_store();
        store.add_record(&expiring("late", date(2025, 6, 1))).unwrap();
        store.add_record(&expiring("early", date(2025, 1, 1))).unwrap();
        store.add_record(&expiring("early-2", date(2025, 1, 1))).unwrap();
        let names: Vec<String> = store
            .list_records()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["early", "early-2", "late"]);
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let (_dir, store) = test_store();
        assert!(!store.remove_record(42).unwrap());
    }

    #[test]
    fn test_remove_is_permanent() {
        let (_dir, store) = test_store();
        let id = store.add_record(&expiring("gone", date(2025, 1, 1))).unwrap();
        assert!(store.remove_record(id).unwrap());
        assert!(!store.remove_record(id).unwrap());
        assert!(store.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_window_is_closed_interval() {
        let (_dir, store) = test_store();
        let today = date(2024, 12, 28);
        store.add_record(&expiring("yesterday", date(2024, 12, 27))).unwrap();
        store.add_record(&expiring("today", today)).unwrap();
        store.add_record(&expiring("edge", date(2025, 1, 4))).unwrap();
        store.add_record(&expiring("outside", date(2025, 1, 5))).unwrap();

        let names: Vec<String> = store
            .query_due_for_reminders(today, 7)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["today", "edge"]);
    }

    #[test]
    fn test_permanent_never_due() {
        let (_dir, store) = test_store();
        store.add_record(&permanent("forever")).unwrap();
        let today = date(2024, 12, 28);
        for window in [0, 7, 365, 9_999] {
            assert!(store.query_due_for_reminders(today, window).unwrap().is_empty());
        }
    }

    #[test]
    fn test_mark_reminded_is_idempotent() {
        let (_dir, store) = test_store();
        let id = store.add_record(&expiring("a", date(2025, 1, 1))).unwrap();
        let today = date(2024, 12, 28);

        store.mark_reminded(id, today).unwrap();
        let first = store.list_records().unwrap().remove(0);
        assert_eq!(first.last_reminded_on, Some(today));

        store.mark_reminded(id, today).unwrap();
        let second = store.list_records().unwrap().remove(0);
        assert_eq!(first, second);

        let tomorrow = date(2024, 12, 29);
        store.mark_reminded(id, tomorrow).unwrap();
        let third = store.list_records().unwrap().remove(0);
        assert_eq!(third.last_reminded_on, Some(tomorrow));
    }

    #[test]
    fn test_smtp_settings_roundtrip_and_clear() {
        let (_dir, store) = test_store();
        assert!(store.smtp_settings().unwrap().is_none());

        let settings = StoredSmtpSettings {
            host: Some("smtp.example.com".into()),
            port: Some(587),
            ..Default::default()
        };
        store.save_smtp_settings(settings.clone()).unwrap();
        assert_eq!(store.smtp_settings().unwrap(), Some(settings));

        assert!(store.clear_smtp_settings().unwrap());
        assert!(!store.clear_smtp_settings().unwrap());
        assert!(store.smtp_settings().unwrap().is_none());
    }

    #[test]
    fn test_reads_before_initialize_are_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("missing").join("certmon.toml"));
        assert!(store.list_records().unwrap().is_empty());
        assert!(store.smtp_settings().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_document_is_parse_error() {
        let (_dir, store) = test_store();
        fs::write(store.path(), "records = [[[").unwrap();
        assert!(matches!(
            store.list_records(),
            Err(StorageError::Parse { .. })
        ));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let (_dir, store) = test_store();
        fs::write(store.path(), "[store]\nversion = 99\nnext_id = 1\n").unwrap();
        assert!(matches!(
            store.list_records(),
            Err(StorageError::Version { version: 99, .. })
        ));
    }

    #[test]
    fn test_failed_load_leaves_document_untouched() {
        let (_dir, store) = test_store();
        fs::write(store.path(), "not = [valid").unwrap();
        assert!(store.add_record(&expiring("lost", date(2025, 1, 1))).is_err());
        assert!(store.mark_reminded(1, date(2025, 1, 1)).is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "not = [valid");
    }
}
