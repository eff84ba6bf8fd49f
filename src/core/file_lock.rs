//! Advisory flock(2) locks guarding the store document and reminder runs.

use crate::error::StorageError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// A held lock. Released on drop (closing the file releases the flock).
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Exclusive lock for writers, blocking until available.
    pub fn exclusive(path: &Path) -> Result<Self, StorageError> {
        let file = open_lock_file(path)?;
        file.lock_exclusive().map_err(|source| lock_error(path, source))?;
        Ok(Self { _file: file })
    }

    /// Shared lock for readers, blocking while a writer holds the lock.
    pub fn shared(path: &Path) -> Result<Self, StorageError> {
        let file = open_lock_file(path)?;
        file.lock_shared().map_err(|source| lock_error(path, source))?;
        Ok(Self { _file: file })
    }

    /// Try to take an exclusive lock without blocking.
    /// Returns `Ok(None)` when another holder has it.
    pub fn try_exclusive(path: &Path) -> Result<Option<Self>, StorageError> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { _file: file })),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            // fs2 on Linux may report EAGAIN as Other
            Err(ref e) if e.raw_os_error() == Some(11) => Ok(None),
            Err(source) => Err(lock_error(path, source)),
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File, StorageError> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|source| lock_error(path, source))
}

fn lock_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Lock {
        path: path.to_path_buf(),
        source,
    }
}
