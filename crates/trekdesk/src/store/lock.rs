//! Advisory lock over the data directory.
//!
//! Every read-modify-write cycle holds the exclusive lock for its whole
//! duration; plain reads hold the shared lock. The lock is released when
//! the guard is dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{trace, warn};

use crate::error::{Error, Result};

/// Name of the lock file inside the data directory.
pub const LOCK_FILE_NAME: &str = ".trekdesk.lock";

/// Lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers may hold the lock at once.
    Shared,
    /// A single writer holds the lock.
    Exclusive,
}

/// Held lock; unlocks on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl LockGuard {
    /// Block until the lock at `path` is acquired in `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked.
    pub fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        let lock_err = |source| Error::StorageLock {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(lock_err)?;

        match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        }
        .map_err(lock_err)?;

        trace!(path = %path.display(), ?mode, "Acquired data lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
        })
    }

    /// The mode this guard holds.
    #[must_use]
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release data lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let guard = LockGuard::acquire(&path, LockMode::Exclusive).unwrap();
        assert!(path.exists());
        assert_eq!(guard.mode(), LockMode::Exclusive);
    }

    #[test]
    fn test_reacquire_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        drop(LockGuard::acquire(&path, LockMode::Exclusive).unwrap());
        let again = LockGuard::acquire(&path, LockMode::Exclusive);
        assert!(again.is_ok());
    }

    #[test]
    fn test_shared_locks_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let first = LockGuard::acquire(&path, LockMode::Shared).unwrap();
        let second = LockGuard::acquire(&path, LockMode::Shared).unwrap();
        assert_eq!(first.mode(), LockMode::Shared);
        assert_eq!(second.mode(), LockMode::Shared);
    }

    fn open_other(path: &Path) -> File {
        OpenOptions::new().read(true).write(true).open(path).unwrap()
    }

    #[test]
    fn test_exclusive_lock_excludes_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let guard = LockGuard::acquire(&path, LockMode::Exclusive).unwrap();
        let other = open_other(&path);
        assert!(FileExt::try_lock_exclusive(&other).is_err());
        assert!(FileExt::try_lock_shared(&other).is_err());

        drop(guard);
        assert!(FileExt::try_lock_exclusive(&other).is_ok());
        FileExt::unlock(&other).unwrap();
    }

    #[test]
    fn test_shared_lock_blocks_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let guard = LockGuard::acquire(&path, LockMode::Shared).unwrap();
        let other = open_other(&path);
        assert!(FileExt::try_lock_exclusive(&other).is_err());
        assert!(FileExt::try_lock_shared(&other).is_ok());
        FileExt::unlock(&other).unwrap();

        drop(guard);
        assert!(FileExt::try_lock_exclusive(&other).is_ok());
        FileExt::unlock(&other).unwrap();
    }

    #[test]
    fn test_missing_directory_is_lock_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(LOCK_FILE_NAME);

        let err = LockGuard::acquire(&path, LockMode::Shared).unwrap_err();
        assert!(matches!(err, Error::StorageLock { .. }));
    }
}
