//! Flat-file storage for trekdesk.
//!
//! Each record type lives in its own pipe-delimited text file inside the
//! data directory. A lock file next to them serializes access between
//! processes; callers take the lock once per operation and then use the
//! tables freely.

pub mod codec;
pub mod lock;
mod seed;
pub mod table;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use lock::{LockGuard, LockMode, LOCK_FILE_NAME};
pub use seed::{SeedReport, SAMPLE_TOURIST_USERNAME};
pub use table::Table;

use crate::error::{Error, Result};
use crate::model::{Booking, Guide, Trek, User};

/// The four data files of a data directory.
#[derive(Debug)]
pub struct FlatFileStore {
    data_dir: PathBuf,
    users: Table<User>,
    treks: Table<Trek>,
    guides: Table<Guide>,
    bookings: Table<Booking>,
}

impl FlatFileStore {
    /// Open the store in `data_dir`, creating the directory and files if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a data file cannot be created.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|source| Error::DirectoryCreate {
                path: data_dir.to_path_buf(),
                source,
            })?;
            info!(path = %data_dir.display(), "Created data directory");
        }

        let store = Self {
            data_dir: data_dir.to_path_buf(),
            users: Table::new(data_dir),
            treks: Table::new(data_dir),
            guides: Table::new(data_dir),
            bookings: Table::new(data_dir),
        };

        store.users.ensure_exists()?;
        store.treks.ensure_exists()?;
        store.guides.ensure_exists()?;
        store.bookings.ensure_exists()?;

        debug!(path = %data_dir.display(), "Opened flat-file store");
        Ok(store)
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE_NAME)
    }

    /// Take the shared lock for a read-only operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked.
    pub fn read_lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(&self.lock_path(), LockMode::Shared)
    }

    /// Take the exclusive lock for an operation that writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked.
    pub fn write_lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(&self.lock_path(), LockMode::Exclusive)
    }

    #[must_use]
    pub fn users(&self) -> &Table<User> {
        &self.users
    }

    #[must_use]
    pub fn treks(&self) -> &Table<Trek> {
        &self.treks
    }

    #[must_use]
    pub fn guides(&self) -> &Table<Guide> {
        &self.guides
    }

    #[must_use]
    pub fn bookings(&self) -> &Table<Booking> {
        &self.bookings
    }

    /// Look up an account by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if `users.txt` cannot be read.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users.find_by(|user| user.username == username)
    }

    /// The guide profile linked to an account, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `guides.txt` cannot be read.
    pub fn find_guide_by_user(&self, user_id: &str) -> Result<Option<Guide>> {
        self.guides
            .find_by(|guide| guide.user_id.as_deref() == Some(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let store = FlatFileStore::open(&data_dir).unwrap();

        for name in ["users.txt", "treks.txt", "guides.txt", "bookings.txt"] {
            assert!(data_dir.join(name).exists(), "{name} missing");
        }
        assert_eq!(store.data_dir(), data_dir);
    }

    #[test]
    fn test_open_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("treks.txt"),
            "t1|Poon Hill Trek|Annapurna|3210|5|Easy|700|Short\n",
        )
        .unwrap();

        let store = FlatFileStore::open(dir.path()).unwrap();
        assert_eq!(store.treks().count().unwrap(), 1);
    }

    #[test]
    fn test_find_user_by_username() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("users.txt"),
            "u1|admin|pw|System Administrator|admin@tripsewa.com|9800000000|Nepal|||ADMIN|\n",
        )
        .unwrap();
        let store = FlatFileStore::open(dir.path()).unwrap();

        assert!(store.find_user_by_username("admin").unwrap().is_some());
        assert!(store.find_user_by_username("Admin").unwrap().is_none());
    }

    #[test]
    fn test_find_guide_by_user() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("guides.txt"),
            "g1|u7|Pasang|p@example.com|9800000003|English|3|Basic|General|true\ng2||Dawa|d@example.com|9800000004\n",
        )
        .unwrap();
        let store = FlatFileStore::open(dir.path()).unwrap();

        assert_eq!(store.find_guide_by_user("u7").unwrap().unwrap().id, "g1");
        assert!(store.find_guide_by_user("u8").unwrap().is_none());
    }

    #[test]
    fn test_read_then_write_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::open(dir.path()).unwrap();

        {
            let guard = store.read_lock().unwrap();
            assert_eq!(guard.mode(), LockMode::Shared);
        }
        let guard = store.write_lock().unwrap();
        assert_eq!(guard.mode(), LockMode::Exclusive);
        assert!(store.lock_path().exists());
    }
}
