//! Advisory locking around a database's read-modify-write cycle.
//!
//! The lock lives on a sidecar file (`.<db>.lock`) rather than the
//! database itself, because writes replace the database by rename and
//! a lock on the old inode would not be seen by the next opener.
//! Mutations take the lock exclusively, reads take it shared.  The lock
//! is released when the guard is dropped.

use std::fs::File;
use std::path::Path;

use fs4::fs_std::FileExt;
use tracing::debug;

use super::format::{open_lock_file, sidecar_path};
use crate::errors::Result;

/// Held for the duration of one store operation.
#[derive(Debug)]
pub struct DatabaseLock {
    _file: File,
}

impl DatabaseLock {
    /// Block until no other process holds any lock on `db_path`.
    pub fn exclusive(db_path: &Path) -> Result<Self> {
        Self::acquire(db_path, true)
    }

    /// Block until no other process holds an exclusive lock on `db_path`.
    pub fn shared(db_path: &Path) -> Result<Self> {
        Self::acquire(db_path, false)
    }

    fn acquire(db_path: &Path, exclusive: bool) -> Result<Self> {
        let lock_path = sidecar_path(db_path, "lock")?;
        let file = open_lock_file(&lock_path)?;
        if exclusive {
            FileExt::lock_exclusive(&file)?;
        } else {
            FileExt::lock_shared(&file)?;
        }
        debug!(path = %lock_path.display(), exclusive, "acquired database lock");
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn shared_locks_coexist() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("db");
        let a = DatabaseLock::shared(&db).unwrap();
        let b = DatabaseLock::shared(&db).unwrap();
        drop((a, b));
        assert!(tmp.path().join(".db.lock").exists());
    }

    #[test]
    fn exclusive_lock_is_reacquirable_after_drop() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("db");
        drop(DatabaseLock::exclusive(&db).unwrap());
        drop(DatabaseLock::exclusive(&db).unwrap());
    }

    #[test]
    fn exclusive_lock_blocks_other_holders() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Duration;

        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("db");
        let acquired = AtomicBool::new(false);

        let guard = DatabaseLock::exclusive(&db).unwrap();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                let _second = DatabaseLock::shared(&db).unwrap();
                acquired.store(true, Ordering::SeqCst);
            });
            std::thread::sleep(Duration::from_millis(200));
            assert!(!acquired.load(Ordering::SeqCst), "lock was not exclusive");
            drop(guard);
        });
        assert!(acquired.load(Ordering::SeqCst));
    }
}
