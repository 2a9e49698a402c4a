//! # Data Directory Locking
//!
//! Prevents two runtimes from writing snapshots into the same directory.
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::errors::StorageError;

/// Exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DirectoryLock {
    /// Kept open to hold the lock.
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DirectoryLock {
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire the lock on `data_dir` without blocking.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyLocked` if another process holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, StorageError> {
        let lock_path = data_dir.join(Self::LOCK_FILE);

        // Not truncated before locking, so a holder's PID stays readable.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        file.set_len(0)?;
        writeln!(file, "{pid}")?;
        file.sync_all()?;

        Ok(Self {
            file,
            path: lock_path,
            pid,
        })
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lock_contains_pid() {
        let dir = TempDir::new().unwrap();
        let lock = DirectoryLock::acquire(dir.path()).unwrap();
        let content = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim().parse::<u32>().unwrap(), std::process::id());
        assert_eq!(lock.pid(), std::process::id());
    }

    #[test]
    fn test_double_lock_fails() {
        let dir = TempDir::new().unwrap();
        let _lock = DirectoryLock::acquire(dir.path()).unwrap();
        let result = DirectoryLock::acquire(dir.path());
        assert!(matches!(
            result,
            Err(StorageError::AlreadyLocked { pid: Some(pid), .. }) if pid == std::process::id()
        ));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        {
            let _lock = DirectoryLock::acquire(dir.path()).unwrap();
        }
        assert!(!dir.path().join("LOCK").exists());
        DirectoryLock::acquire(dir.path()).unwrap();
    }
}
