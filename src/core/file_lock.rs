//! Exclusive flock(2) guard for read-modify-write of state files.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Held for the duration of one relation store update; closing the file on
/// drop releases the lock.
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Block until the lock at `path` is ours. The lock file is created if
    /// missing and never truncated.
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("acquire lock {}", path.display()))?;
        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_file_created() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("relations.lock");
        let _lock = FileLock::exclusive(&lock_path).unwrap();
        assert!(lock_path.exists());
    }

    #[test]
    fn test_lock_held_until_drop() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("relations.lock");
        let lock = FileLock::exclusive(&lock_path).unwrap();

        let other = File::open(&lock_path).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("missing/relations.lock");
        assert!(FileLock::exclusive(&lock_path).is_err());
    }
}
