//! File-per-key storage in a locked data directory.
//!
//! Each key is written to `<key>.tmp`, synced, then renamed over `<key>.json`
//! so a crash never leaves a half-written snapshot behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::lock::DirectoryLock;
use super::{validate_key, StateStorage};
use crate::errors::StorageError;

#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    _lock: DirectoryLock,
}

impl FileStorage {
    /// Create `dir` if needed and lock it for this process.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        let lock = DirectoryLock::acquire(dir)?;
        info!(dir = %dir.display(), "[storage] File storage opened");
        Ok(Self {
            dir: dir.to_path_buf(),
            _lock: lock,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StateStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match tokio::fs::read(self.value_path(key)).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::InvalidText {
                    key: key.to_string(),
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let target = self.value_path(key);
        let tmp = self.dir.join(format!("{key}.tmp"));

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &target).await?;
        debug!(key, bytes = value.len(), "[storage] Value written");
        Ok(())
    }
}
