//! # Snapshot Storage
//!
//! Durable key/value text storage for state snapshots.
//!
//! | Backend | Type | Notes |
//! |---------|------|-------|
//! | memory | [`MemoryStorage`] | Process lifetime only; used by tests |
//! | file | [`FileStorage`] | One file per key, write-then-rename, directory lock |
//! | rocksdb | `RocksDbStorage` | Requires the `rocksdb` feature |

mod file;
mod lock;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb;

pub use file::FileStorage;
pub use lock::DirectoryLock;
pub use memory::MemoryStorage;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStorage};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{RuntimeConfig, StorageBackend};
use crate::errors::StorageError;

/// Key under which the full state snapshot is stored.
pub const STATE_KEY: &str = "state";

/// Text key/value storage.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Open the backend selected by `config`.
pub fn open_storage(config: &RuntimeConfig) -> Result<Arc<dyn StateStorage>, StorageError> {
    info!(
        backend = %config.storage_backend,
        data_dir = %config.data_dir.display(),
        "[storage] Opening snapshot storage"
    );
    match config.storage_backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileStorage::open(&config.data_dir)?)),
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => Ok(Arc::new(RocksDbStorage::open(RocksDbConfig::new(
            config.data_dir.join("rocksdb"),
        ))?)),
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => Err(StorageError::Unavailable("rocksdb")),
    }
}

/// Reject keys that cannot be used as file names.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
