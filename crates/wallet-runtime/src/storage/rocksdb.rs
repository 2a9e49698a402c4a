//! # RocksDB Snapshot Storage
//!
//! Stores snapshot text in a dedicated `snapshots` column family.
//!
//! ## Configuration
//!
//! - Snappy compression
//! - Bloom filters (10 bits per key)
//! - fsync on write unless configured otherwise

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteOptions, DB};

use super::{validate_key, StateStorage};
use crate::errors::StorageError;

/// Column family holding snapshots.
pub const CF_SNAPSHOTS: &str = "snapshots";

#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    pub path: PathBuf,
    /// Block cache size in bytes (default: 8MB; snapshots are small)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 4MB)
    pub write_buffer_size: usize,
    /// fsync after each write (default: true)
    pub sync_writes: bool,
}

impl RocksDbConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

/// RocksDB-backed [`StateStorage`].
pub struct RocksDbStorage {
    db: Arc<DB>,
    config: RocksDbConfig,
}

impl RocksDbStorage {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        let descriptors = vec![ColumnFamilyDescriptor::new(CF_SNAPSHOTS, cf_opts)];

        let db = DB::open_cf_descriptors(&opts, &config.path, descriptors)
            .map_err(|e| StorageError::Backend(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    fn read(db: &DB, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = db
            .cf_handle(CF_SNAPSHOTS)
            .ok_or_else(|| StorageError::Backend("missing snapshots column family".to_string()))?;
        db.get_cf(&cf, key.as_bytes())
            .map_err(|e| StorageError::Backend(format!("RocksDB get failed: {e}")))
    }

    fn write(db: &DB, key: &str, value: &str, sync: bool) -> Result<(), StorageError> {
        let cf = db
            .cf_handle(CF_SNAPSHOTS)
            .ok_or_else(|| StorageError::Backend("missing snapshots column family".to_string()))?;
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(sync);
        db.put_cf_opt(&cf, key.as_bytes(), value.as_bytes(), &write_opts)
            .map_err(|e| StorageError::Backend(format!("RocksDB put failed: {e}")))
    }
}

#[async_trait]
impl StateStorage for RocksDbStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let db = self.db.clone();
        let owned = key.to_string();
        let bytes = tokio::task::spawn_blocking(move || Self::read(&db, &owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))??;
        bytes
            .map(|b| {
                String::from_utf8(b).map_err(|_| StorageError::InvalidText {
                    key: key.to_string(),
                })
            })
            .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let db = self.db.clone();
        let key = key.to_string();
        let value = value.to_string();
        let sync = self.config.sync_writes;
        tokio::task::spawn_blocking(move || Self::write(&db, &key, &value, sync))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
    }
}
