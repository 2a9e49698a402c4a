//! Runtime configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use shared_types::Address;
use tracing::warn;

/// Where snapshots are stored when persistence is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::RocksDb => "rocksdb",
        };
        f.write_str(s)
    }
}

/// Configuration for the wallet runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Hydrate from and write snapshots to storage
    pub persist_state: bool,

    /// Snapshot storage backend
    pub storage_backend: StorageBackend,

    /// Directory for the file and RocksDB backends
    pub data_dir: PathBuf,

    /// Account registered with the indexer at startup
    pub initial_account: Option<Address>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            persist_state: false,
            storage_backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data/wallet"),
            initial_account: None,
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WALLET_PERSIST_STATE`: `true` or `1` enables persistence (default: off)
    /// - `WALLET_STORAGE_BACKEND`: `memory`, `file` or `rocksdb` (default: file
    ///   when persistence is on, memory otherwise)
    /// - `WALLET_DATA_DIR`: Data directory (default: ./data/wallet)
    /// - `WALLET_INITIAL_ACCOUNT`: `0x`-prefixed account address (default: none)
    ///
    /// Invalid values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let persist_state = lookup("WALLET_PERSIST_STATE")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.persist_state);

        // Snapshots must outlive the process once persistence is on.
        let default_backend = if persist_state {
            StorageBackend::File
        } else {
            defaults.storage_backend
        };
        let storage_backend = match lookup("WALLET_STORAGE_BACKEND") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("[config] {}, using {}", e, default_backend);
                default_backend
            }),
            None => default_backend,
        };
        if persist_state && storage_backend == StorageBackend::Memory {
            warn!("[config] Persistence uses the memory backend, state is lost on restart");
        }

        let initial_account = lookup("WALLET_INITIAL_ACCOUNT")
            .filter(|v| !v.trim().is_empty())
            .and_then(|value| match value.trim().parse::<Address>() {
                Ok(address) => Some(address),
                Err(e) => {
                    warn!("[config] Ignoring WALLET_INITIAL_ACCOUNT: {}", e);
                    None
                }
            });

        Self {
            persist_state,
            storage_backend,
            data_dir: lookup("WALLET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            initial_account,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert!(!config.persist_state);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.initial_account.is_none());

        // The toggle alone picks a backend that survives restarts.
        let config = RuntimeConfig::from_lookup(lookup(&[("WALLET_PERSIST_STATE", "true")]));
        assert!(config.persist_state);
        assert_eq!(config.storage_backend, StorageBackend::File);
    }

    #[test]
    fn test_explicit_backend_wins_over_default() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WALLET_PERSIST_STATE", "true"),
            ("WALLET_STORAGE_BACKEND", "memory"),
        ]));
        assert_eq!(config.storage_backend, StorageBackend::Memory);

        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WALLET_PERSIST_STATE", "1"),
            ("WALLET_STORAGE_BACKEND", "postgres"),
        ]));
        assert_eq!(config.storage_backend, StorageBackend::File);
    }

    #[test]
    fn test_persist_toggle() {
        for (value, expected) in [("true", true), ("1", true), ("TRUE", true), ("yes", false), ("0", false)] {
            let config = RuntimeConfig::from_lookup(lookup(&[("WALLET_PERSIST_STATE", value)]));
            assert_eq!(config.persist_state, expected, "value {value}");
        }
    }

    #[test]
    fn test_full_config() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WALLET_PERSIST_STATE", "true"),
            ("WALLET_STORAGE_BACKEND", "File"),
            ("WALLET_DATA_DIR", "/var/lib/wallet"),
            ("WALLET_INITIAL_ACCOUNT", "0x00000000000000000000000000000000000000aa"),
        ]));
        assert!(config.persist_state);
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/wallet"));
        assert_eq!(
            config.initial_account.unwrap().as_str(),
            "0x00000000000000000000000000000000000000aa"
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("WALLET_STORAGE_BACKEND", "postgres"),
            ("WALLET_INITIAL_ACCOUNT", "not-an-address"),
        ]));
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.initial_account.is_none());
    }
}
