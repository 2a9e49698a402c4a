//! In-memory preference store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::ServiceEmitter;
use shared_types::{ServiceError, ServiceErrorKind, ServiceId};

use crate::ports::PreferenceService;

/// Symbol reported for the base asset.
pub const PREF_BASE_SYMBOL: &str = "base_symbol";
/// Seconds between chain balance polls. `0` disables polling.
pub const PREF_BALANCE_POLL_SECS: &str = "balance_poll_secs";
/// Network the chain service connects to.
pub const PREF_NETWORK: &str = "network";

const DEFAULTS: &[(&str, &str)] = &[
    (PREF_BASE_SYMBOL, "ETH"),
    (PREF_BALANCE_POLL_SECS, "0"),
    (PREF_NETWORK, "mainnet"),
];

/// Preferences held in memory, falling back to built-in defaults.
pub struct MemoryPreferences {
    events: ServiceEmitter,
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: ServiceEmitter::new(ServiceId::Preferences),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Start with explicit values layered over the defaults.
    #[must_use]
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let prefs = Self::new();
        prefs
            .values
            .write()
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        prefs
    }

    /// Read a preference synchronously.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.read().get(key) {
            return Some(value.clone());
        }
        DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceService for MemoryPreferences {
    fn events(&self) -> &ServiceEmitter {
        &self.events
    }

    async fn get_preference(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.get(key))
    }

    async fn set_preference(&self, key: &str, value: String) -> Result<(), ServiceError> {
        if key.is_empty() {
            return Err(ServiceError::new(
                ServiceId::Preferences,
                ServiceErrorKind::InvalidInput,
                "preference key must not be empty",
            ));
        }
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}
