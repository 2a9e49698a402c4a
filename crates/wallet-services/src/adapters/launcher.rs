//! Reference launcher.
//!
//! Builds the in-memory adapters. Launch delays and failures can be
//! injected per service, and the concrete instances stay reachable so a
//! host can drive them (inject transactions, seed balances).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, Amount, ServiceError, ServiceId};
use tracing::{debug, info};

use super::chain::SimulatedChain;
use super::indexer::SimulatedIndexer;
use super::keyring::MemoryKeyring;
use super::preferences::{MemoryPreferences, PREF_BALANCE_POLL_SECS, PREF_BASE_SYMBOL};
use crate::ports::{ChainService, IndexerService, KeyringService, PreferenceService, ServiceLauncher};

#[derive(Default)]
struct Launched {
    preferences: Option<Arc<MemoryPreferences>>,
    chain: Option<Arc<SimulatedChain>>,
    indexer: Option<Arc<SimulatedIndexer>>,
    keyring: Option<Arc<MemoryKeyring>>,
}

/// [`ServiceLauncher`] over the in-memory reference adapters.
#[derive(Default)]
pub struct ReferenceLauncher {
    delays: HashMap<ServiceId, Duration>,
    failures: HashSet<ServiceId>,
    preferences: Vec<(String, String)>,
    chain_balances: Vec<(Address, Amount)>,
    launched: Mutex<Launched>,
}

impl ReferenceLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before launching `service`.
    #[must_use]
    pub fn with_delay(mut self, service: ServiceId, delay: Duration) -> Self {
        self.delays.insert(service, delay);
        self
    }

    /// Make the launch of `service` fail.
    #[must_use]
    pub fn with_failure(mut self, service: ServiceId) -> Self {
        self.failures.insert(service);
        self
    }

    /// Preference value applied at launch.
    #[must_use]
    pub fn with_preference(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.preferences.push((key.into(), value.into()));
        self
    }

    /// Chain balance seeded at launch.
    #[must_use]
    pub fn with_chain_balance(mut self, address: Address, amount: Amount) -> Self {
        self.chain_balances.push((address, amount));
        self
    }

    #[must_use]
    pub fn preferences(&self) -> Option<Arc<MemoryPreferences>> {
        self.launched.lock().preferences.clone()
    }

    #[must_use]
    pub fn chain(&self) -> Option<Arc<SimulatedChain>> {
        self.launched.lock().chain.clone()
    }

    #[must_use]
    pub fn indexer(&self) -> Option<Arc<SimulatedIndexer>> {
        self.launched.lock().indexer.clone()
    }

    #[must_use]
    pub fn keyring(&self) -> Option<Arc<MemoryKeyring>> {
        self.launched.lock().keyring.clone()
    }

    async fn prepare(&self, service: ServiceId) -> Result<(), ServiceError> {
        if let Some(delay) = self.delays.get(&service) {
            debug!(service = %service, delay_ms = delay.as_millis() as u64, "Delaying launch");
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&service) {
            return Err(ServiceError::init_failed(service, "launch failure injected"));
        }
        Ok(())
    }

    async fn symbol(preferences: &dyn PreferenceService) -> Result<String, ServiceError> {
        Ok(preferences
            .get_preference(PREF_BASE_SYMBOL)
            .await?
            .unwrap_or_else(|| "ETH".to_string()))
    }
}

#[async_trait]
impl ServiceLauncher for ReferenceLauncher {
    async fn launch_preferences(&self) -> Result<Arc<dyn PreferenceService>, ServiceError> {
        self.prepare(ServiceId::Preferences).await?;
        let prefs = Arc::new(MemoryPreferences::with_values(self.preferences.clone()));
        self.launched.lock().preferences = Some(prefs.clone());
        info!("[preferences] Service launched");
        Ok(prefs)
    }

    async fn launch_chain(
        &self,
        preferences: Arc<dyn PreferenceService>,
    ) -> Result<Arc<dyn ChainService>, ServiceError> {
        self.prepare(ServiceId::Chain).await?;
        let chain = Arc::new(SimulatedChain::new(Self::symbol(preferences.as_ref()).await?));
        for (address, amount) in &self.chain_balances {
            chain.set_balance(address.clone(), amount.clone());
        }

        let poll_secs = preferences
            .get_preference(PREF_BALANCE_POLL_SECS)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        if poll_secs > 0 {
            chain.start_polling(Duration::from_secs(poll_secs));
        }

        self.launched.lock().chain = Some(chain.clone());
        info!("[chain] Service launched");
        Ok(chain)
    }

    async fn launch_indexer(
        &self,
        preferences: Arc<dyn PreferenceService>,
        chain: Arc<dyn ChainService>,
    ) -> Result<Arc<dyn IndexerService>, ServiceError> {
        self.prepare(ServiceId::Indexer).await?;
        let indexer = Arc::new(SimulatedIndexer::new(
            chain,
            Self::symbol(preferences.as_ref()).await?,
        ));
        self.launched.lock().indexer = Some(indexer.clone());
        info!("[indexer] Service launched");
        Ok(indexer)
    }

    async fn launch_keyring(&self) -> Result<Arc<dyn KeyringService>, ServiceError> {
        self.prepare(ServiceId::Keyring).await?;
        let keyring = Arc::new(MemoryKeyring::new());
        self.launched.lock().keyring = Some(keyring.clone());
        info!("[keyring] Service launched");
        Ok(keyring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ServiceErrorKind;

    #[tokio::test]
    async fn test_launch_all() {
        let launcher = ReferenceLauncher::new().with_preference(PREF_BASE_SYMBOL, "GLMR");
        let prefs = launcher.launch_preferences().await.unwrap();
        let chain = launcher.launch_chain(prefs.clone()).await.unwrap();
        let _indexer = launcher.launch_indexer(prefs, chain).await.unwrap();
        let _keyring = launcher.launch_keyring().await.unwrap();

        assert!(launcher.chain().is_some());
        assert!(launcher.indexer().is_some());
        assert!(launcher.keyring().is_some());
        assert_eq!(
            launcher.preferences().unwrap().get(PREF_BASE_SYMBOL),
            Some("GLMR".to_string())
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let launcher = ReferenceLauncher::new().with_failure(ServiceId::Keyring);
        let err = launcher.launch_keyring().await.err().unwrap();
        assert_eq!(err.service, ServiceId::Keyring);
        assert_eq!(err.kind, ServiceErrorKind::InitializationFailed);
        assert!(launcher.keyring().is_none());
    }

    #[tokio::test]
    async fn test_seeded_chain_balance() {
        let address = Address::from_bytes(&[0x42; 20]);
        let launcher =
            ReferenceLauncher::new().with_chain_balance(address.clone(), Amount::from(10u64));
        let prefs = launcher.launch_preferences().await.unwrap();
        let chain = launcher.launch_chain(prefs).await.unwrap();
        chain.add_account_to_track(address.clone()).await.unwrap();
        let balance = chain.get_latest_balance(&address).await.unwrap();
        assert_eq!(balance.amount, Amount::from(10u64));
    }
}
