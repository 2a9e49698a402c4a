//! # Test Fixtures
//!
//! A launcher that records the order of startup steps, and polling helpers
//! for asserting on eventually-consistent state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::ServiceEmitter;
use shared_types::{Address, AssetAmount, ServiceError};
use wallet_services::{
    ChainService, IndexerService, KeyringService, PreferenceService, ReferenceLauncher,
    ServiceLauncher,
};

/// Default bound for eventually-true assertions.
pub const EVENTUALLY: Duration = Duration::from_secs(3);

/// Deterministic test address.
pub fn addr(b: u8) -> Address {
    Address::from_bytes(&[b; 20])
}

/// Poll `check` until it returns true or `EVENTUALLY` elapses.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(EVENTUALLY, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

/// Await `fut` with the `EVENTUALLY` bound.
pub async fn within<T>(fut: impl Future<Output = T>) -> Option<T> {
    tokio::time::timeout(EVENTUALLY, fut).await.ok()
}

// =============================================================================
// RECORDING LAUNCHER
// =============================================================================

/// Shared, ordered log of startup steps.
pub type StepLog = Arc<Mutex<Vec<String>>>;

/// Wraps [`ReferenceLauncher`] and records launches and indexer
/// registrations in order.
pub struct RecordingLauncher {
    inner: Arc<ReferenceLauncher>,
    log: StepLog,
}

impl RecordingLauncher {
    pub fn new(inner: ReferenceLauncher) -> Self {
        Self {
            inner: Arc::new(inner),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn inner(&self) -> Arc<ReferenceLauncher> {
        self.inner.clone()
    }

    pub fn steps(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, step: impl Into<String>) {
        self.log.lock().push(step.into());
    }
}

#[async_trait]
impl ServiceLauncher for RecordingLauncher {
    async fn launch_preferences(&self) -> Result<Arc<dyn PreferenceService>, ServiceError> {
        let prefs = self.inner.launch_preferences().await?;
        self.record("launched:preferences");
        Ok(prefs)
    }

    async fn launch_chain(
        &self,
        preferences: Arc<dyn PreferenceService>,
    ) -> Result<Arc<dyn ChainService>, ServiceError> {
        let chain = self.inner.launch_chain(preferences).await?;
        self.record("launched:chain");
        Ok(chain)
    }

    async fn launch_indexer(
        &self,
        preferences: Arc<dyn PreferenceService>,
        chain: Arc<dyn ChainService>,
    ) -> Result<Arc<dyn IndexerService>, ServiceError> {
        self.record("launching:indexer");
        let inner = self.inner.launch_indexer(preferences, chain).await?;
        self.record("launched:indexer");
        Ok(Arc::new(RecordingIndexer {
            inner,
            log: self.log.clone(),
        }))
    }

    async fn launch_keyring(&self) -> Result<Arc<dyn KeyringService>, ServiceError> {
        let keyring = self.inner.launch_keyring().await?;
        self.record("launched:keyring");
        Ok(keyring)
    }
}

struct RecordingIndexer {
    inner: Arc<dyn IndexerService>,
    log: StepLog,
}

#[async_trait]
impl IndexerService for RecordingIndexer {
    fn events(&self) -> &ServiceEmitter {
        self.inner.events()
    }

    async fn register_tracked_account(&self, address: Address) -> Result<(), ServiceError> {
        self.log.lock().push(format!("register:{address}"));
        self.inner.register_tracked_account(address).await
    }

    async fn refresh_assets(&self, address: &Address) -> Result<Vec<AssetAmount>, ServiceError> {
        self.inner.refresh_assets(address).await
    }
}
