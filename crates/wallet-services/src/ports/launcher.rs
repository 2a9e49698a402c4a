//! Launcher port.
//!
//! Each launch receives the already-started instances of its dependencies.
//! Waiting for those instances is the bootstrapper's job, not the
//! launcher's.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::ServiceError;

use super::inbound::{ChainService, IndexerService, KeyringService, PreferenceService};

/// Starts backend services.
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Start the preference service. No dependencies.
    async fn launch_preferences(&self) -> Result<Arc<dyn PreferenceService>, ServiceError>;

    /// Start the chain service.
    async fn launch_chain(
        &self,
        preferences: Arc<dyn PreferenceService>,
    ) -> Result<Arc<dyn ChainService>, ServiceError>;

    /// Start the indexer.
    async fn launch_indexer(
        &self,
        preferences: Arc<dyn PreferenceService>,
        chain: Arc<dyn ChainService>,
    ) -> Result<Arc<dyn IndexerService>, ServiceError>;

    /// Start the keyring service. No dependencies.
    async fn launch_keyring(&self) -> Result<Arc<dyn KeyringService>, ServiceError>;
}
