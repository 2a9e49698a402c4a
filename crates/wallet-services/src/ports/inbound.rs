//! Inbound Ports (Driving Ports)
//!
//! Request operations the orchestration core may invoke on a started
//! service. Every service also exposes its own [`ServiceEmitter`] so the
//! core can listen to its domain events; the core never emits on it.

use async_trait::async_trait;
use shared_bus::ServiceEmitter;
use shared_types::{AccountBalance, Address, AssetAmount, KeyringSummary, ServiceError};

/// Key/value user preferences.
#[async_trait]
pub trait PreferenceService: Send + Sync {
    /// Domain event emitter owned by this service.
    fn events(&self) -> &ServiceEmitter;

    /// Read a preference. `None` when unset and without a default.
    async fn get_preference(&self, key: &str) -> Result<Option<String>, ServiceError>;

    /// Write a preference.
    async fn set_preference(&self, key: &str, value: String) -> Result<(), ServiceError>;
}

/// Blockchain connectivity: tracked accounts and their balances.
#[async_trait]
pub trait ChainService: Send + Sync {
    fn events(&self) -> &ServiceEmitter;

    /// Start tracking an account.
    ///
    /// A newly tracked account has its current balance emitted as an
    /// `accountBalance` event. Tracking an already tracked account is a no-op.
    async fn add_account_to_track(&self, address: Address) -> Result<(), ServiceError>;

    /// All currently tracked accounts.
    async fn get_accounts_to_track(&self) -> Result<Vec<Address>, ServiceError>;

    /// Fetch the latest balance.
    ///
    /// The result is also emitted as an `accountBalance` event.
    async fn get_latest_balance(&self, address: &Address) -> Result<AccountBalance, ServiceError>;
}

/// Balance and asset indexing.
#[async_trait]
pub trait IndexerService: Send + Sync {
    fn events(&self) -> &ServiceEmitter;

    /// Register an account for indexing and load its assets.
    async fn register_tracked_account(&self, address: Address) -> Result<(), ServiceError>;

    /// Reload the asset list of a registered account.
    ///
    /// The result is also emitted as an `assets` event.
    async fn refresh_assets(&self, address: &Address) -> Result<Vec<AssetAmount>, ServiceError>;
}

/// Key management. Only public summaries cross this boundary.
#[async_trait]
pub trait KeyringService: Send + Sync {
    fn events(&self) -> &ServiceEmitter;

    /// Generate a new keyring and emit the updated `keyrings` list.
    async fn generate_new_keyring(&self) -> Result<KeyringSummary, ServiceError>;

    /// Import a keyring from a legacy mnemonic and emit the updated list.
    async fn import_legacy_keyring(&self, mnemonic: &str) -> Result<KeyringSummary, ServiceError>;

    /// Current keyring summaries.
    async fn keyrings(&self) -> Vec<KeyringSummary>;
}
