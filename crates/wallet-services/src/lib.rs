//! # Wallet Services
//!
//! The boundary between the orchestration core and the four backend
//! services, plus small in-memory reference implementations.
//!
//! ## Ports
//!
//! | Port | Operations | Events |
//! |------|------------|--------|
//! | [`PreferenceService`] | `get_preference`, `set_preference` | none |
//! | [`ChainService`] | `add_account_to_track`, `get_accounts_to_track`, `get_latest_balance` | `accountBalance`, `transaction` |
//! | [`IndexerService`] | `register_tracked_account`, `refresh_assets` | `accountBalance`, `assets` |
//! | [`KeyringService`] | `generate_new_keyring`, `import_legacy_keyring`, `keyrings` | `keyrings` |
//!
//! Startup goes through the [`ServiceLauncher`] port. Dependencies arrive as
//! already-started instances, never as handles.
//!
//! ## Reference Adapters
//!
//! The adapters keep all state in memory. They exist so the runtime binary
//! and the integration tests can run end-to-end; they are not real chain or
//! keyring clients.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod ports;

pub use adapters::{
    MemoryKeyring, MemoryPreferences, ReferenceLauncher, SimulatedChain, SimulatedIndexer,
};
pub use ports::{ChainService, IndexerService, KeyringService, PreferenceService, ServiceLauncher};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
