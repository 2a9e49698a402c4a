//! Connect-time hydration of already tracked accounts.
//!
//! Each function runs after the service's listener is subscribed, so every
//! event it triggers reaches the store.

use shared_types::ServiceErrorKind;
use tracing::{debug, info, warn};
use wallet_services::{ChainService, IndexerService};
use wallet_store::{Action, CanonicalStore};

/// Mark every tracked account as loading, then refresh each balance.
///
/// Balances arrive as `accountBalance` events through the chain listener.
/// Returns the number of accounts hydrated.
pub(crate) async fn hydrate_chain(chain: &dyn ChainService, store: &CanonicalStore) -> usize {
    let accounts = match chain.get_accounts_to_track().await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "[bridge] Could not list tracked accounts");
            return 0;
        }
    };

    for address in &accounts {
        store.dispatch(Action::LoadAccount {
            address: address.clone(),
        });
    }

    for address in &accounts {
        if let Err(e) = chain.get_latest_balance(address).await {
            warn!(%address, error = %e, "[bridge] Balance refresh failed");
        }
    }

    info!("[bridge] Chain hydrated {} tracked account(s)", accounts.len());
    accounts.len()
}

/// Refresh the assets of every account the chain tracks.
///
/// Accounts the indexer has not registered are skipped.
pub(crate) async fn hydrate_indexer(indexer: &dyn IndexerService, chain: &dyn ChainService) -> usize {
    let accounts = match chain.get_accounts_to_track().await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "[bridge] Could not list tracked accounts");
            return 0;
        }
    };

    let mut refreshed = 0;
    for address in &accounts {
        match indexer.refresh_assets(address).await {
            Ok(_) => refreshed += 1,
            Err(e) if e.kind == ServiceErrorKind::NotFound => {
                debug!(%address, "[bridge] Account not registered with indexer");
            }
            Err(e) => warn!(%address, error = %e, "[bridge] Asset refresh failed"),
        }
    }
    refreshed
}
