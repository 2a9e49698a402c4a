//! Reverse path: intent actions on the store become service calls.
//!
//! ```text
//! track-account-requested    → chain.add_account_to_track
//! generate-keyring-requested → keyring.generate_new_keyring
//! import-keyring-requested   → keyring.import_legacy_keyring
//! ```
//!
//! Each call runs in its own task. A failure is logged and counted. The
//! only dispatch on this path is the `load-account` that marks a newly
//! tracked account before the chain is asked to track it; everything else
//! reaches the store as service events.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wallet_store::{Action, CanonicalStore};
use wallet_telemetry::INTENT_FAILURES;

use crate::bootstrap::ServiceHandles;
use crate::errors::RuntimeError;

/// Spawn the loop watching the store for intents.
pub(crate) fn spawn_intent_listener(
    store: &Arc<CanonicalStore>,
    handles: ServiceHandles,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut changes = store.subscribe();
    let store = store.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_change = changes.recv() => {
                    let Some(change) = maybe_change else { break };
                    if change.action.is_intent() {
                        let handles = handles.clone();
                        let store = store.clone();
                        tokio::spawn(async move {
                            if let Err(e) = execute_intent(&change.action, &handles, &store).await {
                                report_failure(&e);
                            }
                        });
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("[bridge] Intent listener stopped");
    })
}

/// Run the service call behind one intent.
///
/// The target service must already be running. A track request marks the
/// account as loading in `store` before the chain is called, so it shows up
/// as tracked even when its first balance is slow to arrive.
pub async fn execute_intent(
    action: &Action,
    handles: &ServiceHandles,
    store: &CanonicalStore,
) -> Result<(), RuntimeError> {
    let intent = action.kind();
    let failed = |reason: String| RuntimeError::UnhandledIntentFailure { intent, reason };

    match action {
        Action::TrackAccountRequested { address } => {
            let chain = handles
                .chain
                .try_get()
                .ok_or_else(|| failed("chain service is not running".to_string()))?;
            store.dispatch(Action::LoadAccount {
                address: address.clone(),
            });
            chain
                .add_account_to_track(address.clone())
                .await
                .map_err(|e| failed(e.to_string()))?;
            info!(%address, "[bridge] Account tracking requested");
        }
        Action::GenerateKeyringRequested => {
            let keyring = handles
                .keyring
                .try_get()
                .ok_or_else(|| failed("keyring service is not running".to_string()))?;
            let summary = keyring
                .generate_new_keyring()
                .await
                .map_err(|e| failed(e.to_string()))?;
            info!(id = %summary.id, "[bridge] Keyring generated");
        }
        Action::ImportKeyringRequested { mnemonic } => {
            let keyring = handles
                .keyring
                .try_get()
                .ok_or_else(|| failed("keyring service is not running".to_string()))?;
            let summary = keyring
                .import_legacy_keyring(mnemonic.expose())
                .await
                .map_err(|e| failed(e.to_string()))?;
            info!(id = %summary.id, "[bridge] Keyring imported");
        }
        _ => {}
    }
    Ok(())
}

fn report_failure(error: &RuntimeError) {
    if let RuntimeError::UnhandledIntentFailure { intent, .. } = error {
        INTENT_FAILURES.with_label_values(&[intent]).inc();
    }
    warn!(error = %error, "[bridge] Intent failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use wallet_services::ReferenceLauncher;
    use wallet_store::SecretPhrase;

    use crate::bootstrap::{Bootstrapper, ServiceStatusBoard};

    async fn running_handles() -> ServiceHandles {
        let handles = Bootstrapper::new(
            Arc::new(ReferenceLauncher::new()),
            Arc::new(ServiceStatusBoard::new()),
        )
        .start_all();
        timeout(Duration::from_secs(2), async {
            handles.chain.ready().await;
            handles.keyring.ready().await;
        })
        .await
        .unwrap();
        handles
    }

    #[tokio::test]
    async fn test_track_account_intent() {
        let handles = running_handles().await;
        let store = CanonicalStore::new();
        let address = shared_types::Address::from_bytes(&[5; 20]);
        execute_intent(
            &Action::TrackAccountRequested {
                address: address.clone(),
            },
            &handles,
            &store,
        )
        .await
        .unwrap();
        let chain = handles.chain.try_get().unwrap();
        assert!(chain.get_accounts_to_track().await.unwrap().contains(&address));
    }

    #[tokio::test]
    async fn test_tracked_account_is_loading_before_balance() {
        let handles = running_handles().await;
        // No listener on the chain: its balance event never reaches the store.
        let store = CanonicalStore::new();
        let address = shared_types::Address::from_bytes(&[6; 20]);
        execute_intent(
            &Action::TrackAccountRequested {
                address: address.clone(),
            },
            &handles,
            &store,
        )
        .await
        .unwrap();

        let state = store.get_state();
        assert!(state.is_tracked(&address));
        assert!(state.balance(&address).is_none());
        assert_eq!(
            state.account.balances.get(&address),
            Some(&wallet_store::BalanceEntry::Loading)
        );
    }

    #[tokio::test]
    async fn test_track_without_chain_leaves_state_unchanged() {
        let handles = Bootstrapper::new(
            Arc::new(ReferenceLauncher::new().with_failure(shared_types::ServiceId::Chain)),
            Arc::new(ServiceStatusBoard::new()),
        )
        .start_all();
        let store = CanonicalStore::new();
        let err = execute_intent(
            &Action::TrackAccountRequested {
                address: shared_types::Address::from_bytes(&[7; 20]),
            },
            &handles,
            &store,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not running"));
        assert_eq!(store.version(), 0);
    }

    #[tokio::test]
    async fn test_bad_mnemonic_is_intent_failure() {
        let handles = running_handles().await;
        let err = execute_intent(
            &Action::ImportKeyringRequested {
                mnemonic: SecretPhrase::new("not a mnemonic"),
            },
            &handles,
            &CanonicalStore::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UnhandledIntentFailure { intent: "import-keyring-requested", .. }
        ));
    }

    #[tokio::test]
    async fn test_intent_on_missing_service_fails() {
        let handles = Bootstrapper::new(
            Arc::new(ReferenceLauncher::new().with_failure(shared_types::ServiceId::Keyring)),
            Arc::new(ServiceStatusBoard::new()),
        )
        .start_all();
        let store = CanonicalStore::new();
        let err = execute_intent(&Action::GenerateKeyringRequested, &handles, &store)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not running"));
    }

    #[tokio::test]
    async fn test_listener_leaves_state_unchanged() {
        let handles = running_handles().await;
        let store = Arc::new(CanonicalStore::new());
        let (_tx, rx) = watch::channel(false);
        let task = spawn_intent_listener(&store, handles.clone(), rx);

        let before = store.get_state();
        store.dispatch(Action::GenerateKeyringRequested);
        let keyring = handles.keyring.try_get().unwrap();
        timeout(Duration::from_secs(1), async {
            while keyring.keyrings().await.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert!(Arc::ptr_eq(&before, &store.get_state()));
        task.abort();
    }
}
