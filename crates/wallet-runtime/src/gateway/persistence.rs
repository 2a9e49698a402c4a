//! Snapshot hydration and write-behind persistence.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use wallet_store::{CanonicalStore, StateTree, StoreChange};
use wallet_telemetry::{PERSISTENCE_FAILURES, SNAPSHOTS_PERSISTED};

use crate::errors::RuntimeError;
use crate::storage::{StateStorage, STATE_KEY};

/// Load the persisted state.
///
/// A missing snapshot, a storage failure or an undecodable snapshot all
/// yield the empty state.
pub async fn hydrate(storage: &dyn StateStorage) -> StateTree {
    match load_snapshot(storage).await {
        Ok(Some(state)) => {
            info!(
                accounts = state.account.balances.len(),
                keyrings = state.keyrings.keyrings.len(),
                "[gateway] State hydrated from storage"
            );
            state
        }
        Ok(None) => {
            info!("[gateway] No persisted state, starting empty");
            StateTree::default()
        }
        Err(e) => {
            PERSISTENCE_FAILURES.with_label_values(&["hydrate"]).inc();
            warn!(error = %e, "[gateway] Hydration failed, starting empty");
            StateTree::default()
        }
    }
}

async fn load_snapshot(storage: &dyn StateStorage) -> Result<Option<StateTree>, RuntimeError> {
    let Some(text) = storage.get(STATE_KEY).await? else {
        return Ok(None);
    };
    Ok(Some(wallet_codec::decode(&text)?))
}

/// Encode and store one state.
pub async fn persist(storage: &dyn StateStorage, state: &StateTree) -> Result<(), RuntimeError> {
    let text = wallet_codec::encode(state).map_err(|e| {
        PERSISTENCE_FAILURES.with_label_values(&["encode"]).inc();
        e
    })?;
    storage.set(STATE_KEY, &text).await.map_err(|e| {
        PERSISTENCE_FAILURES.with_label_values(&["write"]).inc();
        e
    })?;
    SNAPSHOTS_PERSISTED.inc();
    Ok(())
}

/// Write the state to storage after every applied change.
///
/// Writes run on their own task and never block dispatch. Changes that
/// queue up during a write are coalesced into one write of the latest
/// state. Changes that leave the state untouched are not written.
pub fn spawn_persistence(
    store: &CanonicalStore,
    storage: Arc<dyn StateStorage>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let (_, initial, mut changes) = store.subscribe_from_snapshot();
    tokio::spawn(async move {
        let mut written = initial;
        info!("[gateway] Persistence started");

        loop {
            tokio::select! {
                maybe_change = changes.recv() => {
                    let Some(change) = maybe_change else { break };
                    let latest = drain_latest(change, &mut changes);
                    write_if_changed(storage.as_ref(), &mut written, latest).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Flush whatever was applied before shutdown.
        if let Ok(change) = changes.try_recv() {
            let latest = drain_latest(change, &mut changes);
            write_if_changed(storage.as_ref(), &mut written, latest).await;
        }
        info!("[gateway] Persistence stopped");
    })
}

fn drain_latest(
    mut latest: StoreChange,
    changes: &mut mpsc::UnboundedReceiver<StoreChange>,
) -> StoreChange {
    while let Ok(next) = changes.try_recv() {
        latest = next;
    }
    latest
}

async fn write_if_changed(
    storage: &dyn StateStorage,
    written: &mut Arc<StateTree>,
    change: StoreChange,
) {
    if Arc::ptr_eq(written, &change.state) {
        debug!(version = change.version, "[gateway] State unchanged, nothing to persist");
        return;
    }
    match persist(storage, &change.state).await {
        Ok(()) => {
            *written = change.state;
            debug!(version = change.version, "[gateway] Snapshot persisted");
        }
        Err(e) => error!(version = change.version, error = %e, "[gateway] Snapshot write failed"),
    }
}
