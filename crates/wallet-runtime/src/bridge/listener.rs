//! Generic listener loop: one per connected service.

use std::sync::Arc;

use shared_bus::Subscription;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wallet_store::CanonicalStore;
use wallet_telemetry::{EVENTS_BRIDGED, EVENTS_UNROUTED};

use super::routes::route;

/// Spawn the loop translating `subscription`'s events into dispatches.
///
/// The loop ends when the emitter is dropped or shutdown is signalled.
pub(crate) fn spawn_listener(
    mut subscription: Subscription,
    store: Arc<CanonicalStore>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let owner = subscription.source();
        info!("[bridge] Listening to {}", owner);

        loop {
            tokio::select! {
                maybe_event = subscription.recv() => {
                    let Some(event) = maybe_event else {
                        info!("[bridge] {} emitter closed", owner);
                        break;
                    };
                    match route(owner, &event) {
                        Some(action) => {
                            let version = store.dispatch(action);
                            EVENTS_BRIDGED
                                .with_label_values(&[owner.name(), event.name()])
                                .inc();
                            debug!(service = %owner, event = event.name(), version, "[bridge] Event dispatched");
                        }
                        None => {
                            EVENTS_UNROUTED
                                .with_label_values(&[owner.name(), event.name()])
                                .inc();
                            debug!(service = %owner, event = event.name(), "[bridge] No route, event ignored");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if subscription.lagged() > 0 {
            info!(
                service = %owner,
                skipped = subscription.lagged(),
                "[bridge] Listener stopped after skipping events"
            );
        }
    })
}
