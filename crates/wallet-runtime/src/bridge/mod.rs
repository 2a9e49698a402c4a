//! # Event Bridge
//!
//! Connects started services to the canonical store.
//!
//! ```text
//! ChainService ───events──┐
//! IndexerService ─events──┼──→ listener ──route()──→ CanonicalStore::dispatch
//! KeyringService ─events──┘                                   │
//!       ↑                                                     │ StoreChange
//!       └──────────── intent listener ←───────────────────────┘
//! ```
//!
//! For each service the bridge subscribes first, then hydrates, so nothing
//! a hydration call emits is missed. Listeners are isolated tasks: one
//! stopping never affects the others or the store.

mod hydration;
mod intents;
mod listener;
pub mod routes;

pub use intents::execute_intent;
pub use routes::{route, routed_kinds, ROUTES};

use std::sync::Arc;

use parking_lot::Mutex;
use shared_bus::{EventFilter, ServiceEmitter, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;
use wallet_services::{ChainService, IndexerService, KeyringService};
use wallet_store::CanonicalStore;

use crate::bootstrap::ServiceHandles;

/// Routes domain events into the store and intents back to services.
pub struct EventBridge {
    store: Arc<CanonicalStore>,
    shutdown: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EventBridge {
    #[must_use]
    pub fn new(store: Arc<CanonicalStore>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            store,
            shutdown,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Connect every service as its handle resolves, and start the intent
    /// listener.
    ///
    /// Returns immediately. A service that never starts is never connected.
    pub fn attach(self: &Arc<Self>, handles: &ServiceHandles) {
        let intents = intents::spawn_intent_listener(
            &self.store,
            handles.clone(),
            self.shutdown.clone(),
        );
        self.track(intents);

        let bridge = self.clone();
        let chain = handles.chain.clone();
        self.spawn_connect(async move {
            bridge.connect_chain(chain.ready().await).await;
        });

        let bridge = self.clone();
        let chain = handles.chain.clone();
        let indexer = handles.indexer.clone();
        self.spawn_connect(async move {
            let indexer = indexer.ready().await;
            // The indexer only runs once the chain has resolved.
            let chain = chain.ready().await;
            bridge.connect_indexer(indexer, chain).await;
        });

        let bridge = self.clone();
        let keyring = handles.keyring.clone();
        self.spawn_connect(async move {
            bridge.connect_keyring(keyring.ready().await);
        });
    }

    /// Listen to the chain, then mark and refresh every tracked account.
    pub async fn connect_chain(&self, chain: Arc<dyn ChainService>) {
        let subscription = Self::subscribe(chain.events());
        self.track(listener::spawn_listener(
            subscription,
            self.store.clone(),
            self.shutdown.clone(),
        ));
        hydration::hydrate_chain(chain.as_ref(), &self.store).await;
    }

    /// Listen to the indexer, then refresh assets of tracked accounts.
    pub async fn connect_indexer(
        &self,
        indexer: Arc<dyn IndexerService>,
        chain: Arc<dyn ChainService>,
    ) {
        let subscription = Self::subscribe(indexer.events());
        self.track(listener::spawn_listener(
            subscription,
            self.store.clone(),
            self.shutdown.clone(),
        ));
        let refreshed = hydration::hydrate_indexer(indexer.as_ref(), chain.as_ref()).await;
        info!("[bridge] Indexer hydrated {} account(s)", refreshed);
    }

    /// Listen to the keyring service.
    pub fn connect_keyring(&self, keyring: Arc<dyn KeyringService>) {
        let subscription = Self::subscribe(keyring.events());
        self.track(listener::spawn_listener(
            subscription,
            self.store.clone(),
            self.shutdown.clone(),
        ));
    }

    /// Take every task spawned so far, for joining on shutdown.
    pub fn take_tasks(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.tasks.lock())
    }

    fn subscribe(emitter: &ServiceEmitter) -> Subscription {
        emitter.subscribe(EventFilter::kinds(routed_kinds(emitter.owner())))
    }

    fn spawn_connect<F>(&self, connect: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.clone();
        self.track(tokio::spawn(async move {
            tokio::select! {
                () = connect => {}
                _ = shutdown.wait_for(|stop| *stop) => {}
            }
        }));
    }

    fn track(&self, task: JoinHandle<()>) {
        self.tasks.lock().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, Amount, ServiceId};
    use std::time::Duration;
    use tokio::time::timeout;
    use wallet_services::ReferenceLauncher;
    use wallet_store::Action;

    use crate::bootstrap::{Bootstrapper, ServiceStatusBoard};

    fn addr(b: u8) -> Address {
        Address::from_bytes(&[b; 20])
    }

    #[tokio::test]
    async fn test_initial_account_reaches_store() {
        let launcher = Arc::new(ReferenceLauncher::new().with_chain_balance(addr(1), Amount::from(42u64)));
        let handles = Bootstrapper::new(launcher, Arc::new(ServiceStatusBoard::new()))
            .with_initial_account(Some(addr(1)))
            .start_all();

        let store = Arc::new(CanonicalStore::new());
        let (_tx, rx) = watch::channel(false);
        let bridge = Arc::new(EventBridge::new(store.clone(), rx));
        bridge.attach(&handles);

        timeout(Duration::from_secs(2), async {
            loop {
                if let Some(balance) = store.get_state().balance(&addr(1)) {
                    assert_eq!(balance.amount, Amount::from(42u64));
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_keyring_intent_round_trip() {
        let launcher = Arc::new(ReferenceLauncher::new());
        let handles = Bootstrapper::new(launcher, Arc::new(ServiceStatusBoard::new())).start_all();
        let store = Arc::new(CanonicalStore::new());
        let (_tx, rx) = watch::channel(false);
        let bridge = Arc::new(EventBridge::new(store.clone(), rx));
        bridge.attach(&handles);
        timeout(Duration::from_secs(1), handles.keyring.ready()).await.unwrap();
        // Give the keyring listener a moment to subscribe.
        tokio::time::sleep(Duration::from_millis(20)).await;

        store.dispatch(Action::GenerateKeyringRequested);

        timeout(Duration::from_secs(2), async {
            while store.get_state().keyrings.keyrings.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(store.get_state().keyrings.keyrings.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_pending_connect() {
        let launcher = Arc::new(ReferenceLauncher::new().with_failure(ServiceId::Chain));
        let handles = Bootstrapper::new(launcher, Arc::new(ServiceStatusBoard::new())).start_all();
        let store = Arc::new(CanonicalStore::new());
        let (tx, rx) = watch::channel(false);
        let bridge = Arc::new(EventBridge::new(store.clone(), rx));
        bridge.attach(&handles);

        tx.send(true).unwrap();
        for task in bridge.take_tasks() {
            timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        }
        assert_eq!(store.version(), 0);
    }
}
