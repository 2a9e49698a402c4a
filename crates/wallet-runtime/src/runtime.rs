//! # Wallet Runtime
//!
//! Wires the store, gateway, bootstrapper and bridge together.
//!
//! ## Startup Sequence
//!
//! 1. Hydrate the initial state (persistence enabled only)
//! 2. Create the store and start the metrics observer
//! 3. Start persistence and the replica hub on the change stream
//! 4. Start every service through the launcher
//! 5. Attach the bridge to the service handles
//!
//! Steps 1 to 3 complete before any service starts, so the hydrated state
//! is in place before the first event-driven dispatch.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared_types::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wallet_services::ServiceLauncher;
use wallet_store::{CanonicalStore, StateTree};
use wallet_telemetry::{metric_inc, ACTIONS_DISPATCHED, STORE_VERSION};

use crate::bootstrap::{Bootstrapper, ServiceHandles, ServiceStatusBoard};
use crate::bridge::EventBridge;
use crate::config::RuntimeConfig;
use crate::gateway::{self, ReplicaEndpoint, ReplicaHub};
use crate::storage::StateStorage;

/// How long shutdown waits for background tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Options for [`WalletRuntime::start`].
#[derive(Clone, Default)]
pub struct RuntimeOptions {
    /// Hydrate from and write to `storage`.
    pub persist_state: bool,
    /// Snapshot storage. Ignored when persistence is off.
    pub storage: Option<Arc<dyn StateStorage>>,
    /// Account registered with the indexer once it starts.
    pub initial_account: Option<Address>,
}

impl RuntimeOptions {
    #[must_use]
    pub fn from_config(config: &RuntimeConfig, storage: Option<Arc<dyn StateStorage>>) -> Self {
        Self {
            persist_state: config.persist_state,
            storage,
            initial_account: config.initial_account.clone(),
        }
    }

    fn persistence(&self) -> Option<Arc<dyn StateStorage>> {
        if !self.persist_state {
            return None;
        }
        if self.storage.is_none() {
            warn!("[runtime] Persistence requested without storage, disabled");
        }
        self.storage.clone()
    }
}

/// The running orchestration core.
pub struct WalletRuntime {
    store: Arc<CanonicalStore>,
    handles: ServiceHandles,
    board: Arc<ServiceStatusBoard>,
    bridge: Arc<EventBridge>,
    hub: ReplicaHub,
    persistence_enabled: bool,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WalletRuntime {
    /// Start the runtime. Returns once every service start is scheduled;
    /// services come up in the background.
    pub async fn start(options: RuntimeOptions, launcher: Arc<dyn ServiceLauncher>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let storage = options.persistence();

        // Step 1: Hydrate
        let initial = match &storage {
            Some(storage) => gateway::hydrate(storage.as_ref()).await,
            None => {
                info!("[runtime] Persistence disabled, starting empty");
                StateTree::default()
            }
        };

        // Step 2: Store
        let store = Arc::new(CanonicalStore::with_state(initial));
        let mut tasks = vec![spawn_store_metrics(&store, shutdown_rx.clone())];

        // Step 3: Gateway
        if let Some(storage) = storage.clone() {
            tasks.push(gateway::spawn_persistence(&store, storage, shutdown_rx.clone()));
        }
        let hub = ReplicaHub::new(store.clone(), shutdown_rx.clone());

        // Step 4: Services
        let board = Arc::new(ServiceStatusBoard::new());
        let handles = Bootstrapper::new(launcher, board.clone())
            .with_initial_account(options.initial_account.clone())
            .with_store(store.clone())
            .start_all();

        // Step 5: Bridge
        let bridge = Arc::new(EventBridge::new(store.clone(), shutdown_rx));
        bridge.attach(&handles);

        info!(
            persistence = storage.is_some(),
            "[runtime] Wallet runtime started"
        );

        Self {
            store,
            handles,
            board,
            bridge,
            hub,
            persistence_enabled: storage.is_some(),
            shutdown_tx,
            tasks: Mutex::new(tasks),
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<CanonicalStore> {
        self.store.clone()
    }

    #[must_use]
    pub fn handles(&self) -> &ServiceHandles {
        &self.handles
    }

    #[must_use]
    pub fn status_board(&self) -> Arc<ServiceStatusBoard> {
        self.board.clone()
    }

    #[must_use]
    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled
    }

    /// Attach a new replica to the store.
    pub fn attach_replica(&self) -> ReplicaEndpoint {
        self.hub.attach()
    }

    /// Signal shutdown and wait briefly for background tasks.
    ///
    /// Persistence flushes the latest state before it stops.
    pub async fn shutdown(&self) {
        info!("[runtime] Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        tasks.extend(self.bridge.take_tasks());

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        let mut unfinished = 0;
        for task in tasks {
            if tokio::time::timeout_at(deadline, task).await.is_err() {
                unfinished += 1;
            }
        }
        if unfinished > 0 {
            warn!(unfinished, "[runtime] Tasks still running at shutdown");
        }
        info!("[runtime] Shutdown complete");
    }
}

/// Count applied actions and track the store version.
fn spawn_store_metrics(
    store: &CanonicalStore,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_change = changes.recv() => {
                    let Some(change) = maybe_change else { break };
                    metric_inc!(ACTIONS_DISPATCHED, &[change.action.kind()]);
                    STORE_VERSION.set(i64::try_from(change.version).unwrap_or(i64::MAX));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("[runtime] Store metrics stopped");
    })
}
