//! # Service Bootstrapper
//!
//! Starts every backend service without blocking: each `start_*` returns a
//! pending [`ServiceHandle`] immediately and spawns a task that waits for the
//! handles of its dependencies, then launches the service.
//!
//! ## Dependency Order
//!
//! ```text
//! preferences ──┬──────────────→ chain ──┐
//!               │                        ↓
//!               └──────────────────→ indexer ──→ register initial account
//! keyring (independent)
//! ```
//!
//! With a store attached, the initial account is marked loading right
//! before it is registered.
//!
//! ## Failure
//!
//! A failed launch is logged, recorded on the [`ServiceStatusBoard`] and
//! counted. Its handle never resolves, so dependents stay pending. There is
//! no retry.

mod status;

pub use status::{ServiceStatus, ServiceStatusBoard};

use std::future::Future;
use std::sync::Arc;

use shared_types::{Address, ServiceError, ServiceId};
use tracing::{error, info, warn};
use wallet_services::{
    ChainService, IndexerService, KeyringService, PreferenceService, ServiceLauncher,
};
use wallet_store::{Action, CanonicalStore};
use wallet_telemetry::{SERVICES_RUNNING, SERVICE_START_FAILURES};

use crate::handle::{HandleResolver, ServiceHandle};

/// Handles of all four services.
#[derive(Debug, Clone)]
pub struct ServiceHandles {
    pub preferences: ServiceHandle<dyn PreferenceService>,
    pub chain: ServiceHandle<dyn ChainService>,
    pub indexer: ServiceHandle<dyn IndexerService>,
    pub keyring: ServiceHandle<dyn KeyringService>,
}

/// Starts services through a [`ServiceLauncher`].
pub struct Bootstrapper {
    launcher: Arc<dyn ServiceLauncher>,
    board: Arc<ServiceStatusBoard>,
    initial_account: Option<Address>,
    store: Option<Arc<CanonicalStore>>,
}

impl Bootstrapper {
    #[must_use]
    pub fn new(launcher: Arc<dyn ServiceLauncher>, board: Arc<ServiceStatusBoard>) -> Self {
        Self {
            launcher,
            board,
            initial_account: None,
            store: None,
        }
    }

    /// Store that receives `load-account` for the initial account.
    #[must_use]
    pub fn with_store(mut self, store: Arc<CanonicalStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Account the indexer registers right after it launches.
    #[must_use]
    pub fn with_initial_account(mut self, account: Option<Address>) -> Self {
        self.initial_account = account;
        self
    }

    #[must_use]
    pub fn status_board(&self) -> Arc<ServiceStatusBoard> {
        self.board.clone()
    }

    /// Start every service in dependency order.
    #[must_use]
    pub fn start_all(&self) -> ServiceHandles {
        let preferences = self.start_preferences();
        let chain = self.start_chain(&preferences);
        let indexer = self.start_indexer(&preferences, &chain);
        let keyring = self.start_keyring();
        ServiceHandles {
            preferences,
            chain,
            indexer,
            keyring,
        }
    }

    /// Start the preference service. No dependencies.
    #[must_use]
    pub fn start_preferences(&self) -> ServiceHandle<dyn PreferenceService> {
        let launcher = self.launcher.clone();
        self.spawn_start(ServiceId::Preferences, async move {
            launcher.launch_preferences().await
        })
    }

    /// Start the chain service once preferences are ready.
    #[must_use]
    pub fn start_chain(
        &self,
        preferences: &ServiceHandle<dyn PreferenceService>,
    ) -> ServiceHandle<dyn ChainService> {
        let launcher = self.launcher.clone();
        let board = self.board.clone();
        let preferences = preferences.clone();
        self.spawn_start(ServiceId::Chain, async move {
            let prefs = preferences.ready().await;
            board.set(ServiceId::Chain, ServiceStatus::Starting);
            launcher.launch_chain(prefs).await
        })
    }

    /// Start the indexer once preferences and chain are ready, then register
    /// the initial account.
    #[must_use]
    pub fn start_indexer(
        &self,
        preferences: &ServiceHandle<dyn PreferenceService>,
        chain: &ServiceHandle<dyn ChainService>,
    ) -> ServiceHandle<dyn IndexerService> {
        let launcher = self.launcher.clone();
        let board = self.board.clone();
        let preferences = preferences.clone();
        let chain = chain.clone();
        let initial_account = self.initial_account.clone();
        let store = self.store.clone();
        self.spawn_start(ServiceId::Indexer, async move {
            let prefs = preferences.ready().await;
            let chain = chain.ready().await;
            board.set(ServiceId::Indexer, ServiceStatus::Starting);
            let indexer = launcher.launch_indexer(prefs, chain).await?;

            if let Some(account) = initial_account {
                if let Some(store) = &store {
                    store.dispatch(Action::LoadAccount {
                        address: account.clone(),
                    });
                }
                match indexer.register_tracked_account(account.clone()).await {
                    Ok(()) => info!(%account, "[bootstrap] Initial account registered"),
                    Err(e) => warn!(%account, error = %e, "[bootstrap] Initial account registration failed"),
                }
            }
            Ok(indexer)
        })
    }

    /// Start the keyring service. No dependencies.
    #[must_use]
    pub fn start_keyring(&self) -> ServiceHandle<dyn KeyringService> {
        let launcher = self.launcher.clone();
        self.spawn_start(ServiceId::Keyring, async move {
            launcher.launch_keyring().await
        })
    }

    /// Spawn a start task and return its pending handle.
    ///
    /// Services without dependencies go straight to `Starting`; the others
    /// stay `Pending` until their launch future marks them.
    fn spawn_start<T, F>(&self, service: ServiceId, launch: F) -> ServiceHandle<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Future<Output = Result<Arc<T>, ServiceError>> + Send + 'static,
    {
        let (resolver, handle) = ServiceHandle::pending(service);
        let board = self.board.clone();
        board.set(service, ServiceStatus::Pending);
        if service.dependencies().is_empty() {
            board.set(service, ServiceStatus::Starting);
        }

        tokio::spawn(async move {
            let result = launch.await;
            finish_start(&board, resolver, result);
        });
        handle
    }
}

fn finish_start<T: ?Sized>(
    board: &ServiceStatusBoard,
    resolver: HandleResolver<T>,
    result: Result<Arc<T>, ServiceError>,
) {
    let service = resolver.service();
    match result {
        Ok(instance) => {
            resolver.resolve(instance);
            board.set(service, ServiceStatus::Running);
            SERVICES_RUNNING.inc();
            info!("[bootstrap] {} running", service);
        }
        Err(e) => {
            error!(service = %service, error = %e, "[bootstrap] Service failed to start");
            SERVICE_START_FAILURES
                .with_label_values(&[service.name()])
                .inc();
            board.record_failure(service, e.message);
            // Dropping the resolver leaves the handle pending forever.
        }
    }
}
