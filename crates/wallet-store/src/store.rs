//! # Canonical Store
//!
//! Owns the current [`StateTree`] behind a single lock. Every dispatch is
//! reduced, versioned and published to change subscribers while the lock is
//! held, so subscribers observe changes in exactly the order they were
//! applied.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::action::{Action, ActionClass};
use crate::reducer::reduce;
use crate::state::StateTree;

/// One applied dispatch.
#[derive(Debug, Clone)]
pub struct StoreChange {
    /// Version produced by this dispatch.
    pub version: u64,
    /// The action that was applied.
    pub action: Arc<Action>,
    /// State after the action.
    pub state: Arc<StateTree>,
}

struct Inner {
    state: Arc<StateTree>,
    version: u64,
    subscribers: Vec<mpsc::UnboundedSender<StoreChange>>,
}

/// The single writer of wallet state.
pub struct CanonicalStore {
    inner: Mutex<Inner>,
}

impl CanonicalStore {
    /// Create a store holding the empty state at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(StateTree::default())
    }

    /// Create a store with a hydrated initial state at version 0.
    #[must_use]
    pub fn with_state(initial: StateTree) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: Arc::new(initial),
                version: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Apply an action and return the resulting version.
    ///
    /// Reductions are serialized: dispatch order is application order.
    pub fn dispatch(&self, action: Action) -> u64 {
        let mut inner = self.inner.lock();

        // Intents and unknown kinds are the identity; keep the same snapshot.
        if action.class() == ActionClass::State {
            inner.state = Arc::new(reduce(&inner.state, &action));
        }
        inner.version += 1;

        let change = StoreChange {
            version: inner.version,
            action: Arc::new(action),
            state: inner.state.clone(),
        };
        trace!(
            version = change.version,
            kind = change.action.kind(),
            "[store] Action applied"
        );

        inner
            .subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
        change.version
    }

    /// Current state snapshot.
    #[must_use]
    pub fn get_state(&self) -> Arc<StateTree> {
        self.inner.lock().state.clone()
    }

    /// Number of dispatches applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Current version and state, read together.
    #[must_use]
    pub fn snapshot(&self) -> (u64, Arc<StateTree>) {
        let inner = self.inner.lock();
        (inner.version, inner.state.clone())
    }

    /// Ordered, lossless stream of every change applied after this call.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Snapshot plus a change stream starting right after it.
    ///
    /// The snapshot and the subscription are taken under the same lock, so
    /// the first change received has version `snapshot_version + 1`.
    #[must_use]
    pub fn subscribe_from_snapshot(
        &self,
    ) -> (u64, Arc<StateTree>, mpsc::UnboundedReceiver<StoreChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        inner.subscribers.push(tx);
        (inner.version, inner.state.clone(), rx)
    }

    /// Number of live change subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }
}

impl Default for CanonicalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CanonicalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalStore")
            .field("version", &self.version())
            .finish()
    }
}
