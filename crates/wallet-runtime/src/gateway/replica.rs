//! # Replica Channels
//!
//! Each attached replica gets a bidirectional text channel.
//!
//! ```text
//!            ┌──── snapshot, then state actions (encoded) ────→┐
//! ReplicaHub │                                                  │ ReplicaEndpoint
//!            └←─────────── actions (encoded) ───────────────────┘
//! ```
//!
//! Outbound, the replica first receives a `snapshot` read atomically with
//! its version, then every later state-bearing action in dispatch order.
//! Intent actions are never sent out. Inbound, every `action` message is
//! dispatched through the same store; anything else is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wallet_codec::CodecError;
use wallet_store::{reduce, Action, ActionClass, CanonicalStore, StateTree, StoreChange};
use wallet_telemetry::{REPLICAS_ATTACHED, REPLICA_MESSAGES_DROPPED, REPLICA_MESSAGES_SENT};

use crate::errors::RuntimeError;

/// Message exchanged with a replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReplicaMessage {
    /// Full state at `version`.
    Snapshot { version: u64, state: StateTree },
    /// One applied action. `version` is omitted by replicas sending actions.
    Action {
        #[serde(default)]
        version: u64,
        action: Action,
    },
}

impl ReplicaMessage {
    /// Message type as used on the wire.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Action { .. } => "action",
        }
    }
}

// =============================================================================
// HUB
// =============================================================================

/// Serves replicas from the canonical store.
pub struct ReplicaHub {
    store: Arc<CanonicalStore>,
    shutdown: watch::Receiver<bool>,
    next_id: AtomicU64,
}

impl ReplicaHub {
    #[must_use]
    pub fn new(store: Arc<CanonicalStore>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            store,
            shutdown,
            next_id: AtomicU64::new(1),
        }
    }

    /// Attach a replica. The snapshot is queued before this returns.
    pub fn attach(&self) -> ReplicaEndpoint {
        let (endpoint, task) = self.attach_with_task();
        drop(task);
        endpoint
    }

    /// Attach a replica and return the task serving it.
    pub fn attach_with_task(&self) -> (ReplicaEndpoint, JoinHandle<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let (version, state, changes) = self.store.subscribe_from_snapshot();
        let snapshot = ReplicaMessage::Snapshot {
            version,
            state: (*state).clone(),
        };
        if send_message(&out_tx, &snapshot).is_ok() {
            info!(replica = id, version, "[gateway] Replica attached");
        }
        REPLICAS_ATTACHED.inc();

        let session = ReplicaSession {
            id,
            snapshot_version: version,
            store: self.store.clone(),
            outbound: out_tx,
        };
        let task = tokio::spawn(session.run(changes, in_rx, self.shutdown.clone()));

        let endpoint = ReplicaEndpoint {
            id,
            inbound: in_tx,
            outbound: out_rx,
        };
        (endpoint, task)
    }
}

struct ReplicaSession {
    id: u64,
    snapshot_version: u64,
    store: Arc<CanonicalStore>,
    outbound: mpsc::UnboundedSender<String>,
}

impl ReplicaSession {
    async fn run(
        self,
        mut changes: mpsc::UnboundedReceiver<StoreChange>,
        mut inbound: mpsc::UnboundedReceiver<String>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                maybe_change = changes.recv() => {
                    let Some(change) = maybe_change else { break };
                    if !self.forward(&change) {
                        break;
                    }
                }
                maybe_text = inbound.recv() => {
                    // The endpoint owns the sender; `None` means it was dropped.
                    let Some(text) = maybe_text else { break };
                    self.receive(&text);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        REPLICAS_ATTACHED.dec();
        info!(replica = self.id, "[gateway] Replica detached");
    }

    /// Forward one change. Returns false once the replica is gone.
    fn forward(&self, change: &StoreChange) -> bool {
        if change.version <= self.snapshot_version
            || change.action.class() != ActionClass::State
        {
            return true;
        }
        let message = ReplicaMessage::Action {
            version: change.version,
            action: (*change.action).clone(),
        };
        match send_message(&self.outbound, &message) {
            Ok(()) => true,
            Err(RuntimeError::ReplicaClosed) => false,
            Err(e) => {
                REPLICA_MESSAGES_DROPPED.with_label_values(&["encode"]).inc();
                warn!(replica = self.id, error = %e, "[gateway] Could not encode change");
                true
            }
        }
    }

    /// Decode and dispatch one inbound message.
    fn receive(&self, text: &str) {
        match wallet_codec::decode::<ReplicaMessage>(text) {
            Ok(ReplicaMessage::Action { action, .. }) => {
                let kind = action.kind();
                let version = self.store.dispatch(action);
                debug!(replica = self.id, kind, version, "[gateway] Replica action dispatched");
            }
            Ok(other) => {
                REPLICA_MESSAGES_DROPPED
                    .with_label_values(&["unexpected"])
                    .inc();
                warn!(
                    replica = self.id,
                    kind = other.type_name(),
                    "[gateway] Dropped non-action message from replica"
                );
            }
            Err(e) => {
                REPLICA_MESSAGES_DROPPED
                    .with_label_values(&["malformed"])
                    .inc();
                warn!(replica = self.id, error = %e, "[gateway] Dropped undecodable message from replica");
            }
        }
    }
}

fn send_message(
    outbound: &mpsc::UnboundedSender<String>,
    message: &ReplicaMessage,
) -> Result<(), RuntimeError> {
    let text = wallet_codec::encode(message)?;
    outbound
        .send(text)
        .map_err(|_| RuntimeError::ReplicaClosed)?;
    REPLICA_MESSAGES_SENT
        .with_label_values(&[message.type_name()])
        .inc();
    Ok(())
}

// =============================================================================
// ENDPOINT
// =============================================================================

/// Replica side of a channel.
#[derive(Debug)]
pub struct ReplicaEndpoint {
    id: u64,
    inbound: mpsc::UnboundedSender<String>,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl ReplicaEndpoint {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next encoded message from the hub. `None` once the hub stops.
    pub async fn recv(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Next encoded message, if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.outbound.try_recv().ok()
    }

    /// Send raw text to the hub.
    pub fn send(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.inbound
            .send(text.into())
            .map_err(|_| RuntimeError::ReplicaClosed)
    }

    /// Encode and send an action to the hub.
    pub fn send_action(&self, action: Action) -> Result<(), RuntimeError> {
        let text = wallet_codec::encode(&ReplicaMessage::Action { version: 0, action })?;
        self.send(text)
    }
}

// =============================================================================
// MIRROR
// =============================================================================

/// Consumer-side copy of the canonical state, kept in sync with the same
/// reducer.
#[derive(Debug, Clone, Default)]
pub struct ReplicaMirror {
    version: u64,
    state: StateTree,
}

impl ReplicaMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and apply one message. Returns whether the state advanced.
    pub fn apply_text(&mut self, text: &str) -> Result<bool, CodecError> {
        let message = wallet_codec::decode(text)?;
        Ok(self.apply(message))
    }

    /// Apply one message. Actions at or below the current version are
    /// skipped.
    pub fn apply(&mut self, message: ReplicaMessage) -> bool {
        match message {
            ReplicaMessage::Snapshot { version, state } => {
                self.version = version;
                self.state = state;
                true
            }
            ReplicaMessage::Action { version, action } => {
                if version <= self.version {
                    return false;
                }
                self.state = reduce(&self.state, &action);
                self.version = version;
                true
            }
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn state(&self) -> &StateTree {
        &self.state
    }
}
