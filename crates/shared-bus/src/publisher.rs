//! # Service Emitter
//!
//! The publishing side: one emitter per service, stamped with its owner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared_types::ServiceId;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::events::{DomainEvent, EventFilter};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Event emitter owned by a single service.
///
/// Uses `tokio::sync::broadcast` so that any number of listeners can attach.
/// Clones share the same channel and counter; hand clones to the service's
/// internals, never to another service.
#[derive(Clone)]
pub struct ServiceEmitter {
    /// Service that owns this emitter.
    owner: ServiceId,

    /// Broadcast sender for events.
    sender: broadcast::Sender<DomainEvent>,

    /// Total events emitted (including those with no listener).
    events_emitted: Arc<AtomicU64>,
}

impl ServiceEmitter {
    /// Create an emitter with default capacity.
    #[must_use]
    pub fn new(owner: ServiceId) -> Self {
        Self::with_capacity(owner, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an emitter with the given per-listener buffer capacity.
    #[must_use]
    pub fn with_capacity(owner: ServiceId, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            owner,
            sender,
            events_emitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event to every current listener.
    ///
    /// Returns the number of listeners that will observe it. Emitting with
    /// no listeners is not an error; the event is simply not observed.
    pub fn emit(&self, event: DomainEvent) -> usize {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(
                    service = %self.owner,
                    event = name,
                    receivers,
                    "Event emitted"
                );
                receivers
            }
            Err(_) => {
                trace!(service = %self.owner, event = name, "Event emitted with no listeners");
                0
            }
        }
    }

    /// Attach a listener. Only events emitted after this call are observed.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(service = %self.owner, kinds = ?filter.kinds, "Listener attached");
        Subscription::new(self.owner, self.sender.subscribe(), filter)
    }

    /// Service that owns this emitter.
    #[must_use]
    pub fn owner(&self) -> ServiceId {
        self.owner
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events emitted so far.
    #[must_use]
    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ServiceEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEmitter")
            .field("owner", &self.owner)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
