//! # Subscription
//!
//! The listening side: a filtered view over one service's emitter.

use shared_types::ServiceId;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

use crate::events::{DomainEvent, EventFilter};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The emitter was dropped.
    #[error("Emitter closed")]
    Closed,
}

/// A subscription handle for receiving one service's events.
pub struct Subscription {
    /// Service whose emitter this listens to.
    source: ServiceId,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<DomainEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Events skipped because this listener fell behind.
    lagged: u64,
}

impl Subscription {
    pub(crate) fn new(
        source: ServiceId,
        receiver: broadcast::Receiver<DomainEvent>,
        filter: EventFilter,
    ) -> Self {
        Self {
            source,
            receiver,
            filter,
            lagged: 0,
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next matching event
    /// - `None` - The emitter was dropped
    ///
    /// A listener more than the channel capacity behind resumes at the
    /// oldest event still buffered. The skipped events are not redelivered.
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.lagged += count;
                    warn!(
                        service = %self.source,
                        skipped = count,
                        "Listener lagged, events skipped"
                    );
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Try to receive the next matching event without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available
    /// - `Err(SubscriptionError::Closed)` - The emitter was dropped
    pub fn try_recv(&mut self) -> Result<Option<DomainEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    self.lagged += count;
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Service whose events this subscription receives.
    #[must_use]
    pub fn source(&self) -> ServiceId {
        self.source
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Total events skipped because of lag.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}
