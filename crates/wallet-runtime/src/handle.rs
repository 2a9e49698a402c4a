//! # Service Handles
//!
//! A handle is a deferred reference to a started service. It is created
//! pending, resolves exactly once, and never goes back to pending.
//!
//! ```text
//! let (resolver, handle) = ServiceHandle::pending(ServiceId::Chain);
//!
//! handle.clone() ──ready().await──┐
//! handle.clone() ──ready().await──┼── suspended until ──→ resolver.resolve(chain)
//! handle.clone() ──try_get()──────┘   (None before)
//! ```
//!
//! A resolver dropped without resolving leaves every waiter suspended
//! forever. There is no timeout.

use std::fmt;
use std::sync::Arc;

use shared_types::ServiceId;
use tokio::sync::watch;

/// Cloneable reader side of a single-assignment service reference.
pub struct ServiceHandle<T: ?Sized> {
    service: ServiceId,
    rx: watch::Receiver<Option<Arc<T>>>,
}

/// Single writer of a [`ServiceHandle`]. Consumed by `resolve`.
pub struct HandleResolver<T: ?Sized> {
    service: ServiceId,
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T: ?Sized> ServiceHandle<T> {
    /// Create a pending handle and its resolver.
    #[must_use]
    pub fn pending(service: ServiceId) -> (HandleResolver<T>, Self) {
        let (tx, rx) = watch::channel(None);
        (HandleResolver { service, tx }, Self { service, rx })
    }

    /// Wait until the service is ready.
    pub async fn ready(&self) -> Arc<T> {
        let mut rx = self.rx.clone();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(value) = current {
                return value;
            }
            if rx.changed().await.is_err() {
                // Resolver dropped unresolved: stay pending.
                std::future::pending::<()>().await;
            }
        }
    }

    /// The service, if it has resolved.
    #[must_use]
    pub fn try_get(&self) -> Option<Arc<T>> {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Service this handle refers to.
    #[must_use]
    pub fn service(&self) -> ServiceId {
        self.service
    }
}

impl<T: ?Sized> Clone for ServiceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service,
            rx: self.rx.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ServiceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("service", &self.service)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<T: ?Sized> HandleResolver<T> {
    /// Resolve the handle. Every current and future waiter observes `value`.
    pub fn resolve(self, value: Arc<T>) {
        self.tx.send_replace(Some(value));
    }

    #[must_use]
    pub fn service(&self) -> ServiceId {
        self.service
    }
}
