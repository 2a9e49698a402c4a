//! # Shared Bus - Domain Event Emitters
//!
//! Every backend service owns exactly one [`ServiceEmitter`] and publishes
//! its domain events through it. Consumers (the runtime's event bridge)
//! subscribe by event name; they never emit on a service's behalf.
//!
//! ```text
//! ┌──────────────┐   emit()    ┌────────────────┐  subscribe()  ┌──────────────┐
//! │ ChainService │ ──────────→ │ ServiceEmitter │ ────────────→ │ Event Bridge │
//! └──────────────┘             │  owner: chain  │               └──────────────┘
//!                              └────────────────┘
//! ```
//!
//! ## Event Names
//!
//! | Event | Emitted by |
//! |-------|------------|
//! | `accountBalance` | chain, indexer |
//! | `transaction` | chain |
//! | `assets` | indexer |
//! | `keyrings` | keyring |

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{DomainEvent, EventFilter, EventKind};
pub use publisher::ServiceEmitter;
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before older events are skipped.
///
/// Skipped events are lost to that subscriber and only counted, see
/// [`Subscription::lagged`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
