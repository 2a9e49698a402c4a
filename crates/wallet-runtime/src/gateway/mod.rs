//! # Persistence & Replication Gateway
//!
//! Passthrough stage over the store's change stream. Neither side can
//! block or fail a dispatch.
//!
//! ```text
//!                     ┌──→ persistence ──encode──→ StateStorage.set("state")
//! CanonicalStore ─────┤
//!   StoreChange       └──→ ReplicaHub ──encode──→ ReplicaEndpoint (per replica)
//!        ↑                      │
//!        └──── dispatch ←─decode┘ (inbound actions)
//! ```

pub mod persistence;
pub mod replica;

pub use persistence::{hydrate, persist, spawn_persistence};
pub use replica::{ReplicaEndpoint, ReplicaHub, ReplicaMessage, ReplicaMirror};
