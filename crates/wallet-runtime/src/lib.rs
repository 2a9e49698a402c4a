//! # Wallet Runtime
//!
//! Orchestration core of the multi-service wallet.
//!
//! ## Modular Structure
//!
//! - `handle` - Single-assignment service handles
//! - `bootstrap/` - Dependency-ordered service startup and status board
//! - `bridge/` - Domain event routing into store actions, hydration, intents
//! - `gateway/` - Snapshot persistence and replica channels
//! - `storage/` - Durable key/value backends for snapshots
//! - `config` - Environment configuration
//! - `runtime` - [`WalletRuntime`], wiring everything together
//!
//! ## Control Flow
//!
//! ```text
//!  Bootstrapper ──start──→ ServiceHandle<T> ──resolve──→ EventBridge
//!                                                           │ dispatch(Action)
//!                                                           ↓
//!  StateStorage ──hydrate──→ CanonicalStore ──StoreChange──→ Gateway
//!                                                     ┌─────┴──────┐
//!                                                     ↓            ↓
//!                                               StateStorage   ReplicaHub
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Hydrate the store from durable storage (if persistence is enabled)
//! 2. Start persistence and replication on the store's change stream
//! 3. Start every service; each waits only for its own dependencies
//! 4. Attach bridge listeners as handles resolve; hydrate tracked accounts
//! 5. Serve replicas until shutdown

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handle;
pub mod runtime;
pub mod storage;

pub use bootstrap::{Bootstrapper, ServiceHandles, ServiceStatus, ServiceStatusBoard};
pub use bridge::EventBridge;
pub use config::{RuntimeConfig, StorageBackend};
pub use errors::{RuntimeError, StorageError};
pub use gateway::{ReplicaEndpoint, ReplicaHub, ReplicaMessage, ReplicaMirror};
pub use handle::{HandleResolver, ServiceHandle};
pub use runtime::{RuntimeOptions, WalletRuntime};
pub use storage::{FileStorage, MemoryStorage, StateStorage, STATE_KEY};
