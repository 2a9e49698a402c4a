//! # Wallet Store
//!
//! The single, centrally-owned state tree that every observable piece of
//! wallet state lives in. All mutations are named [`Action`]s applied by the
//! pure [`reduce`] function; the [`CanonicalStore`] serializes them.
//!
//! ## Data Flow
//!
//! ```text
//! [Event Bridge] ──dispatch(Action)──→ [CanonicalStore]
//!                                            │ reduce(state, action)
//!                                            ↓
//!                                    StoreChange { version, action, state }
//!                                            │
//!                      ┌─────────────────────┼─────────────────────┐
//!                      ↓                     ↓                     ↓
//!               [Persistence]          [Replica Hub]       [Intent Listener]
//! ```
//!
//! ## Guarantees
//!
//! - Dispatch order is application order. No reordering or coalescing.
//! - Version N+1 depends only on version N and action N+1.
//! - Unknown action kinds and intents leave the state untouched.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod action;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::{Action, ActionClass, SecretPhrase};
pub use reducer::reduce;
pub use state::{AccountState, BalanceEntry, KeyringState, StateTree, TransactionEntry, TxStatus};
pub use store::{CanonicalStore, StoreChange};
