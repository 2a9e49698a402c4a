//! # Shared Types Crate
//!
//! Domain entities, service identifiers, and error types shared by every
//! crate in the wallet workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-service types are defined here.
//! - **Exact Amounts**: Every balance or transfer value is an
//!   [`Amount`](wallet_codec::Amount), never a float or a bounded integer.
//! - **No Secrets**: Keyring entities carry identifiers and public addresses
//!   only. Secret material never leaves the keyring service.

pub mod entities;
pub mod errors;
pub mod service;

pub use entities::*;
pub use errors::*;
pub use service::*;

pub use wallet_codec::Amount;
