//! # Wallet Core Test Suite
//!
//! Cross-crate scenarios run against the full runtime and the reference
//! services.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Recording launcher, polling helpers
//!     ├── startup.rs       # Dependency ordering, start failures
//!     ├── hydration.rs     # Persistence on/off, restart from disk
//!     ├── replication.rs   # Replica convergence, inbound actions, intents
//!     └── codec.rs         # Numeric-safe snapshots
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wallet-tests
//! cargo test -p wallet-tests integration::replication::
//! ```

#![allow(dead_code)]

pub mod integration;
