//! Service ports.
//!
//! - `inbound`: request operations each service exposes to the core
//! - `launcher`: how the core starts services

pub mod inbound;
pub mod launcher;

pub use inbound::{ChainService, IndexerService, KeyringService, PreferenceService};
pub use launcher::ServiceLauncher;
