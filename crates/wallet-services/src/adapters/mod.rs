//! Reference in-memory adapters.

pub mod chain;
pub mod indexer;
pub mod keyring;
pub mod launcher;
pub mod preferences;

pub use chain::SimulatedChain;
pub use indexer::SimulatedIndexer;
pub use keyring::MemoryKeyring;
pub use launcher::ReferenceLauncher;
pub use preferences::MemoryPreferences;
