//! # Service Identifiers
//!
//! Identifies the four backend services and declares their startup
//! dependencies.
//!
//! ```text
//! Preferences ──┬──→ Chain ──→ Indexer
//!               └────────────→ Indexer
//! Keyring (independent)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend service identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceId {
    /// User preference store.
    Preferences,
    /// Blockchain connectivity.
    Chain,
    /// Balance and asset indexer.
    Indexer,
    /// Key management.
    Keyring,
}

impl ServiceId {
    /// Get the service name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preferences => "preferences",
            Self::Chain => "chain",
            Self::Indexer => "indexer",
            Self::Keyring => "keyring",
        }
    }

    /// Services whose handles must resolve before this one may start.
    #[must_use]
    pub fn dependencies(&self) -> &'static [ServiceId] {
        match self {
            Self::Preferences | Self::Keyring => &[],
            Self::Chain => &[Self::Preferences],
            Self::Indexer => &[Self::Preferences, Self::Chain],
        }
    }

    /// All services, in a valid startup order.
    #[must_use]
    pub fn all() -> [ServiceId; 4] {
        [Self::Preferences, Self::Chain, Self::Indexer, Self::Keyring]
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_dependencies() {
        let deps = ServiceId::Indexer.dependencies();
        assert!(deps.contains(&ServiceId::Preferences));
        assert!(deps.contains(&ServiceId::Chain));
    }

    #[test]
    fn test_all_is_topologically_ordered() {
        let order = ServiceId::all();
        for (i, id) in order.iter().enumerate() {
            for dep in id.dependencies() {
                let pos = order.iter().position(|x| x == dep).unwrap();
                assert!(pos < i, "{id} starts before its dependency {dep}");
            }
        }
    }
}
