//! # Domain Events
//!
//! Defines every event a backend service may emit, and the name-based
//! filter consumers subscribe with.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::{AccountBalance, Address, AssetAmount, KeyringSummary, TransactionRecord};

/// All events that services publish through their emitters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum DomainEvent {
    // =========================================================================
    // CHAIN + INDEXER
    // =========================================================================
    /// Latest base-asset balance for an account.
    AccountBalance(AccountBalance),

    // =========================================================================
    // CHAIN
    // =========================================================================
    /// A transaction was observed. Carries a block reference once confirmed.
    Transaction(TransactionRecord),

    // =========================================================================
    // INDEXER
    // =========================================================================
    /// Asset holdings for an account were (re)loaded.
    Assets {
        address: Address,
        assets: Vec<AssetAmount>,
    },

    // =========================================================================
    // KEYRING
    // =========================================================================
    /// The set of keyrings changed.
    Keyrings(Vec<KeyringSummary>),
}

impl DomainEvent {
    /// Get the kind of this event (for filtering and routing).
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::AccountBalance(_) => EventKind::AccountBalance,
            Self::Transaction(_) => EventKind::Transaction,
            Self::Assets { .. } => EventKind::Assets,
            Self::Keyrings(_) => EventKind::Keyrings,
        }
    }

    /// Event name as used on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Event kinds, one per [`DomainEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AccountBalance,
    Transaction,
    Assets,
    Keyrings,
}

impl EventKind {
    /// Event name as used on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountBalance => "accountBalance",
            Self::Transaction => "transaction",
            Self::Assets => "assets",
            Self::Keyrings => "keyrings",
        }
    }

    /// Look up a kind by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "accountBalance" => Some(Self::AccountBalance),
            "transaction" => Some(Self::Transaction),
            "assets" => Some(Self::Assets),
            "keyrings" => Some(Self::Keyrings),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific event kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self { kinds }
    }

    /// Create a filter from wire names, ignoring unknown names.
    #[must_use]
    pub fn names(names: &[&str]) -> Self {
        Self {
            kinds: names.iter().filter_map(|n| EventKind::from_name(n)).collect(),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &DomainEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Amount, KeyringKind};

    fn balance_event() -> DomainEvent {
        DomainEvent::AccountBalance(AccountBalance {
            address: Address::from_bytes(&[0x11; 20]),
            symbol: "ETH".to_string(),
            amount: Amount::from(1_000u64),
            retrieved_at: 1,
        })
    }

    #[test]
    fn test_event_names() {
        assert_eq!(balance_event().name(), "accountBalance");
        assert_eq!(DomainEvent::Keyrings(vec![]).name(), "keyrings");
    }

    #[test]
    fn test_name_lookup_round_trip() {
        for kind in [
            EventKind::AccountBalance,
            EventKind::Transaction,
            EventKind::Assets,
            EventKind::Keyrings,
        ] {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("blockMined"), None);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&balance_event()));
    }

    #[test]
    fn test_filter_by_name() {
        let filter = EventFilter::names(&["keyrings", "unknownEvent"]);
        assert_eq!(filter.kinds, vec![EventKind::Keyrings]);
        assert!(!filter.matches(&balance_event()));

        let keyrings = DomainEvent::Keyrings(vec![KeyringSummary {
            id: "k1".to_string(),
            kind: KeyringKind::Generated,
            addresses: vec![],
        }]);
        assert!(filter.matches(&keyrings));
    }

    #[test]
    fn test_event_encodes_with_name_tag() {
        let text = wallet_codec::encode(&balance_event()).unwrap();
        assert!(text.contains("\"event\":\"accountBalance\""));
        let back: DomainEvent = wallet_codec::decode(&text).unwrap();
        assert_eq!(back, balance_event());
    }
}
