//! # Routing Table
//!
//! Maps `(owning service, event kind)` to the action a domain event
//! produces. The table is the whole of the bridge's event wiring; the
//! listener code only consults it.
//!
//! | Owner | Event | Action |
//! |-------|-------|--------|
//! | chain | `accountBalance` | `update-balance` |
//! | chain | `transaction` | `transaction-confirmed` with a block, else `transaction-seen` |
//! | indexer | `accountBalance` | `update-balance` |
//! | indexer | `assets` | `assets-loaded` |
//! | keyring | `keyrings` | `update-keyrings` |

use shared_bus::{DomainEvent, EventKind};
use shared_types::ServiceId;
use wallet_store::Action;

/// Every routed `(owner, event kind)` pair.
pub const ROUTES: &[(ServiceId, EventKind)] = &[
    (ServiceId::Chain, EventKind::AccountBalance),
    (ServiceId::Chain, EventKind::Transaction),
    (ServiceId::Indexer, EventKind::AccountBalance),
    (ServiceId::Indexer, EventKind::Assets),
    (ServiceId::Keyring, EventKind::Keyrings),
];

/// Event kinds routed for `owner`. Used as the subscription filter.
#[must_use]
pub fn routed_kinds(owner: ServiceId) -> Vec<EventKind> {
    ROUTES
        .iter()
        .filter(|(service, _)| *service == owner)
        .map(|(_, kind)| *kind)
        .collect()
}

/// True when `owner` has a route for `kind`.
#[must_use]
pub fn is_routed(owner: ServiceId, kind: EventKind) -> bool {
    ROUTES.contains(&(owner, kind))
}

/// Translate an event from `owner` into its action.
///
/// Returns `None` when the table has no entry for the pair.
#[must_use]
pub fn route(owner: ServiceId, event: &DomainEvent) -> Option<Action> {
    if !is_routed(owner, event.kind()) {
        return None;
    }
    let action = match event {
        DomainEvent::AccountBalance(balance) => Action::UpdateBalance {
            balance: balance.clone(),
        },
        DomainEvent::Transaction(transaction) => Action::from_transaction(transaction.clone()),
        DomainEvent::Assets { address, assets } => Action::AssetsLoaded {
            address: address.clone(),
            assets: assets.clone(),
        },
        DomainEvent::Keyrings(keyrings) => Action::UpdateKeyrings {
            keyrings: keyrings.clone(),
        },
    };
    Some(action)
}
