//! # Reducer
//!
//! `reduce` is pure and total: every action maps the previous state to the
//! next one, and anything it does not understand is the identity.

use crate::action::Action;
use crate::state::{BalanceEntry, StateTree, TransactionEntry, TxStatus};

/// Apply one action to a state, producing the next state.
#[must_use]
pub fn reduce(state: &StateTree, action: &Action) -> StateTree {
    let mut next = state.clone();
    match action {
        Action::LoadAccount { address } => {
            next.account
                .balances
                .entry(address.clone())
                .or_insert(BalanceEntry::Loading);
        }
        Action::UpdateBalance { balance } => {
            next.account
                .balances
                .insert(balance.address.clone(), BalanceEntry::Loaded(balance.clone()));
        }
        Action::TransactionSeen { transaction } => {
            let already_confirmed = matches!(
                next.transaction_status(&transaction.hash),
                Some(TxStatus::Confirmed { .. })
            );
            if !already_confirmed {
                next.account.transactions.insert(
                    transaction.hash.clone(),
                    TransactionEntry {
                        record: transaction.clone(),
                        status: TxStatus::Seen,
                    },
                );
            }
        }
        Action::TransactionConfirmed { transaction, block } => {
            next.account.transactions.insert(
                transaction.hash.clone(),
                TransactionEntry {
                    record: transaction.clone(),
                    status: TxStatus::Confirmed {
                        block: block.clone(),
                    },
                },
            );
        }
        Action::AssetsLoaded { address, assets } => {
            next.account.assets.insert(address.clone(), assets.clone());
        }
        Action::UpdateKeyrings { keyrings } => {
            next.keyrings.keyrings = keyrings.clone();
        }
        Action::TrackAccountRequested { .. }
        | Action::GenerateKeyringRequested
        | Action::ImportKeyringRequested { .. }
        | Action::Unknown => {}
    }
    next
}
