//! # State Tree
//!
//! The full canonical, observable application state. Ordered maps keep the
//! encoding deterministic and equality structural.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared_types::{AccountBalance, Address, AssetAmount, BlockRef, KeyringSummary, TransactionRecord, TxHash};

/// Root of the canonical state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTree {
    pub account: AccountState,
    pub keyrings: KeyringState,
}

/// Per-account data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountState {
    /// Balance entry per tracked account.
    pub balances: BTreeMap<Address, BalanceEntry>,
    /// Observed transactions by hash.
    pub transactions: BTreeMap<TxHash, TransactionEntry>,
    /// Non-base asset holdings per account.
    pub assets: BTreeMap<Address, Vec<AssetAmount>>,
}

/// Keyring summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyringState {
    pub keyrings: Vec<KeyringSummary>,
}

/// Balance slot of a tracked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "balance", rename_all = "kebab-case")]
pub enum BalanceEntry {
    /// Tracked, balance not yet known.
    Loading,
    /// Latest reported balance.
    Loaded(AccountBalance),
}

/// A recorded transaction and its confirmation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub record: TransactionRecord,
    pub status: TxStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum TxStatus {
    Seen,
    Confirmed { block: BlockRef },
}

impl StateTree {
    /// Loaded balance for an account, if any.
    #[must_use]
    pub fn balance(&self, address: &Address) -> Option<&AccountBalance> {
        match self.account.balances.get(address) {
            Some(BalanceEntry::Loaded(balance)) => Some(balance),
            _ => None,
        }
    }

    /// True when the account has any balance entry (loading or loaded).
    #[must_use]
    pub fn is_tracked(&self, address: &Address) -> bool {
        self.account.balances.contains_key(address)
    }

    #[must_use]
    pub fn transaction_status(&self, hash: &TxHash) -> Option<&TxStatus> {
        self.account.transactions.get(hash).map(|entry| &entry.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Amount;

    #[test]
    fn test_empty_state_decodes_from_empty_object() {
        let state: StateTree = wallet_codec::decode("{}").unwrap();
        assert_eq!(state, StateTree::default());
    }

    #[test]
    fn test_balance_lookup() {
        let address = Address::from_bytes(&[0x05; 20]);
        let mut state = StateTree::default();
        state
            .account
            .balances
            .insert(address.clone(), BalanceEntry::Loading);
        assert!(state.is_tracked(&address));
        assert!(state.balance(&address).is_none());

        let balance = AccountBalance {
            address: address.clone(),
            symbol: "ETH".to_string(),
            amount: Amount::from(9u64),
            retrieved_at: 0,
        };
        state
            .account
            .balances
            .insert(address.clone(), BalanceEntry::Loaded(balance.clone()));
        assert_eq!(state.balance(&address), Some(&balance));
    }
}
