//! # Actions
//!
//! Named, serializable requests to mutate the canonical state. Serialized
//! internally tagged by `"type"`; unrecognized kinds decode to
//! [`Action::Unknown`] instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::{
    AccountBalance, Address, AssetAmount, BlockRef, KeyringSummary, TransactionRecord,
};

/// How an action participates in reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Produces a new state.
    State,
    /// Asks a service to do something; reduces as the identity.
    Intent,
    /// Unrecognized kind; reduces as the identity.
    Unknown,
}

/// A mutation request for the canonical store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    // =========================================================================
    // STATE ACTIONS
    // =========================================================================
    /// Mark an account as loading unless it already has a balance entry.
    LoadAccount { address: Address },

    /// Store the latest balance for an account.
    UpdateBalance { balance: AccountBalance },

    /// Record an observed, unconfirmed transaction.
    TransactionSeen { transaction: TransactionRecord },

    /// Record a transaction as confirmed in a block.
    TransactionConfirmed {
        transaction: TransactionRecord,
        block: BlockRef,
    },

    /// Replace an account's asset list.
    AssetsLoaded {
        address: Address,
        assets: Vec<AssetAmount>,
    },

    /// Replace the keyring summaries.
    UpdateKeyrings { keyrings: Vec<KeyringSummary> },

    // =========================================================================
    // INTENTS (replica → service)
    // =========================================================================
    /// Start tracking an account on the chain service.
    TrackAccountRequested { address: Address },

    /// Generate a new keyring.
    GenerateKeyringRequested,

    /// Import a keyring from a legacy mnemonic.
    ImportKeyringRequested { mnemonic: SecretPhrase },

    /// Any kind this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire name of the action kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoadAccount { .. } => "load-account",
            Self::UpdateBalance { .. } => "update-balance",
            Self::TransactionSeen { .. } => "transaction-seen",
            Self::TransactionConfirmed { .. } => "transaction-confirmed",
            Self::AssetsLoaded { .. } => "assets-loaded",
            Self::UpdateKeyrings { .. } => "update-keyrings",
            Self::TrackAccountRequested { .. } => "track-account-requested",
            Self::GenerateKeyringRequested => "generate-keyring-requested",
            Self::ImportKeyringRequested { .. } => "import-keyring-requested",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn class(&self) -> ActionClass {
        match self {
            Self::TrackAccountRequested { .. }
            | Self::GenerateKeyringRequested
            | Self::ImportKeyringRequested { .. } => ActionClass::Intent,
            Self::Unknown => ActionClass::Unknown,
            _ => ActionClass::State,
        }
    }

    /// True for intent actions.
    #[must_use]
    pub fn is_intent(&self) -> bool {
        self.class() == ActionClass::Intent
    }

    /// Classify a transaction record: confirmed if it carries a block
    /// reference, otherwise seen.
    #[must_use]
    pub fn from_transaction(transaction: TransactionRecord) -> Self {
        match transaction.block.clone() {
            Some(block) => Self::TransactionConfirmed { transaction, block },
            None => Self::TransactionSeen { transaction },
        }
    }
}

/// Secret text carried by an intent. Redacted in debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretPhrase(String);

impl SecretPhrase {
    #[must_use]
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretPhrase(<redacted>)")
    }
}
