//! # Core Domain Entities
//!
//! Defines the wallet entities that flow from services, through domain
//! events, into the canonical state tree.
//!
//! ## Clusters
//!
//! - **Accounts**: `Address`, `AccountBalance`, `AssetAmount`
//! - **Transactions**: `TxHash`, `TransactionRecord`, `BlockRef`
//! - **Keyrings**: `KeyringSummary`, `KeyringKind`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wallet_codec::Amount;

use crate::errors::EntityError;

// =============================================================================
// CLUSTER A: ACCOUNTS
// =============================================================================

/// A hex account address (`0x` + 40 hex digits), stored lowercase.
///
/// Deserialization goes through [`FromStr`], so decoded addresses are
/// validated and normalized like parsed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Number of hex digits after the `0x` prefix.
    pub const HEX_LEN: usize = 40;

    /// Build from 20 raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        let mut s = String::with_capacity(2 + Self::HEX_LEN);
        s.push_str("0x");
        for b in bytes {
            s.push_str(&format!("{b:02x}"));
        }
        Self(s)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| EntityError::InvalidAddress(s.to_string()))?;
        if hex.len() != Self::HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EntityError::InvalidAddress(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = EntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Balance of an account's base asset as reported by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account the balance belongs to.
    pub address: Address,
    /// Asset symbol (e.g. `ETH`).
    pub symbol: String,
    /// Exact amount in base units.
    pub amount: Amount,
    /// Unix milliseconds at which the service retrieved the value.
    pub retrieved_at: u64,
}

/// An amount of a non-base asset held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    /// Asset symbol.
    pub symbol: String,
    /// Contract address for token assets.
    pub contract: Option<Address>,
    /// Decimals used to render the amount.
    pub decimals: u8,
    /// Exact amount in base units.
    pub amount: Amount,
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// A transaction hash (`0x`-prefixed hex), stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TxHash {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the block that confirmed a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block hash.
    pub hash: String,
    /// Block height.
    pub height: u64,
}

/// A transaction observed by the chain service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub from: Address,
    pub to: Option<Address>,
    /// Transferred value in base units.
    pub value: Amount,
    pub nonce: u64,
    /// Set once the transaction is included in a block.
    pub block: Option<BlockRef>,
}

impl TransactionRecord {
    /// True when the record carries a confirmation-block reference.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.block.is_some()
    }
}

// =============================================================================
// CLUSTER C: KEYRINGS
// =============================================================================

/// How a keyring was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyringKind {
    /// Generated inside the keyring service.
    Generated,
    /// Imported from a legacy mnemonic.
    Imported,
}

/// Public view of a keyring. Contains no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyringSummary {
    /// Opaque keyring identifier.
    pub id: String,
    pub kind: KeyringKind,
    /// Addresses derived so far.
    pub addresses: Vec<Address>,
}
