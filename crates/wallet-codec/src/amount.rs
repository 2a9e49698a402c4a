//! # Amount
//!
//! Arbitrary-precision integer newtype whose serde form is the big-integer
//! marker. Used for every balance and transfer value in the state tree.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::value::{bigint_marker, parse_integer_literal};
use crate::CodecError;

/// Exact integer amount (token base units).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(BigInt);

impl Amount {
    /// Wrap an existing big integer.
    #[must_use]
    pub fn new(value: BigInt) -> Self {
        Self(value)
    }

    /// Zero amount.
    #[must_use]
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Borrow the underlying integer.
    #[must_use]
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Take the underlying integer.
    #[must_use]
    pub fn into_inner(self) -> BigInt {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<BigInt> for Amount {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(BigInt::from(value))
    }
}

impl FromStr for Amount {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_integer_literal(s).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bigint_marker(&self.0).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Marker {
    #[serde(rename = "$bigint")]
    literal: String,
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marker = Marker::deserialize(deserializer)?;
        parse_integer_literal(&marker.literal)
            .map(Self)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trip() {
        let amount: Amount = "-98765432109876543210987654321".parse().unwrap();
        assert_eq!(amount.to_string(), "-98765432109876543210987654321");
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("12.5".parse::<Amount>().is_err());
    }

    #[test]
    fn test_serde_json_direct_rejects_bad_literal() {
        let result: Result<Amount, _> = serde_json::from_str(r#"{"$bigint":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_number_is_not_an_amount() {
        let result: Result<Amount, _> = serde_json::from_str("100");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero() {
        assert!(Amount::zero().is_zero());
        assert!(!Amount::from(1u64).is_zero());
    }
}
