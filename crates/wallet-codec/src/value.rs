//! # Dynamic Value Tree
//!
//! A JSON-like tree with a dedicated variant for arbitrary-precision
//! integers, plus the marker detection shared by the typed entry points.

use std::collections::BTreeMap;
use std::str::FromStr;

use num_bigint::BigInt;
use serde_json::Map;

use crate::{CodecError, BIGINT_MARKER};

/// A dynamic value that may contain arbitrary-precision integers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Ordinary number (integer or float within JSON limits).
    Number(serde_json::Number),
    /// Text scalar. Never reinterpreted as a number.
    String(String),
    /// Arbitrary-precision integer.
    BigInt(BigInt),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Mapping with ordered keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Convert into a plain JSON tree, writing big integers as markers.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::BigInt(i) => bigint_marker(i),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (escape_key(k), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Rebuild a value tree from plain JSON, resolving big-integer markers.
    pub fn from_json(json: serde_json::Value) -> Result<Self, CodecError> {
        Ok(match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => {
                if let Some(payload) = marker_payload(&map) {
                    return parse_marker_payload(payload).map(Self::BigInt);
                }
                Self::Map(
                    map.into_iter()
                        .map(|(k, v)| Self::from_json(v).map(|v| (unescape_key(k), v)))
                        .collect::<Result<_, _>>()?,
                )
            }
        })
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Self::BigInt(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Build the marker object for a big integer.
pub(crate) fn bigint_marker(value: &BigInt) -> serde_json::Value {
    let mut map = Map::with_capacity(1);
    map.insert(
        BIGINT_MARKER.to_string(),
        serde_json::Value::String(value.to_string()),
    );
    serde_json::Value::Object(map)
}

/// Walk a JSON tree and reject any malformed big-integer marker.
pub(crate) fn validate_markers(json: &serde_json::Value) -> Result<(), CodecError> {
    match json {
        serde_json::Value::Array(items) => items.iter().try_for_each(validate_markers),
        serde_json::Value::Object(map) => match marker_payload(map) {
            Some(payload) => parse_marker_payload(payload).map(|_| ()),
            None => map.values().try_for_each(validate_markers),
        },
        _ => Ok(()),
    }
}

/// Escape `$`-prefixed keys in a serialized typed value.
///
/// Objects that are already well-formed markers (as written by `Amount`) are
/// kept as they are.
pub(crate) fn escape_keys(json: serde_json::Value) -> serde_json::Value {
    match json {
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(escape_keys).collect())
        }
        serde_json::Value::Object(map) => {
            let is_marker = marker_payload(&map)
                .is_some_and(|payload| parse_marker_payload(payload).is_ok());
            if is_marker {
                return serde_json::Value::Object(map);
            }
            serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (escape_key(&k), escape_keys(v)))
                    .collect(),
            )
        }
        other => other,
    }
}

/// Undo [`escape_keys`]. Markers are left for the typed deserializer.
pub(crate) fn unescape_keys(json: serde_json::Value) -> serde_json::Value {
    match json {
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(unescape_keys).collect())
        }
        serde_json::Value::Object(map) => {
            if marker_payload(&map).is_some() {
                return serde_json::Value::Object(map);
            }
            serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (unescape_key(k), unescape_keys(v)))
                    .collect(),
            )
        }
        other => other,
    }
}

fn escape_key(key: &str) -> String {
    if key.starts_with('$') {
        format!("${key}")
    } else {
        key.to_string()
    }
}

fn unescape_key(key: String) -> String {
    match key.strip_prefix('$') {
        Some(rest) if rest.starts_with('$') => rest.to_string(),
        _ => key,
    }
}

/// Returns the payload when `map` is exactly a big-integer marker.
fn marker_payload(map: &Map<String, serde_json::Value>) -> Option<&serde_json::Value> {
    if map.len() == 1 {
        map.get(BIGINT_MARKER)
    } else {
        None
    }
}

fn parse_marker_payload(payload: &serde_json::Value) -> Result<BigInt, CodecError> {
    match payload {
        serde_json::Value::String(literal) => parse_integer_literal(literal),
        other => Err(CodecError::MalformedEncoding {
            payload: other.to_string(),
        }),
    }
}

/// Parse a base-10 integer literal: optional `-`, then one or more digits.
pub(crate) fn parse_integer_literal(literal: &str) -> Result<BigInt, CodecError> {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::MalformedEncoding {
            payload: literal.to_string(),
        });
    }
    BigInt::from_str(literal).map_err(|_| CodecError::MalformedEncoding {
        payload: literal.to_string(),
    })
}
