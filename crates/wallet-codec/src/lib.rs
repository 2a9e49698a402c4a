//! # Wallet Codec - Numeric-Safe Text Encoding
//!
//! Reversible text encoding for state snapshots and replica messages.
//!
//! ## Why a Marker
//!
//! Plain JSON numbers are read back as `f64` once they exceed the `u64`
//! range, which silently truncates token balances. Every arbitrary-precision
//! integer is therefore written as a reserved single-key object:
//!
//! ```text
//! {"$bigint": "115792089237316195423570985008687907853269984665640564039457"}
//! ```
//!
//! Decoding recognises the marker and rebuilds the exact magnitude. A marker
//! whose payload is not a base-10 integer literal is rejected with
//! [`CodecError::MalformedEncoding`]; it is never coerced.
//!
//! ## Reserved Keys
//!
//! Only markers may carry an unescaped `$`-prefixed key. Every other map key
//! starting with `$` is written with one extra `$` and restored on decode:
//!
//! ```text
//! {"$bigint": "5"}   (a map, not an integer)  →  {"$$bigint": "5"}
//! {"$$x": 1}                                  →  {"$$$x": 1}
//! ```
//!
//! Typed encoding keeps well-formed markers untouched; the target type
//! decides whether they are read as an [`Amount`] or as a map.
//!
//! ## Entry Points
//!
//! | API | Use |
//! |-----|-----|
//! | [`encode`] / [`decode`] | Typed values (`StateTree`, replica messages) |
//! | [`encode_value`] / [`decode_value`] | Dynamic [`Value`] trees |
//!
//! Typed values carry big integers in the [`Amount`] newtype, whose serde
//! implementation emits and reads the marker.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod amount;
pub mod errors;
pub mod value;

pub use amount::Amount;
pub use errors::CodecError;
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reserved object key marking an arbitrary-precision integer.
pub const BIGINT_MARKER: &str = "$bigint";

/// Encode a typed value into its numeric-safe text form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_value(value).map_err(CodecError::Serialize)?;
    serde_json::to_string(&value::escape_keys(json)).map_err(CodecError::Serialize)
}

/// Decode a typed value from its numeric-safe text form.
///
/// Every big-integer marker in the document is validated before the typed
/// deserialization runs, so a malformed marker always surfaces as
/// [`CodecError::MalformedEncoding`] rather than a generic shape error.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    let json: serde_json::Value = serde_json::from_str(text).map_err(CodecError::InvalidText)?;
    value::validate_markers(&json)?;
    serde_json::from_value(value::unescape_keys(json)).map_err(CodecError::ShapeMismatch)
}

/// Encode a dynamic value tree.
pub fn encode_value(value: &Value) -> Result<String, CodecError> {
    serde_json::to_string(&value.to_json()).map_err(CodecError::Serialize)
}

/// Decode a dynamic value tree.
pub fn decode_value(text: &str) -> Result<Value, CodecError> {
    let json: serde_json::Value = serde_json::from_str(text).map_err(CodecError::InvalidText)?;
    Value::from_json(json)
}
