//! # Canonical Serialization: JCS Byte Production for Merkle Leaves
//!
//! `CanonicalBytes` is the only way to produce the byte payload that is hashed
//! into a Merkle leaf. A third-party verifier recomputes a credential's
//! `targetHash` by stripping the `signature` member, canonicalizing what is
//! left and hashing it; that only works if issuer and verifier agree on every
//! byte.
//!
//! ## Rules
//!
//! 1. **Reject floats.** JCS number formatting for non-integers is a common
//!    source of cross-implementation drift. Credentials carry no fractional
//!    numbers, so any float is treated as a malformed document.
//! 2. **Timestamps are strings.** `Timestamp` serializes to
//!    `YYYY-MM-DDTHH:MM:SSZ` before it reaches this module.
//! 3. **Sorted keys, compact separators.** `serde_jcs` produces RFC 8785
//!    output; non-ASCII text passes through as UTF-8.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No float values anywhere in the document.
/// - Object keys are sorted; separators are compact (RFC 8785).
///
/// The inner `Vec<u8>` is private, so downstream code cannot smuggle
/// non-canonical bytes into a Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `CanonicalizationError::FloatRejected` if the value contains a float,
    /// `CanonicalizationError::SerializationFailed` if serde fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the JSON tree and fail on the first non-integer number.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}
