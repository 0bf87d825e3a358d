//! # SHA-256 Digest Value Type
//!
//! `Sha256Digest` is the value carried by every Merkle leaf, internal node and
//! root. On the wire (proof records, CLI output) it is always 64 lowercase hex
//! characters, so serde goes through the hex form rather than a byte array.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DigestError;

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    /// Length of the raw digest in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-character hex string. Upper-case digits are accepted.
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(DigestError::InvalidLength(hex.len()));
        }
        if let Some(position) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidHex { position });
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            out[i] = (nibble(chunk[0]) << 4) | nibble(chunk[1]);
        }
        Ok(Self(out))
    }
}

/// Value of one ASCII hex digit. Callers have already checked the input.
fn nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Sha256Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
