//! # SHA-256 Leaf Hashing
//!
//! The Canonical Hasher. The signature `sha256_digest(&CanonicalBytes)` makes
//! it a compile error to hash a credential that skipped canonicalization.

use bcert_core::{CanonicalBytes, Sha256Digest};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> Sha256Digest {
    sha256_raw(data.as_bytes())
}

/// Compute the SHA-256 digest of canonical bytes as 64 lowercase hex chars.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// SHA-256 over raw bytes. Kept crate-private: only internal Merkle nodes
/// hash bytes that are not a canonical document.
pub(crate) fn sha256_raw(bytes: &[u8]) -> Sha256Digest {
    let hash = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    Sha256Digest::new(out)
}
