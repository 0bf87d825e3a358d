//! # Error Types
//!
//! Foundational errors shared across the workspace. Higher crates define
//! their own `thiserror` enums and wrap these via `#[from]`.

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug)]
pub enum BcertError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A hex digest could not be parsed.
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// A timestamp was malformed or not UTC.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical credential documents.
    #[error("float values are not permitted in canonical credential documents: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error parsing a hex-encoded SHA-256 digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The input is not 64 characters long.
    #[error("expected 64 hex chars, got {0}")]
    InvalidLength(usize),

    /// A non-hex character was found.
    #[error("invalid hex character at position {position}")]
    InvalidHex {
        /// Byte offset of the offending character.
        position: usize,
    },
}
