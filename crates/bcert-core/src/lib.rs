//! # bcert-core: Foundational Types for Blockcerts Issuance
//!
//! The leaf of the workspace crate DAG. Every other `bcert-*` crate depends
//! on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every byte sequence that becomes a Merkle
//!    leaf flows through `CanonicalBytes::new()` (RFC 8785 JCS). Two issuers
//!    serializing the same credential produce the same leaf.
//!
//! 2. **`Sha256Digest` value type.** Leaves, internal nodes, and roots are all
//!    32-byte digests rendered as 64 lowercase hex characters on the wire.
//!
//! 3. **UTC-only timestamps.** `Timestamp` renders as `YYYY-MM-DDTHH:MM:SSZ`
//!    so that `issuedOn` and `expires` are byte-stable in canonical form.
//!
//! 4. **Deterministic identifiers.** `CredentialId` is a UUID v5 derived from
//!    the batch inputs, so re-running an issuance with a fixed clock yields
//!    identical credentials.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bcert-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::Sha256Digest;
pub use error::{BcertError, CanonicalizationError, DigestError};
pub use identity::{CredentialId, RecipientIdentity};
pub use temporal::Timestamp;
