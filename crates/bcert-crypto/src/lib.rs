//! # bcert-crypto: Hashing and Merkle Primitives
//!
//! - **SHA-256** leaf hashing from `CanonicalBytes` (the only accepted input
//!   type, so every leaf comes from a canonical credential document).
//! - **Merkle tree** over a batch of leaves, with per-leaf inclusion proofs
//!   compatible with Chainpoint / Blockcerts `MerkleProof2017` verifiers.
//!
//! ## Crate Policy
//!
//! - Depends only on `bcert-core` internally.
//! - No mocking of hashing in tests: every test uses real SHA-256.

pub mod error;
pub mod merkle;
pub mod sha256;

pub use error::MerkleError;
pub use merkle::{node_hash, InclusionProof, MerkleTree, PathStep};
pub use sha256::{sha256_digest, sha256_hex};
