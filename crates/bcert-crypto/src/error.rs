//! # Merkle Errors

use thiserror::Error;

/// Errors raised by [`MerkleTree`](crate::MerkleTree) operations.
///
/// `NotFinalized`, `AlreadyFinalized` and `InvalidIndex` are contract
/// violations by the caller; the batch pipeline never triggers them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// `finalize()` was called on a tree with no leaves.
    #[error("cannot finalize a Merkle tree with no leaves")]
    EmptyTree,

    /// A leaf was added after the tree was finalized.
    #[error("Merkle tree is already finalized; no further leaves may be added")]
    AlreadyFinalized,

    /// A proof or root was requested before `finalize()`.
    #[error("Merkle tree has not been finalized")]
    NotFinalized,

    /// A proof was requested for a leaf that does not exist.
    #[error("leaf index {index} out of range for tree with {leaf_count} leaves")]
    InvalidIndex {
        /// The requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
}
