//! # Merkle Tree: Batch Commitment and Inclusion Proofs
//!
//! A binary hash tree over the leaves of one issuance batch. Only the root is
//! anchored; each credential carries the authentication path from its own
//! leaf up to that root.
//!
//! ## Algorithm
//!
//! Compatible with Chainpoint `MerkleTools` (SHA-256), which is what
//! Blockcerts `MerkleProof2017` verifiers replay:
//!
//! - Node: `SHA256(left || right)` over the raw 32-byte digests, no domain
//!   separation prefix.
//! - Levels are built left to right by pairing adjacent nodes.
//! - An odd trailing node is promoted to the next level unchanged. It is
//!   neither duplicated nor hashed with itself.
//!
//! A promoted node has no sibling at that level, so its path records
//! [`PathStep::PassThrough`]. Pass-through steps do not change the running
//! hash during replay and are dropped from the serialized proof.

use bcert_core::{CanonicalBytes, Sha256Digest};

use crate::error::MerkleError;
use crate::sha256::{sha256_digest, sha256_raw};

// ---------------------------------------------------------------------------
// Node hashing
// ---------------------------------------------------------------------------

/// Compute a parent node: `SHA256(left || right)`.
///
/// Public so that proof verification outside this crate applies exactly the
/// same rule as tree construction.
pub fn node_hash(left: &Sha256Digest, right: &Sha256Digest) -> Sha256Digest {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(left.as_bytes());
    input[32..].copy_from_slice(right.as_bytes());
    sha256_raw(&input)
}

/// Build the next level up. Pairs adjacent nodes; promotes an odd tail.
fn next_level(level: &[Sha256Digest]) -> Vec<Sha256Digest> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => node_hash(left, right),
            _ => pair[0],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Inclusion proofs
// ---------------------------------------------------------------------------

/// One level of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// The sibling sits to the left: parent = `H(sibling || current)`.
    Left(Sha256Digest),
    /// The sibling sits to the right: parent = `H(current || sibling)`.
    Right(Sha256Digest),
    /// The current node was promoted unpaired; it carries over unchanged.
    PassThrough,
}

impl PathStep {
    /// The sibling digest, if this level has one.
    pub fn sibling(&self) -> Option<&Sha256Digest> {
        match self {
            Self::Left(d) | Self::Right(d) => Some(d),
            Self::PassThrough => None,
        }
    }

    /// Combine the running hash with this step.
    pub fn apply(&self, current: &Sha256Digest) -> Sha256Digest {
        match self {
            Self::Left(sibling) => node_hash(sibling, current),
            Self::Right(sibling) => node_hash(current, sibling),
            Self::PassThrough => *current,
        }
    }
}

/// The authentication path for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    /// Index of the leaf being proven (recipient order).
    pub leaf_index: usize,
    /// The leaf digest (`targetHash`).
    pub target: Sha256Digest,
    /// Steps from the leaf level up to, but excluding, the root level.
    pub path: Vec<PathStep>,
}

impl InclusionProof {
    /// Replay the path from the target and return the resulting root.
    pub fn compute_root(&self) -> Sha256Digest {
        self.path
            .iter()
            .fold(self.target, |current, step| step.apply(&current))
    }

    /// Whether replaying the path yields `root`.
    pub fn verify(&self, root: &Sha256Digest) -> bool {
        self.compute_root() == *root
    }

    /// Steps that carry a sibling, in order. This is what goes on the wire.
    pub fn siblings(&self) -> impl Iterator<Item = &PathStep> {
        self.path
            .iter()
            .filter(|step| !matches!(step, PathStep::PassThrough))
    }
}

// ---------------------------------------------------------------------------
// MerkleTree
// ---------------------------------------------------------------------------

/// A Merkle tree over one batch of credential leaves.
///
/// Leaves are appended in recipient order. After [`finalize`](Self::finalize)
/// the tree is frozen: further leaves are rejected and proofs become
/// available. A tree instance serves exactly one batch.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    /// Leaf digests in insertion order.
    leaves: Vec<Sha256Digest>,
    /// All levels, leaves first, root level last. `None` until finalized.
    levels: Option<Vec<Vec<Sha256Digest>>>,
}

impl MerkleTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a canonical payload and append it as the next leaf.
    ///
    /// Returns the index of the new leaf.
    pub fn add_leaf(&mut self, payload: &CanonicalBytes) -> Result<usize, MerkleError> {
        self.add_leaf_digest(sha256_digest(payload))
    }

    /// Append an already computed leaf digest.
    pub fn add_leaf_digest(&mut self, leaf: Sha256Digest) -> Result<usize, MerkleError> {
        if self.levels.is_some() {
            return Err(MerkleError::AlreadyFinalized);
        }
        self.leaves.push(leaf);
        Ok(self.leaves.len() - 1)
    }

    /// Number of leaves added so far.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// The leaf digest at `index`.
    pub fn leaf(&self, index: usize) -> Option<&Sha256Digest> {
        self.leaves.get(index)
    }

    /// Whether [`finalize`](Self::finalize) has completed.
    pub fn is_finalized(&self) -> bool {
        self.levels.is_some()
    }

    /// Build every level and return the root.
    ///
    /// Calling it again on a finalized tree returns the same root without
    /// rebuilding.
    pub fn finalize(&mut self) -> Result<Sha256Digest, MerkleError> {
        if let Some(root) = self.root() {
            return Ok(root);
        }
        if self.leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut levels = vec![self.leaves.clone()];
        while let Some(top) = levels.last().filter(|level| level.len() > 1) {
            let next = next_level(top);
            levels.push(next);
        }
        let root = levels[levels.len() - 1][0];
        self.levels = Some(levels);
        Ok(root)
    }

    /// The root, if the tree is finalized.
    pub fn root(&self) -> Option<Sha256Digest> {
        self.levels
            .as_ref()
            .and_then(|levels| levels.last())
            .and_then(|top| top.first())
            .copied()
    }

    /// Derive the authentication path for the leaf at `index`.
    pub fn proof_for(&self, index: usize) -> Result<InclusionProof, MerkleError> {
        let levels = self.levels.as_ref().ok_or(MerkleError::NotFinalized)?;
        let target = *self.leaves.get(index).ok_or(MerkleError::InvalidIndex {
            index,
            leaf_count: self.leaves.len(),
        })?;

        let mut path = Vec::with_capacity(levels.len().saturating_sub(1));
        let mut pos = index;
        for level in &levels[..levels.len() - 1] {
            let step = if pos % 2 == 1 {
                PathStep::Left(level[pos - 1])
            } else if pos + 1 < level.len() {
                PathStep::Right(level[pos + 1])
            } else {
                PathStep::PassThrough
            };
            path.push(step);
            pos /= 2;
        }

        Ok(InclusionProof {
            leaf_index: index,
            target,
            path,
        })
    }

    /// Proofs for every leaf, in index order.
    pub fn proofs(&self) -> Result<Vec<InclusionProof>, MerkleError> {
        (0..self.leaves.len()).map(|i| self.proof_for(i)).collect()
    }
}
