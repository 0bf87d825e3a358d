//! # Anchor Handlers
//!
//! The anchor handler is the only collaborator of the batch pipeline that
//! talks to the outside world: it writes the batch root to a ledger and
//! returns the transaction id. The pipeline calls it exactly once per batch
//! and treats the returned id as opaque.
//!
//! Transport, fee policy, confirmation waiting and retries all belong to the
//! handler implementation.
//!
//! - [`MockchainAnchor`]: no ledger. Returns a deterministic simulated
//!   transaction id. Used for local issuance and tests.

use bcert_core::Sha256Digest;
use sha2::{Digest, Sha256};

use crate::proof::Chain;

/// Writes a batch root to a ledger.
pub trait AnchorHandler {
    /// Handler-specific failure. Surfaced verbatim as `IssueError::Anchoring`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The chain this handler anchors on. Determines the proof's anchor block.
    fn chain(&self) -> Chain;

    /// Anchor `root` and return the transaction id. Blocks until the handler
    /// considers the root anchored.
    fn anchor(&mut self, root: &Sha256Digest) -> Result<String, Self::Error>;
}

impl<A: AnchorHandler + ?Sized> AnchorHandler for &mut A {
    type Error = A::Error;

    fn chain(&self) -> Chain {
        (**self).chain()
    }

    fn anchor(&mut self, root: &Sha256Digest) -> Result<String, Self::Error> {
        (**self).anchor(root)
    }
}

// ─── MockchainAnchor ─────────────────────────────────────────────────────

/// Anchor handler that simulates a ledger.
///
/// The transaction id is the hex SHA-256 of the 32 root bytes, so the same
/// batch always gets the same id. Every anchored root is recorded for
/// inspection.
#[derive(Debug, Clone, Default)]
pub struct MockchainAnchor {
    anchored: Vec<Sha256Digest>,
}

impl MockchainAnchor {
    /// Create a handler with no anchoring history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roots anchored so far, in call order.
    pub fn anchored_roots(&self) -> &[Sha256Digest] {
        &self.anchored
    }
}

impl AnchorHandler for MockchainAnchor {
    type Error = std::convert::Infallible;

    fn chain(&self) -> Chain {
        Chain::Mockchain
    }

    fn anchor(&mut self, root: &Sha256Digest) -> Result<String, Self::Error> {
        self.anchored.push(*root);
        let mut tx = [0u8; 32];
        tx.copy_from_slice(&Sha256::digest(root.as_bytes()));
        Ok(Sha256Digest::new(tx).to_hex())
    }
}
