//! # Credential and Issuance Errors
//!
//! Every variant of [`IssueError`] aborts the whole batch. Anchor handler
//! failures are carried as an opaque boxed source and never retried here.

use bcert_core::{CanonicalizationError, RecipientIdentity, Sha256Digest};
use bcert_crypto::MerkleError;
use thiserror::Error;

/// Which input record a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The issuing organization.
    Issuer,
    /// The badge / achievement being asserted.
    Assertion,
    /// One recipient of the batch.
    Recipient,
}

impl RecordKind {
    /// Lower-case name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuer => "issuer",
            Self::Assertion => "assertion",
            Self::Recipient => "recipient",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw input record could not be turned into a validated record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field `{field}` on {kind} record")]
    MissingField {
        /// The record the field belongs to.
        kind: RecordKind,
        /// The field name as it appears in the input.
        field: &'static str,
    },

    /// A field is present but cannot be interpreted.
    #[error("invalid field `{field}` on {kind} record: {reason}")]
    InvalidField {
        /// The record the field belongs to.
        kind: RecordKind,
        /// The field name as it appears in the input.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A Merkle inclusion proof could not be formatted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The inclusion proof does not replay to the batch root it was paired with.
    #[error("inclusion proof for leaf {leaf_index} replays to {computed}, expected root {expected}")]
    RootMismatch {
        /// Leaf index recorded in the proof.
        leaf_index: usize,
        /// The batch root.
        expected: Sha256Digest,
        /// The root the proof actually produces.
        computed: Sha256Digest,
    },
}

/// A batch issuance failed. No credentials are produced.
#[derive(Error, Debug)]
pub enum IssueError {
    /// The batch has no recipients.
    #[error("cannot issue an empty batch: at least one recipient is required")]
    EmptyBatch,

    /// An input record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Two recipients share an identity, which would collide in the output map.
    #[error("duplicate recipient identity {0} in batch")]
    DuplicateRecipient(RecipientIdentity),

    /// An unsigned credential could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Merkle tree contract violation.
    #[error("Merkle tree error: {0}")]
    Merkle(#[from] MerkleError),

    /// Proof formatting failed.
    #[error("proof formatting failed: {0}")]
    Proof(#[from] ProofError),

    /// The anchor handler failed. The source is the handler's own error.
    #[error("anchoring failed: {0}")]
    Anchoring(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A finalized credential failed verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The recomputed leaf digest differs from `targetHash`.
    #[error("credential content does not match targetHash: expected {expected}, computed {computed}")]
    TargetHashMismatch {
        /// `targetHash` from the proof.
        expected: Sha256Digest,
        /// Digest of the canonical unsigned credential.
        computed: Sha256Digest,
    },

    /// Replaying the proof path does not yield `merkleRoot`.
    #[error("proof path does not lead to merkleRoot: expected {expected}, computed {computed}")]
    MerkleRootMismatch {
        /// `merkleRoot` from the proof.
        expected: Sha256Digest,
        /// Root recomputed from `targetHash` and the path.
        computed: Sha256Digest,
    },

    /// The proof carries no anchor.
    #[error("proof has no anchors")]
    MissingAnchor,

    /// The credential expired before the verification time.
    #[error("credential expired at {expires}")]
    Expired {
        /// The credential's `expires` value, as written.
        expires: String,
    },

    /// The credential's `expires` value is not an RFC 3339 timestamp.
    #[error("invalid expires value {value:?}: {reason}")]
    InvalidExpires {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The document is not a finalized Blockcerts credential.
    #[error("not a finalized Blockcerts credential: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The unsigned credential could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
