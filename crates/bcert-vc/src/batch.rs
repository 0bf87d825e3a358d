//! # Batch Issuer
//!
//! Drives one batch of recipients through
//! `Validating → Hashing → Anchoring → Finalizing → Done`. `Failed` is
//! reachable from every non-terminal phase and is where the issuer rests
//! after any error.
//!
//! The issuer owns the Merkle tree for the duration of a run. Leaf *i* is the
//! credential of recipient *i* throughout. The anchor handler is called
//! exactly once per successful run, and never when the batch fails before
//! the Anchoring phase.
//!
//! No partial output is observable: either every recipient receives a
//! finalized credential or the run returns an error.

use std::collections::{BTreeMap, BTreeSet};

use bcert_core::{RecipientIdentity, Sha256Digest, Timestamp};
use bcert_crypto::MerkleTree;

use crate::anchor::AnchorHandler;
use crate::credential::{
    Assertion, AssertionRecord, FinalizedCredential, Issuer, IssuerRecord, Recipient,
    RecipientRecord, UnsignedCredential,
};
use crate::error::IssueError;
use crate::proof::{Anchor, Chain, MerkleProof2017};

/// The phase of a batch issuance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchPhase {
    /// Checking the recipient list.
    Validating,
    /// Assembling unsigned credentials and adding their leaves.
    Hashing,
    /// Finalizing the tree and anchoring its root.
    Anchoring,
    /// Formatting proofs and attaching them.
    Finalizing,
    /// Every credential is finalized (terminal).
    Done,
    /// The run aborted (terminal).
    Failed,
}

impl BatchPhase {
    /// Whether this phase is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validating => "VALIDATING",
            Self::Hashing => "HASHING",
            Self::Anchoring => "ANCHORING",
            Self::Finalizing => "FINALIZING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// The output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedBatch {
    /// Transaction id returned by the anchor handler.
    pub anchor_id: String,
    /// The chain the root was anchored on.
    pub chain: Chain,
    /// Root of the batch tree. Identical in every credential's proof.
    pub merkle_root: Sha256Digest,
    /// One finalized credential per recipient, keyed by identity.
    pub credentials: BTreeMap<RecipientIdentity, FinalizedCredential>,
}

impl IssuedBatch {
    /// Number of credentials in the batch.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the batch holds no credentials. Never true for a batch
    /// returned by a successful run.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

/// Issues one batch of credentials for a single issuer and assertion.
#[derive(Debug)]
pub struct BatchIssuer {
    issuer: Issuer,
    assertion: Assertion,
    recipients: Vec<Recipient>,
    issued_on: Timestamp,
    phase: BatchPhase,
}

impl BatchIssuer {
    /// Create an issuer in the VALIDATING phase from validated records.
    pub fn new(
        issuer: Issuer,
        assertion: Assertion,
        recipients: Vec<Recipient>,
        issued_on: Timestamp,
    ) -> Self {
        Self {
            issuer,
            assertion,
            recipients,
            issued_on,
            phase: BatchPhase::Validating,
        }
    }

    /// Create an issuer from raw records, validating each one.
    ///
    /// The first record with a missing or invalid field aborts construction.
    pub fn from_records(
        issuer: IssuerRecord,
        assertion: AssertionRecord,
        recipients: Vec<RecipientRecord>,
        issued_on: Timestamp,
    ) -> Result<Self, IssueError> {
        let convert = || -> Result<Self, IssueError> {
            let issuer = Issuer::try_from(issuer)?;
            let assertion = Assertion::try_from(assertion)?;
            let recipients = recipients
                .into_iter()
                .map(Recipient::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Self::new(issuer, assertion, recipients, issued_on))
        };
        convert().map_err(|e| {
            tracing::warn!(phase = %BatchPhase::Validating, error = %e, "batch records rejected");
            e
        })
    }

    /// Current phase.
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    /// Number of recipients in the batch.
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// Run the batch to completion.
    ///
    /// Every run starts from VALIDATING, so running the same issuer twice
    /// against a deterministic anchor handler yields identical output.
    pub fn run<A: AnchorHandler>(&mut self, handler: &mut A) -> Result<IssuedBatch, IssueError> {
        self.phase = BatchPhase::Validating;
        let result = self.drive(handler);
        if let Err(ref e) = result {
            tracing::warn!(phase = %self.phase, error = %e, "batch issuance failed");
            self.phase = BatchPhase::Failed;
        }
        result
    }

    fn transition(&mut self, next: BatchPhase) {
        tracing::debug!(from = %self.phase, to = %next, "batch phase transition");
        self.phase = next;
    }

    fn drive<A: AnchorHandler>(&mut self, handler: &mut A) -> Result<IssuedBatch, IssueError> {
        self.validate()?;

        self.transition(BatchPhase::Hashing);
        let mut tree = MerkleTree::new();
        let mut unsigned = Vec::with_capacity(self.recipients.len());
        for recipient in &self.recipients {
            let doc = UnsignedCredential::assemble(
                &self.issuer,
                &self.assertion,
                recipient,
                self.issued_on,
            );
            tree.add_leaf(&doc.canonical_bytes()?)?;
            unsigned.push(doc);
        }

        self.transition(BatchPhase::Anchoring);
        let merkle_root = tree.finalize()?;
        let chain = handler.chain();
        let anchor_id = handler
            .anchor(&merkle_root)
            .map_err(|e| IssueError::Anchoring(Box::new(e)))?;
        tracing::info!(root = %merkle_root, anchor_id = %anchor_id, chain = %chain, "batch root anchored");

        self.transition(BatchPhase::Finalizing);
        let anchor = Anchor::new(anchor_id.clone(), chain);
        let proofs = tree.proofs()?;
        let mut credentials = BTreeMap::new();
        for (doc, inclusion) in unsigned.into_iter().zip(proofs) {
            let proof = MerkleProof2017::from_inclusion(&inclusion, &merkle_root, &anchor)?;
            credentials.insert(doc.recipient.identity.clone(), doc.finalize(proof));
        }

        self.transition(BatchPhase::Done);
        tracing::info!(credentials = credentials.len(), "batch issued");
        Ok(IssuedBatch {
            anchor_id,
            chain,
            merkle_root,
            credentials,
        })
    }

    fn validate(&self) -> Result<(), IssueError> {
        if self.recipients.is_empty() {
            return Err(IssueError::EmptyBatch);
        }
        let mut seen = BTreeSet::new();
        for recipient in &self.recipients {
            if !seen.insert(&recipient.identity) {
                return Err(IssueError::DuplicateRecipient(recipient.identity.clone()));
            }
        }
        Ok(())
    }
}

/// Issue one batch and return every finalized credential.
pub fn issue_batch<A: AnchorHandler>(
    issuer: Issuer,
    assertion: Assertion,
    recipients: Vec<Recipient>,
    issued_on: Timestamp,
    handler: &mut A,
) -> Result<IssuedBatch, IssueError> {
    BatchIssuer::new(issuer, assertion, recipients, issued_on).run(handler)
}
