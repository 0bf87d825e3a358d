//! # bcert-vc: Blockcerts Credentials and Batch Issuance
//!
//! - **Credential** (`credential.rs`): issuer, assertion and recipient
//!   records validated at construction, and the unsigned / finalized
//!   Blockcerts v2 documents.
//!
//! - **Proof** (`proof.rs`): the `MerkleProof2017` record and its anchor
//!   metadata (`Chain`, `ChainName`, `SignatureType`).
//!
//! - **Anchor** (`anchor.rs`): the `AnchorHandler` trait through which a
//!   batch root reaches a ledger, plus the `MockchainAnchor`.
//!
//! - **Batch** (`batch.rs`): the `BatchIssuer` state machine and the
//!   `issue_batch` entry point.
//!
//! - **Verify** (`verify.rs`): offline verification of a finalized
//!   credential against its proof.
//!
//! ## Security Invariant
//!
//! Every Merkle leaf is `sha256_digest()` of the `CanonicalBytes` of an
//! unsigned credential. Verification recomputes the leaf the same way, so a
//! single changed byte in any field breaks the proof.
//!
//! ## Crate Policy
//!
//! - Depends on `bcert-core` and `bcert-crypto` internally.
//! - Performs no I/O. Ledger access lives behind `AnchorHandler`.

pub mod anchor;
pub mod batch;
pub mod credential;
pub mod error;
pub mod proof;
pub mod verify;

pub use anchor::{AnchorHandler, MockchainAnchor};
pub use batch::{issue_batch, BatchIssuer, BatchPhase, IssuedBatch};
pub use credential::{
    Assertion, AssertionRecord, FinalizedCredential, Issuer, IssuerRecord, Recipient,
    RecipientRecord, UnsignedCredential,
};
pub use error::{IssueError, ProofError, RecordKind, ValidationError, VerifyError};
pub use proof::{Anchor, Chain, ChainName, MerkleProof2017, ProofStep, SignatureType};
pub use verify::{verify_credential, verify_document};
