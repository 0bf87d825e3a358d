//! # Credential Verification
//!
//! Offline checks of a finalized credential against its own proof. Ledger
//! lookups of the anchor transaction are out of scope: a credential that
//! passes here is internally consistent and commits to the root named in
//! its anchor.
//!
//! Credentials read from disk go through [`verify_document`], which hashes
//! the JSON exactly as received. Typed deserialization drops unknown
//! members, so hashing the re-serialized struct would not cover them.

use bcert_core::{CanonicalBytes, Sha256Digest, Timestamp};
use bcert_crypto::sha256_digest;
use serde_json::Value;

use crate::credential::FinalizedCredential;
use crate::error::VerifyError;

/// Verify a finalized credential held in memory.
///
/// Checks, in order:
///
/// 1. The digest of the canonical unsigned document equals `targetHash`.
/// 2. The proof path replays from `targetHash` to `merkleRoot`.
/// 3. The proof names at least one anchor.
/// 4. When both `expires` and `at` are present, `at` is not after `expires`.
pub fn verify_credential(
    credential: &FinalizedCredential,
    at: Option<&Timestamp>,
) -> Result<(), VerifyError> {
    let leaf = sha256_digest(&credential.unsigned().canonical_bytes()?);
    check(credential, leaf, at)
}

/// Verify a credential given as raw JSON and return its typed form.
///
/// The leaf is computed from `document` minus its `signature` member, so
/// every member present in the input, known or not, must be covered by
/// `targetHash`. The remaining checks match [`verify_credential`].
pub fn verify_document(
    document: &Value,
    at: Option<&Timestamp>,
) -> Result<FinalizedCredential, VerifyError> {
    let credential: FinalizedCredential =
        serde_json::from_value(document.clone()).map_err(VerifyError::Malformed)?;

    let mut body = document.clone();
    if let Value::Object(members) = &mut body {
        members.remove("signature");
    }
    let leaf = sha256_digest(&CanonicalBytes::new(&body)?);

    check(&credential, leaf, at)?;
    Ok(credential)
}

fn check(
    credential: &FinalizedCredential,
    leaf: Sha256Digest,
    at: Option<&Timestamp>,
) -> Result<(), VerifyError> {
    let proof = credential.proof();

    if leaf != proof.target_hash {
        return Err(VerifyError::TargetHashMismatch {
            expected: proof.target_hash,
            computed: leaf,
        });
    }

    let computed = proof.compute_root();
    if computed != proof.merkle_root {
        return Err(VerifyError::MerkleRootMismatch {
            expected: proof.merkle_root,
            computed,
        });
    }

    if proof.anchor().is_none() {
        return Err(VerifyError::MissingAnchor);
    }

    if let (Some(expires), Some(at)) = (&credential.unsigned().expires, at) {
        let deadline =
            Timestamp::parse_lenient(expires).map_err(|e| VerifyError::InvalidExpires {
                value: expires.clone(),
                reason: e.to_string(),
            })?;
        if *at > deadline {
            return Err(VerifyError::Expired {
                expires: expires.clone(),
            });
        }
    }

    Ok(())
}
