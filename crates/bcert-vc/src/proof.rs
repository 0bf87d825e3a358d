//! # MerkleProof2017: Portable Inclusion Proofs
//!
//! The proof record attached to every finalized credential under the
//! `signature` member. A third-party verifier needs nothing but this record
//! and the credential body to recompute the root and look up the anchor:
//!
//! ```json
//! {
//!   "type": ["MerkleProof2017", "Extension"],
//!   "merkleRoot": "<hex root>",
//!   "targetHash": "<hex leaf digest>",
//!   "proof": [{"left": "<hex>"}, {"right": "<hex>"}],
//!   "anchors": [{"sourceId": "<tx id>", "type": "ETHData", "chain": "ethereumMainnet"}]
//! }
//! ```
//!
//! Levels where the leaf's ancestor was promoted without a sibling do not
//! appear in `proof`; they leave the running hash unchanged.

use bcert_core::Sha256Digest;
use bcert_crypto::{node_hash, InclusionProof, PathStep};
use serde::{Deserialize, Serialize};

use crate::error::ProofError;

/// Type tags of every proof record this crate emits.
pub const MERKLE_PROOF_2017_TYPE: [&str; 2] = ["MerkleProof2017", "Extension"];

// ---------------------------------------------------------------------------
// Anchor metadata
// ---------------------------------------------------------------------------

/// How the Merkle root was embedded in the ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    /// Bitcoin `OP_RETURN` output.
    #[serde(rename = "BTCOpReturn")]
    BtcOpReturn,
    /// Ethereum transaction data field.
    #[serde(rename = "ETHData")]
    EthData,
    /// No ledger; local testing only.
    #[serde(rename = "Mock")]
    Mock,
}

/// The ledger (and network) a batch root is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Chain {
    /// Bitcoin main network.
    BitcoinMainnet,
    /// Bitcoin test network.
    BitcoinTestnet,
    /// Bitcoin regression-test network.
    BitcoinRegtest,
    /// Ethereum main network.
    EthereumMainnet,
    /// Ethereum Ropsten test network.
    EthereumRopsten,
    /// Ethereum Goerli test network.
    EthereumGoerli,
    /// No ledger: the anchor id is simulated.
    Mockchain,
}

impl Chain {
    /// The signature type used for anchors on this chain.
    pub fn signature_type(&self) -> SignatureType {
        match self {
            Self::BitcoinMainnet | Self::BitcoinTestnet | Self::BitcoinRegtest => {
                SignatureType::BtcOpReturn
            }
            Self::EthereumMainnet | Self::EthereumRopsten | Self::EthereumGoerli => {
                SignatureType::EthData
            }
            Self::Mockchain => SignatureType::Mock,
        }
    }

    /// The chain name as it appears in proof records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BitcoinMainnet => "bitcoinMainnet",
            Self::BitcoinTestnet => "bitcoinTestnet",
            Self::BitcoinRegtest => "bitcoinRegtest",
            Self::EthereumMainnet => "ethereumMainnet",
            Self::EthereumRopsten => "ethereumRopsten",
            Self::EthereumGoerli => "ethereumGoerli",
            Self::Mockchain => "mockchain",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `chain` member of an anchor as read from a proof record.
///
/// Issuance only ever writes a [`Chain`]. Records produced elsewhere may name
/// networks this crate has no handler for (`bitcoinSignet`, say); those are
/// kept as written so the credential still deserializes and verifies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainName {
    /// A chain this crate can issue on.
    Known(Chain),
    /// Any other chain name.
    Other(String),
}

impl ChainName {
    /// The known chain, if any.
    pub fn known(&self) -> Option<Chain> {
        match self {
            Self::Known(chain) => Some(*chain),
            Self::Other(_) => None,
        }
    }

    /// The chain name as it appears in proof records.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(chain) => chain.as_str(),
            Self::Other(name) => name,
        }
    }
}

impl From<Chain> for ChainName {
    fn from(chain: Chain) -> Self {
        Self::Known(chain)
    }
}

impl PartialEq<Chain> for ChainName {
    fn eq(&self, other: &Chain) -> bool {
        self.known() == Some(*other)
    }
}

impl std::fmt::Display for ChainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how a batch root was anchored. Shared by every proof in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Ledger transaction id returned by the anchor handler.
    #[serde(rename = "sourceId")]
    pub source_id: String,
    /// How the root was embedded.
    #[serde(rename = "type")]
    pub signature_type: SignatureType,
    /// The ledger the transaction lives on.
    pub chain: ChainName,
}

impl Anchor {
    /// Build the anchor block for a transaction on `chain`.
    pub fn new(source_id: impl Into<String>, chain: Chain) -> Self {
        Self {
            source_id: source_id.into(),
            signature_type: chain.signature_type(),
            chain: chain.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Proof record
// ---------------------------------------------------------------------------

/// One sibling on the wire: `{"left": hex}` or `{"right": hex}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStep {
    /// Sibling is hashed on the left of the running value.
    Left(Sha256Digest),
    /// Sibling is hashed on the right of the running value.
    Right(Sha256Digest),
}

impl ProofStep {
    fn apply(&self, current: &Sha256Digest) -> Sha256Digest {
        match self {
            Self::Left(sibling) => node_hash(sibling, current),
            Self::Right(sibling) => node_hash(current, sibling),
        }
    }
}

/// A Blockcerts `MerkleProof2017` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof2017 {
    /// Always `["MerkleProof2017", "Extension"]` for records built here.
    #[serde(rename = "type")]
    pub proof_type: Vec<String>,
    /// The batch root.
    #[serde(rename = "merkleRoot")]
    pub merkle_root: Sha256Digest,
    /// The credential's own leaf digest.
    #[serde(rename = "targetHash")]
    pub target_hash: Sha256Digest,
    /// Siblings from the leaf level upward.
    pub proof: Vec<ProofStep>,
    /// The anchor of the batch root.
    pub anchors: Vec<Anchor>,
}

impl MerkleProof2017 {
    /// Format an inclusion proof for the batch `root` and `anchor`.
    ///
    /// Rejects a proof that does not replay to `root`, which is what an
    /// inclusion proof paired with the wrong batch or index looks like.
    pub fn from_inclusion(
        inclusion: &InclusionProof,
        root: &Sha256Digest,
        anchor: &Anchor,
    ) -> Result<Self, ProofError> {
        let computed = inclusion.compute_root();
        if computed != *root {
            return Err(ProofError::RootMismatch {
                leaf_index: inclusion.leaf_index,
                expected: *root,
                computed,
            });
        }

        let proof = inclusion
            .path
            .iter()
            .filter_map(|step| match step {
                PathStep::Left(d) => Some(ProofStep::Left(*d)),
                PathStep::Right(d) => Some(ProofStep::Right(*d)),
                PathStep::PassThrough => None,
            })
            .collect();

        Ok(Self {
            proof_type: MERKLE_PROOF_2017_TYPE.iter().map(|s| s.to_string()).collect(),
            merkle_root: *root,
            target_hash: inclusion.target,
            proof,
            anchors: vec![anchor.clone()],
        })
    }

    /// Recompute the root from `targetHash` and the sibling path.
    pub fn compute_root(&self) -> Sha256Digest {
        self.proof
            .iter()
            .fold(self.target_hash, |current, step| step.apply(&current))
    }

    /// Whether the sibling path leads from `targetHash` to `merkleRoot`.
    pub fn verify(&self) -> bool {
        self.compute_root() == self.merkle_root
    }

    /// The first (and, for records built here, only) anchor.
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchors.first()
    }
}
