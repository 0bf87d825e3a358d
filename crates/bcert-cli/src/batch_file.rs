//! # Batch Files
//!
//! A batch file is YAML with one issuer, one assertion and a list of
//! recipients. Field names match the raw records in `bcert-vc`:
//!
//! ```yaml
//! chain: mockchain
//! issuer:
//!   id: https://issuer.example.org/profile.json
//!   name: Example University
//!   email: registrar@example.org
//!   url: https://issuer.example.org
//!   public_key: ecdsa-koblitz-pubkey:0x7e30...
//! assertion:
//!   id: urn:uuid:0b6d5a0e-7c1a-4b3f-9e53-1c2d3e4f5a6b
//!   name: Master of Rust
//!   description: Awarded for ownership and borrowing.
//!   criteria_narrative: Complete the systems curriculum.
//! recipients:
//!   - name: Ada Lovelace
//!     identity: ada@example.org
//!     public_key: ecdsa-koblitz-pubkey:0x11aa
//! ```
//!
//! Required-field checks happen later, when the records are converted by
//! `BatchIssuer::from_records`.

use std::path::Path;

use anyhow::{Context, Result};
use bcert_vc::{AssertionRecord, Chain, IssuerRecord, RecipientRecord};
use serde::Deserialize;

/// The parsed contents of a batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    /// Ledger to anchor on. Defaults to the mockchain.
    #[serde(default = "default_chain")]
    pub chain: Chain,
    pub issuer: IssuerRecord,
    pub assertion: AssertionRecord,
    #[serde(default)]
    pub recipients: Vec<RecipientRecord>,
}

fn default_chain() -> Chain {
    Chain::Mockchain
}

impl BatchFile {
    /// Parse a batch file from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse batch file")
    }

    /// Read and parse a batch file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read batch file: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }
}
