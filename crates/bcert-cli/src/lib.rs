//! # bcert-cli: Blockcerts Command-Line Interface
//!
//! ## Subcommands
//!
//! - `issue`: Issue a batch described by a YAML batch file.
//! - `verify`: Verify finalized credential files.
//!
//! ```bash
//! bcert issue --batch graduates.yaml --out certs/ --issued-on 2026-06-30T12:00:00Z
//! bcert verify certs/*.json
//! ```
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `bcert-vc`; they only do file I/O and
//!   printing.
//! - Handlers return the process exit code; errors carry `anyhow` context.

pub mod batch_file;
pub mod issue;
pub mod verify;

use anyhow::{Context, Result};
use bcert_core::Timestamp;

/// Parse an optional RFC 3339 UTC timestamp argument, defaulting to now.
pub fn timestamp_or_now(value: Option<&str>) -> Result<Timestamp> {
    match value {
        Some(s) => Timestamp::parse(s).with_context(|| format!("invalid timestamp '{s}'")),
        None => Ok(Timestamp::now()),
    }
}
