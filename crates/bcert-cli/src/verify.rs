//! # Verify Subcommand
//!
//! Checks finalized credential files offline: leaf digest, proof path, and
//! anchor presence, plus expiry relative to `--at`. The leaf is recomputed
//! from the file's JSON as read, so members unknown to this crate are still
//! covered. Anchor transactions are not looked up on any ledger.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use bcert_core::Timestamp;
use bcert_vc::verify_document;

use crate::timestamp_or_now;

/// Arguments for `bcert verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Finalized credential JSON files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Time to check expiry against (RFC 3339, UTC). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Execute the verify subcommand. Returns 1 if any credential fails.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let at = timestamp_or_now(args.at.as_deref())?;
    let mut failures = 0usize;

    for path in &args.files {
        match verify_file(path, &at) {
            Ok(()) => println!("  OK    {}", path.display()),
            Err(e) => {
                failures += 1;
                println!("  FAIL  {}: {e:#}", path.display());
            }
        }
    }

    println!();
    println!("{} verified, {} failed", args.files.len() - failures, failures);
    Ok(if failures == 0 { 0 } else { 1 })
}

/// Load and verify one credential file.
pub fn verify_file(path: &Path, at: &Timestamp) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&text).context("not valid JSON")?;
    let credential = verify_document(&document, Some(at))?;
    tracing::debug!(
        id = %credential.unsigned().id,
        root = %credential.proof().merkle_root,
        "credential verified"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{run_issue, IssueArgs};

    const BATCH: &str = r#"
issuer:
  id: https://issuer.example.org/profile.json
  name: Example University
  email: registrar@example.org
  url: https://issuer.example.org
  public_key: ecdsa-koblitz-pubkey:0x7e30
assertion:
  id: urn:badge:1
  name: Badge
  description: A badge.
  criteria_narrative: Earn it.
  expires: 2030-01-01T00:00:00Z
recipients:
  - name: Ada Lovelace
    identity: ada@example.org
    public_key: ecdsa-koblitz-pubkey:0x11aa
  - name: Grace Hopper
    identity: grace@example.org
    public_key: ecdsa-koblitz-pubkey:0x22bb
"#;

    fn issue_into(dir: &Path) -> Vec<PathBuf> {
        let batch_path = dir.join("batch.yaml");
        std::fs::write(&batch_path, BATCH).unwrap();
        let out = dir.join("out");
        run_issue(&IssueArgs {
            batch: batch_path,
            out: out.clone(),
            issued_on: Some("2026-06-30T12:00:00Z".into()),
        })
        .unwrap();
        let mut files: Vec<_> = std::fs::read_dir(out)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    fn at(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn issued_files_verify() {
        let dir = tempfile::tempdir().unwrap();
        let files = issue_into(dir.path());
        let code = run_verify(&VerifyArgs {
            files,
            at: at("2027-01-01T00:00:00Z"),
        })
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn tampered_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let files = issue_into(dir.path());
        let text = std::fs::read_to_string(&files[0]).unwrap();
        let tampered = text.replace("A badge.", "A better badge.");
        assert_ne!(text, tampered);
        std::fs::write(&files[0], tampered).unwrap();

        let code = run_verify(&VerifyArgs {
            files,
            at: at("2027-01-01T00:00:00Z"),
        })
        .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn expired_credential_fails() {
        let dir = tempfile::tempdir().unwrap();
        let files = issue_into(dir.path());
        let err = verify_file(&files[0], &Timestamp::parse("2031-01-01T00:00:00Z").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn injected_member_fails() {
        let dir = tempfile::tempdir().unwrap();
        let files = issue_into(dir.path());
        let text = std::fs::read_to_string(&files[1]).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["evidence"] = serde_json::json!("summa cum laude");
        std::fs::write(&files[1], serde_json::to_string_pretty(&value).unwrap()).unwrap();

        let err = verify_file(&files[1], &Timestamp::parse("2027-01-01T00:00:00Z").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("does not match targetHash"));
        verify_file(&files[0], &Timestamp::parse("2027-01-01T00:00:00Z").unwrap()).unwrap();
    }

    #[test]
    fn invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"hello\":").unwrap();
        let err = verify_file(&path, &Timestamp::now()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn non_credential_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.json");
        std::fs::write(&path, "{\"hello\": \"world\"}").unwrap();
        let err = verify_file(&path, &Timestamp::now()).unwrap_err();
        assert!(err.to_string().contains("not a finalized Blockcerts credential"));
    }
}
