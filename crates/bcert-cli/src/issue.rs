//! # Issue Subcommand
//!
//! Reads a batch file, issues it through the mockchain anchor, and writes
//! one `<credential-uuid>.json` per recipient into the output directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use bcert_vc::{BatchIssuer, Chain, IssuedBatch, MockchainAnchor};

use crate::batch_file::BatchFile;
use crate::timestamp_or_now;

/// Arguments for `bcert issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Path to the YAML batch file.
    #[arg(long)]
    pub batch: PathBuf,

    /// Directory the finalized credentials are written to. Created if missing.
    #[arg(long)]
    pub out: PathBuf,

    /// Issuance time (RFC 3339, UTC, e.g. 2026-06-30T12:00:00Z). Defaults to now.
    #[arg(long)]
    pub issued_on: Option<String>,
}

/// Execute the issue subcommand.
pub fn run_issue(args: &IssueArgs) -> Result<u8> {
    let batch = BatchFile::load(&args.batch)?;
    if batch.chain != Chain::Mockchain {
        bail!(
            "no anchor handler available for chain '{}': the CLI only anchors on mockchain",
            batch.chain
        );
    }
    let issued_on = timestamp_or_now(args.issued_on.as_deref())?;

    let mut issuer =
        BatchIssuer::from_records(batch.issuer, batch.assertion, batch.recipients, issued_on)
            .with_context(|| format!("invalid batch file: {}", args.batch.display()))?;
    tracing::info!(recipients = issuer.recipient_count(), issued_on = %issued_on, "issuing batch");

    let mut anchor = MockchainAnchor::new();
    let issued = issuer.run(&mut anchor).context("batch issuance failed")?;
    let written = write_credentials(&issued, &args.out)?;

    println!("  chain:        {}", issued.chain);
    println!("  anchor id:    {}", issued.anchor_id);
    println!("  merkle root:  {}", issued.merkle_root);
    println!("  credentials:  {} written to {}", written.len(), args.out.display());
    Ok(0)
}

/// Write each finalized credential as pretty JSON named after its UUID.
///
/// Files are first written into a hidden staging directory next to their
/// destination and only renamed into `out` once every one of them has been
/// written, so a failure part-way leaves no credential files behind. A
/// missing `out` is created by renaming the staging directory itself.
///
/// Returns the written paths in recipient-identity order.
pub fn write_credentials(issued: &IssuedBatch, out: &Path) -> Result<Vec<PathBuf>> {
    let out_exists = out.is_dir();
    let staging_parent = if out_exists {
        out.to_path_buf()
    } else {
        let parent = match out.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
        parent
    };
    let staging = tempfile::Builder::new()
        .prefix(".bcert-")
        .tempdir_in(&staging_parent)
        .with_context(|| {
            format!("failed to create staging directory in {}", staging_parent.display())
        })?;

    let mut names = Vec::with_capacity(issued.len());
    for credential in issued.credentials.values() {
        let name = format!("{}.json", credential.unsigned().id.as_uuid());
        let path = staging.path().join(&name);
        let mut json = serde_json::to_string_pretty(credential)
            .context("failed to serialize credential")?;
        json.push('\n');
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write credential: {}", path.display()))?;
        names.push(name);
    }

    if !out_exists {
        std::fs::rename(staging.path(), out)
            .with_context(|| format!("failed to create output directory: {}", out.display()))?;
    }

    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let path = out.join(&name);
        if out_exists {
            std::fs::rename(staging.path().join(&name), &path)
                .with_context(|| format!("failed to write credential: {}", path.display()))?;
        }
        tracing::debug!(path = %path.display(), "credential written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

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
recipients:
  - name: Ada Lovelace
    identity: ada@example.org
    public_key: ecdsa-koblitz-pubkey:0x11aa
  - name: Grace Hopper
    identity: grace@example.org
    public_key: ecdsa-koblitz-pubkey:0x22bb
  - name: Alan Turing
    identity: alan@example.org
    public_key: ecdsa-koblitz-pubkey:0x33cc
"#;

    fn args(dir: &Path, batch: &str) -> IssueArgs {
        let batch_path = dir.join("batch.yaml");
        std::fs::write(&batch_path, batch).unwrap();
        IssueArgs {
            batch: batch_path,
            out: dir.join("out"),
            issued_on: Some("2026-06-30T12:00:00Z".into()),
        }
    }

    #[test]
    fn issue_writes_one_file_per_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), BATCH);
        assert_eq!(run_issue(&args).unwrap(), 0);

        let files: Vec<_> = std::fs::read_dir(&args.out).unwrap().collect();
        assert_eq!(files.len(), 3);
        for entry in files {
            let path = entry.unwrap().path();
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
            let text = std::fs::read_to_string(&path).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["issuedOn"], "2026-06-30T12:00:00Z");
            assert_eq!(value["signature"]["anchors"][0]["chain"], "mockchain");
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn issue_creates_nested_out_dir_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), BATCH);
        args.out = dir.path().join("runs").join("2026");
        assert_eq!(run_issue(&args).unwrap(), 0);

        assert_eq!(entries(&args.out).len(), 3);
        assert_eq!(entries(&dir.path().join("runs")), vec!["2026".to_string()]);
    }

    #[test]
    fn issue_into_existing_dir_keeps_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), BATCH);
        std::fs::create_dir(&args.out).unwrap();
        std::fs::write(args.out.join("README"), "earlier batch").unwrap();
        assert_eq!(run_issue(&args).unwrap(), 0);

        let names = entries(&args.out);
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"README".to_string()));
        assert!(names.iter().all(|n| !n.starts_with(".bcert-")));
    }

    #[test]
    fn write_failure_leaves_no_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output's parent should be.
        std::fs::write(dir.path().join("blocked"), "").unwrap();
        let mut args = args(dir.path(), BATCH);
        args.out = dir.path().join("blocked").join("out");
        assert!(run_issue(&args).is_err());
        assert!(!args.out.exists());
        assert!(entries(dir.path()).iter().all(|n| !n.starts_with(".bcert-")));
    }

    #[test]
    fn issue_rejects_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BATCH.replace("  email: registrar@example.org\n", "");
        let err = run_issue(&args(dir.path(), &batch)).unwrap_err();
        assert!(format!("{err:#}").contains("missing required field `email` on issuer record"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn issue_rejects_unsupported_chain() {
        let dir = tempfile::tempdir().unwrap();
        let batch = format!("chain: bitcoinMainnet\n{BATCH}");
        let err = run_issue(&args(dir.path(), &batch)).unwrap_err();
        assert!(err.to_string().contains("bitcoinMainnet"));
    }

    #[test]
    fn issue_rejects_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BATCH.split("recipients:").next().unwrap().to_string();
        let err = run_issue(&args(dir.path(), &batch)).unwrap_err();
        assert!(format!("{err:#}").contains("empty batch"));
    }
}
