//! # bcert CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bcert_cli::issue::{run_issue, IssueArgs};
use bcert_cli::verify::{run_verify, VerifyArgs};

/// Blockcerts batch issuance.
///
/// Issues a batch of credentials under a single anchored Merkle root and
/// verifies finalized credentials offline.
#[derive(Parser, Debug)]
#[command(name = "bcert", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a batch described by a YAML batch file.
    Issue(IssueArgs),

    /// Verify finalized credential files.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Issue(args) => run_issue(&args),
        Commands::Verify(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
