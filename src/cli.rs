use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::resolution::domain::{severity::parse_threshold, CollectionName, Severity};

/// Severity gate given on the command line. `none` disables gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(pub Option<Severity>);

impl std::str::FromStr for Threshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_threshold(s).map(Threshold)
    }
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid concurrency: {}", s)),
    }
}

/// Resolve inventoried components to known vulnerabilities and gate the result
#[derive(Parser, Debug)]
#[command(name = "vulngate")]
#[command(version)]
#[command(
    about = "Resolve inventoried components to known vulnerabilities and gate the result",
    long_about = None
)]
pub struct Args {
    /// Path to a YAML config file (defaults to $VULNGATE_CONFIG or ~/.vulngate/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Resolve against the local cache only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format: compact or json
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a component inventory and print findings as JSON
    Scan(ScanArgs),
    /// Manage the local bulletin cache
    Offline {
        #[command(subcommand)]
        command: OfflineCommand,
    },
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// JSON inventory of components to resolve
    #[arg(short, long, value_name = "FILE")]
    pub components: PathBuf,

    /// JSON findings produced by another scanner, enriched and merged in
    #[arg(long, value_name = "FILE")]
    pub findings: Option<PathBuf>,

    /// Exit with 1 when a finding is at or above this severity
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Threshold>,

    /// Vulnerability id to drop from the results.
    /// Can be specified multiple times: --ignore CVE-2024-1 --ignore GHSA-xxxx
    #[arg(long = "ignore", value_name = "ID")]
    pub ignore: Vec<String>,

    /// OpenVEX document with suppression statements
    #[arg(long, value_name = "FILE")]
    pub vex: Option<PathBuf>,

    /// Number of concurrent lookups
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Backfill missing AI scores for findings
    #[arg(long)]
    pub ai_score: bool,
}

#[derive(Subcommand, Debug)]
pub enum OfflineCommand {
    /// Download collections into the local cache
    Sync(SyncArgs),
    /// Show cached collections and when they were last synced
    Status,
    /// Remove every cached bulletin
    Purge,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Collections to sync, comma separated (e.g. cve,exploit)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub collections: Vec<CollectionName>,

    /// Always download full archives instead of updates
    #[arg(long)]
    pub full: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
