use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lpl",
    about = "Loyalty Points Ledger: contracts, member transactions and point accrual",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the operations the ledger exposes
    Ops,
    /// Execute an invocation script against a fresh in-memory world state
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON-lines file, one `{"op": ..., "args": [...]}` per line
    pub script: PathBuf,
    /// TOML ledger configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Pin the invocation timestamp (RFC 3339) instead of using the clock
    #[arg(long)]
    pub timestamp: Option<DateTime<Utc>>,
}
