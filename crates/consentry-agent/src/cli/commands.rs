use clap::{Parser, Subcommand};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "consentry")]
#[command(version = BUILD_VERSION)]
#[command(author = "Consentry <team@consentry.dev>")]
#[command(about = "Consentry Agent - On-chain consent synchronization")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Synchronize consent records on-chain")]
    #[command(long_about = "Read consent records from the document store, resolve each record's on-chain identifier, and submit one consent commitment per record.\n\nRecords are processed sequentially; a failing record never stops the run.")]
    Sync {
        #[arg(long, value_name = "FILE", help = "JSON records file (overrides config)")]
        records: Option<PathBuf>,
    },

    #[command(about = "Enroll records that have no on-chain identifier")]
    #[command(long_about = "For each record without an on-chain identifier, ask the identity registry to allocate one, then record the profile digest and bind the natural-person identifier.")]
    Enroll {
        #[arg(long, value_name = "FILE", help = "JSON records file (overrides config)")]
        records: Option<PathBuf>,
    },

    #[command(about = "Inspect a submitted transaction")]
    Inspect {
        #[arg(help = "Transaction hash (0x...)")]
        tx_hash: String,
    },

    #[command(about = "Run preflight checks")]
    Check,

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    #[command(about = "Show version information")]
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,
    #[command(about = "Validate configuration")]
    Validate,
    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(short, long, help = "Overwrite existing configuration")]
        force: bool,
    },
}
