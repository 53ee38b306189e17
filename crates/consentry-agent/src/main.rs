mod cli;

use clap::Parser;
use cli::{
    handle_config, init_logging, inspect_transaction, run_checks, run_enroll, run_sync,
    show_version, Cli, Commands,
};
use consentry_types::AgentResult;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> AgentResult<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    let config_path = cli.config.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".consentry").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("consentry.toml"))
    });

    match cli.command {
        Commands::Sync { records } => {
            run_sync(&config_path, records).await?;
        }
        Commands::Enroll { records } => {
            run_enroll(&config_path, records).await?;
        }
        Commands::Inspect { tx_hash } => {
            inspect_transaction(&config_path, &tx_hash).await?;
        }
        Commands::Check => {
            run_checks(&config_path).await?;
        }
        Commands::Config { action } => {
            handle_config(&config_path, action)?;
        }
        Commands::Version => {
            show_version();
        }
    }

    Ok(())
}
