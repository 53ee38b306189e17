use consentry_agent::{
    AgentConfig, ContractConfig, EnrollEngine, JsonRecordStore, LedgerClient, RecordStatus,
    RecordStore, RunReport, SenderCredential, SyncEngine,
};
use consentry_types::AgentResult;
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run_sync(config_path: &Path, records_override: Option<PathBuf>) -> AgentResult<()> {
    info!("Starting consent synchronization v{}", env!("CARGO_PKG_VERSION"));

    let (config, client) = connect_with_signer(config_path).await?;
    let records = load_records(&config, records_override).await?;

    let engine = SyncEngine::new(&client, &client);
    let report = engine.run(&records).await;

    print_report("Synchronization", &report);
    Ok(())
}

pub async fn run_enroll(config_path: &Path, records_override: Option<PathBuf>) -> AgentResult<()> {
    info!("Starting enrollment v{}", env!("CARGO_PKG_VERSION"));

    let (config, client) = connect_with_signer(config_path).await?;
    let records = load_records(&config, records_override).await?;

    let engine = EnrollEngine::new(&client);
    let report = engine.run(&records).await;

    print_report("Enrollment", &report);
    Ok(())
}

/// Configuration, credential and connectivity problems all surface here,
/// before any record is touched. The credential is dropped (and zeroed)
/// as soon as the signing middleware holds its key.
async fn connect_with_signer(config_path: &Path) -> AgentResult<(AgentConfig, LedgerClient)> {
    let config = AgentConfig::load(config_path)?;

    let credential = SenderCredential::load(&config.ledger)?;
    let contract_config = ContractConfig::from_ledger(&config.ledger)?;

    let mut client = LedgerClient::new(contract_config);
    client.connect().await?;
    client.set_signer(&credential)?;

    Ok((config, client))
}

async fn load_records(
    config: &AgentConfig,
    records_override: Option<PathBuf>,
) -> AgentResult<Vec<consentry_types::ConsentDocument>> {
    let path = records_override.unwrap_or_else(|| config.store.records_path.clone());
    let store = JsonRecordStore::new(path);
    store.load().await
}

fn print_report(label: &str, report: &RunReport) {
    println!();
    println!("{} report", label);
    println!("{}", "─".repeat(50));

    for entry in &report.entries {
        let id = entry.natural_id.as_deref().unwrap_or("<no natural id>");
        match &entry.status {
            RecordStatus::Skipped(reason) => {
                println!("  [{:>3}] {} - skipped: {}", entry.index, id, reason);
            }
            RecordStatus::Confirmed {
                patient_id,
                tx_hash,
            } => {
                println!(
                    "  [{:>3}] {} - consents confirmed for {} ({})",
                    entry.index, id, patient_id, tx_hash
                );
            }
            RecordStatus::Enrolled {
                patient_id,
                tx_hash,
            } => {
                println!(
                    "  [{:>3}] {} - enrolled as {} ({})",
                    entry.index, id, patient_id, tx_hash
                );
            }
            RecordStatus::Failed { kind, reason } => {
                println!(
                    "  [{:>3}] {} - failed [{}]: {}",
                    entry.index,
                    id,
                    kind.tag(),
                    reason
                );
            }
        }
    }

    println!(
        "{} records: {} confirmed, {} skipped, {} failed",
        report.processed(),
        report.confirmed(),
        report.skipped(),
        report.failed()
    );
}
