use consentry_agent::{AgentConfig, ContractConfig, LedgerClient};
use consentry_types::{AgentResult, DomainEvent, TxHash};
use std::path::Path;

pub async fn inspect_transaction(config_path: &Path, tx_hash: &str) -> AgentResult<()> {
    let config = AgentConfig::load(config_path)?;
    let contract_config = ContractConfig::from_ledger(&config.ledger)?;

    let mut client = LedgerClient::new(contract_config);
    client.connect().await?;

    let hash = TxHash::from_hex(tx_hash)?;
    let details = client.transaction_details(&hash).await?;

    println!("Block Number: {}", details.block_number);
    println!("Block Hash: {}", details.block_hash);
    println!("Timestamp: {}", details.timestamp);
    println!("Miner: {}", details.miner);
    println!("Transaction Count in Block: {}", details.block_tx_count);
    println!("Transaction Hash: {}", details.tx_hash);
    println!("From: {}", details.from);
    println!(
        "To: {}",
        details.to.as_deref().unwrap_or("<contract creation>")
    );
    println!("Gas Used: {}", details.gas_used);
    println!(
        "Status: {}",
        if details.succeeded { "success" } else { "failed" }
    );

    for event in &details.events {
        let DomainEvent::IdentifierAssigned {
            account,
            patient_id,
        } = event;
        println!("Event: PatientIdAssigned");
        println!("  User: {}", account);
        println!("  Patient ID: {}", patient_id);
    }

    Ok(())
}
