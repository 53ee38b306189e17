use crate::config::LedgerConfig;
use consentry_types::{AgentError, AgentResult};
use ethers::types::{Address, U256};
use std::time::Duration;

/// Typed ledger configuration handed to [`super::LedgerClient`]. Built
/// once from the loaded [`LedgerConfig`]; no connection state lives in
/// globals.
#[derive(Clone, Debug)]
pub struct ContractConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub identity_address: Address,
    pub consent_address: Address,
    pub gas_limit: U256,
    pub gas_price: Option<U256>,
    pub receipt_timeout: Duration,
    pub call_timeout: Duration,
}

const WEI_PER_GWEI: u64 = 1_000_000_000;

impl ContractConfig {
    pub fn from_ledger(config: &LedgerConfig) -> AgentResult<Self> {
        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            identity_address: parse_address("identity registry", &config.identity_address)?,
            consent_address: parse_address("consent registry", &config.consent_address)?,
            gas_limit: U256::from(config.gas_limit),
            gas_price: config
                .gas_price_gwei
                .map(|gwei| U256::from(gwei) * U256::from(WEI_PER_GWEI)),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        })
    }
}

fn parse_address(label: &str, value: &str) -> AgentResult<Address> {
    if value.is_empty() {
        return Err(AgentError::Config(format!(
            "No {} address configured",
            label
        )));
    }

    value
        .parse()
        .map_err(|e| AgentError::Config(format!("Invalid {} address: {}", label, e)))
}
