use consentry_types::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use super::logging::LoggingConfig;

/// Process-wide configuration, loaded once at startup and immutable for
/// the run. No component reads connection state from globals; everything
/// flows in through constructors.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub ledger: LedgerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub identity_address: String,
    pub consent_address: String,
    /// Gas limit ceiling applied to every state-changing call.
    pub gas_limit: u64,
    /// Fixed gas price in gwei. When absent the node's suggested price is
    /// queried immediately before each submission.
    pub gas_price_gwei: Option<u64>,
    /// Bound on the receipt wait. Expiry yields a TimedOut outcome.
    pub receipt_timeout_secs: u64,
    /// Bound on read-only contract calls.
    pub call_timeout_secs: u64,
    /// Optional file holding the sender's private key. The
    /// CONSENTRY_PRIVATE_KEY environment variable takes precedence.
    pub credential_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON document file holding the consent records.
    pub records_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            identity_address: String::new(),
            consent_address: String::new(),
            gas_limit: 3_000_000,
            gas_price_gwei: None,
            receipt_timeout_secs: 90,
            call_timeout_secs: 15,
            credential_file: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("records.json"),
        }
    }
}

impl AgentConfig {
    pub fn load(path: impl AsRef<std::path::Path>) -> AgentResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| AgentError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| AgentError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> AgentResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AgentError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AgentError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| AgentError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CONSENTRY_RPC_URL") {
            self.ledger.rpc_url = url;
        }

        if let Ok(chain_id) = std::env::var("CONSENTRY_CHAIN_ID") {
            if let Ok(id) = chain_id.parse() {
                self.ledger.chain_id = id;
            }
        }

        if let Ok(addr) = std::env::var("CONSENTRY_IDENTITY_ADDRESS") {
            self.ledger.identity_address = addr;
        }

        if let Ok(addr) = std::env::var("CONSENTRY_CONSENT_ADDRESS") {
            self.ledger.consent_address = addr;
        }

        if let Ok(path) = std::env::var("CONSENTRY_RECORDS") {
            self.store.records_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.ledger.rpc_url.is_empty() {
            return Err(AgentError::Config("Ledger RPC URL is empty".into()));
        }

        if !self.ledger.rpc_url.starts_with("http://") && !self.ledger.rpc_url.starts_with("https://")
        {
            return Err(AgentError::Config(format!(
                "Ledger RPC URL must be http(s): {}",
                self.ledger.rpc_url
            )));
        }

        validate_address("identity registry", &self.ledger.identity_address)?;
        validate_address("consent registry", &self.ledger.consent_address)?;

        if self.ledger.gas_limit == 0 {
            return Err(AgentError::Config("Gas limit must be nonzero".into()));
        }

        if self.ledger.receipt_timeout_secs == 0 || self.ledger.call_timeout_secs == 0 {
            return Err(AgentError::Config(
                "Ledger timeouts must be nonzero; unbounded waits are not supported".into(),
            ));
        }

        if self.store.records_path.as_os_str().is_empty() {
            return Err(AgentError::Config("Records path is empty".into()));
        }

        Ok(())
    }
}

/// Contract addresses may be left empty in a freshly-initialized config;
/// a non-empty value must be a 20-byte hex address.
fn validate_address(label: &str, value: &str) -> AgentResult<()> {
    if value.is_empty() {
        return Ok(());
    }

    let hex_part = value.strip_prefix("0x").unwrap_or(value);
    let decoded = hex::decode(hex_part)
        .map_err(|e| AgentError::Config(format!("Invalid {} address: {}", label, e)))?;
    if decoded.len() != 20 {
        return Err(AgentError::Config(format!(
            "Invalid {} address length: {}",
            label, value
        )));
    }
    Ok(())
}
