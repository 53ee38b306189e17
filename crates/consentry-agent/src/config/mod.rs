mod agent;
mod credential;
mod logging;
mod types;

pub use agent::{AgentConfig, LedgerConfig, StoreConfig};
pub use credential::SenderCredential;
pub use logging::LoggingConfig;
pub use types::LogLevel;
