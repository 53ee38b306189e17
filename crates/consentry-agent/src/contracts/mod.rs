mod bindings;
mod client;
mod config;

pub use bindings::{ConsentManagement, UserIdentity};
pub use client::{LedgerClient, TransactionDetails};
pub use config::ContractConfig;
