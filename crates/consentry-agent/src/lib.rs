#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod contracts;
pub mod registry;
pub mod store;
pub mod sync;

pub use config::{AgentConfig, LedgerConfig, LoggingConfig, SenderCredential, StoreConfig};
pub use contracts::{ContractConfig, LedgerClient, TransactionDetails};
pub use registry::{ConsentRegistry, IdentityRegistry};
pub use store::{JsonRecordStore, MemoryRecordStore, RecordStore};
pub use sync::{assemble, EnrollEngine, RecordStatus, RunReport, SyncEngine};
