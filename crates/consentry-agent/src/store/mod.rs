mod json;
mod memory;

pub use json::JsonRecordStore;
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use consentry_types::{AgentResult, ConsentDocument};

/// Read-only view over a collection of consent records. The document
/// database itself is an external collaborator; this seam is the whole of
/// its surface and no writes ever go through it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self) -> AgentResult<Vec<ConsentDocument>>;
}
