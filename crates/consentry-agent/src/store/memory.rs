use super::RecordStore;
use async_trait::async_trait;
use consentry_types::{AgentResult, ConsentDocument};

/// In-memory record store backing tests.
pub struct MemoryRecordStore {
    records: Vec<ConsentDocument>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<ConsentDocument>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self) -> AgentResult<Vec<ConsentDocument>> {
        Ok(self.records.clone())
    }
}
