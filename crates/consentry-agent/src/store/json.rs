use super::RecordStore;
use async_trait::async_trait;
use consentry_types::{AgentError, AgentResult, ConsentDocument, CONSENT_SLOT_COUNT};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

const NATURAL_ID_FIELD: &str = "Social Security Number";
const NAME_FIELD: &str = "Name";

/// Record store backed by a JSON export of the patient collection: one
/// top-level array, one object per record, consent slots under `C1`..`C18`.
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_document(value: &Value) -> ConsentDocument {
        let name = field_string(value, NAME_FIELD);
        let natural_id = field_string(value, NATURAL_ID_FIELD);

        let slots = (1..=CONSENT_SLOT_COUNT)
            .map(|i| field_string(value, &format!("C{}", i)))
            .collect();

        ConsentDocument::new(name, natural_id, slots)
    }
}

/// Missing fields and non-string values both read as absent; the store
/// does not reject malformed records, it lets the skip rules handle them.
fn field_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn load(&self) -> AgentResult<Vec<ConsentDocument>> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| AgentError::Store(format!("Failed to read {:?}: {}", self.path, e)))?;

        let parsed: Value = serde_json::from_str(&contents)
            .map_err(|e| AgentError::Store(format!("Failed to parse {:?}: {}", self.path, e)))?;

        let items = parsed
            .as_array()
            .ok_or_else(|| AgentError::Store("Records file must hold a JSON array".into()))?;

        let documents: Vec<ConsentDocument> = items.iter().map(Self::parse_document).collect();

        info!("Loaded {} records from {:?}", documents.len(), self.path);
        Ok(documents)
    }
}
