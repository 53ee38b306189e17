use crate::consent::PatientId;
use crate::error::{AgentError, AgentResult};
use crate::TX_HASH_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; TX_HASH_SIZE]);

impl TxHash {
    pub fn from_bytes(bytes: [u8; TX_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> AgentResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AgentError::Serialization(e.to_string()))?;
        if bytes.len() != TX_HASH_SIZE {
            return Err(AgentError::Serialization(
                "Invalid transaction hash length".into(),
            ));
        }
        let mut arr = [0u8; TX_HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Result of a read-only identifier lookup. NotFound is an expected
/// outcome, not an error; transport failures surface as `AgentError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Found(PatientId),
    NotFound,
}

/// Lifecycle of a single submission. Built and Signed are local, Submitted
/// means accepted into the pending pool, the rest are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
    TimedOut,
}

/// Typed payload decoded from a receipt log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    IdentifierAssigned { account: String, patient_id: String },
}

/// Terminal outcome of one state-changing call. Ephemeral: logged,
/// reported, then discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionOutcome {
    Confirmed {
        tx_hash: TxHash,
        block_number: u64,
        gas_used: u64,
        events: Vec<DomainEvent>,
    },
    Failed {
        tx_hash: TxHash,
        reason: String,
    },
    TimedOut {
        tx_hash: TxHash,
        waited_secs: u64,
    },
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed { .. })
    }

    pub fn tx_hash(&self) -> &TxHash {
        match self {
            TransactionOutcome::Confirmed { tx_hash, .. }
            | TransactionOutcome::Failed { tx_hash, .. }
            | TransactionOutcome::TimedOut { tx_hash, .. } => tx_hash,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        match self {
            TransactionOutcome::Confirmed { .. } => SubmissionStatus::Confirmed,
            TransactionOutcome::Failed { .. } => SubmissionStatus::Failed,
            TransactionOutcome::TimedOut { .. } => SubmissionStatus::TimedOut,
        }
    }

    /// First identifier carried by an `IdentifierAssigned` event, if any.
    pub fn assigned_identifier(&self) -> Option<PatientId> {
        match self {
            TransactionOutcome::Confirmed { events, .. } => events.iter().find_map(|e| {
                let DomainEvent::IdentifierAssigned { patient_id, .. } = e;
                Some(PatientId::new(patient_id.clone()))
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed(events: Vec<DomainEvent>) -> TransactionOutcome {
        TransactionOutcome::Confirmed {
            tx_hash: TxHash::from_bytes([0x11; 32]),
            block_number: 7,
            gas_used: 21_000,
            events,
        }
    }

    #[test]
    fn test_tx_hash_roundtrip() {
        let hash = TxHash::from_bytes([0xde; 32]);
        let parsed = TxHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
        assert!(TxHash::from_hex("0xdead").is_err());
    }

    #[test]
    fn test_outcome_status() {
        assert_eq!(confirmed(vec![]).status(), SubmissionStatus::Confirmed);
        let failed = TransactionOutcome::Failed {
            tx_hash: TxHash::from_bytes([0; 32]),
            reason: "status 0".into(),
        };
        assert_eq!(failed.status(), SubmissionStatus::Failed);
        assert!(!failed.is_confirmed());
    }

    #[test]
    fn test_assigned_identifier_extraction() {
        let outcome = confirmed(vec![DomainEvent::IdentifierAssigned {
            account: "0xabc".into(),
            patient_id: "P42".into(),
        }]);
        assert_eq!(outcome.assigned_identifier(), Some(PatientId::new("P42")));

        assert_eq!(confirmed(vec![]).assigned_identifier(), None);
    }
}
