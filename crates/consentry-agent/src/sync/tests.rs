use super::*;
use crate::registry::{ConsentRegistry, IdentityRegistry};
use crate::store::{MemoryRecordStore, RecordStore};
use async_trait::async_trait;
use consentry_types::{
    AgentError, AgentResult, ConsentCommitment, ConsentDigest, ConsentDocument, DomainEvent,
    PatientId, Resolution, TransactionOutcome, TxHash, CONSENT_SLOT_COUNT,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

fn confirmed(tag: u8, events: Vec<DomainEvent>) -> TransactionOutcome {
    TransactionOutcome::Confirmed {
        tx_hash: TxHash::from_bytes([tag; 32]),
        block_number: 1,
        gas_used: 60_000,
        events,
    }
}

/// Identity registry stub: a fixed natural-id -> identifier directory plus
/// a counter-based allocator for enrollment.
struct StubIdentity {
    directory: HashMap<String, String>,
    next_id: AtomicU64,
    omit_assignment_event: bool,
    calls: Mutex<Vec<String>>,
}

impl StubIdentity {
    fn with_directory(entries: &[(&str, &str)]) -> Self {
        Self {
            directory: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            next_id: AtomicU64::new(100),
            omit_assignment_event: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityRegistry for StubIdentity {
    async fn resolve(&self, natural_id: &str) -> AgentResult<Resolution> {
        self.record(format!("resolve:{}", natural_id));
        match self.directory.get(natural_id) {
            Some(id) => Ok(Resolution::Found(PatientId::new(id.clone()))),
            None => Ok(Resolution::NotFound),
        }
    }

    async fn assign(&self, _seed: u64) -> AgentResult<TransactionOutcome> {
        let id = format!("P{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.record(format!("assign:{}", id));

        let events = if self.omit_assignment_event {
            vec![]
        } else {
            vec![DomainEvent::IdentifierAssigned {
                account: "0xsender".into(),
                patient_id: id,
            }]
        };
        Ok(confirmed(0xaa, events))
    }

    async fn store_profile_digest(
        &self,
        patient_id: &PatientId,
        _digest_hex: &str,
    ) -> AgentResult<TransactionOutcome> {
        self.record(format!("store_digest:{}", patient_id));
        Ok(confirmed(0xab, vec![]))
    }

    async fn bind_natural_id(
        &self,
        patient_id: &PatientId,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome> {
        self.record(format!("bind:{}:{}", patient_id, natural_id));
        Ok(confirmed(0xac, vec![]))
    }
}

#[derive(Clone, Debug)]
struct Submission {
    patient_id: String,
    natural_id: String,
    digests: Vec<ConsentDigest>,
    links: Vec<String>,
    nonce: u64,
}

/// Consent registry stub. Tracks every submission with the sequence
/// number it consumed; `interfere` simulates an external actor submitting
/// from the same sender between our calls.
struct StubLedger {
    nonce: AtomicU64,
    interfere: AtomicBool,
    fail_natural_id: Option<String>,
    submissions: Mutex<Vec<Submission>>,
}

impl StubLedger {
    fn new() -> Self {
        Self {
            nonce: AtomicU64::new(0),
            interfere: AtomicBool::new(false),
            fail_natural_id: None,
            submissions: Mutex::new(Vec::new()),
        }
    }

    fn failing_for(natural_id: &str) -> Self {
        Self {
            fail_natural_id: Some(natural_id.to_string()),
            ..Self::new()
        }
    }

    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConsentRegistry for StubLedger {
    async fn create_consents(
        &self,
        patient_id: &PatientId,
        commitment: &ConsentCommitment,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome> {
        if self.fail_natural_id.as_deref() == Some(natural_id) {
            return Err(AgentError::Network("simulated receipt timeout".into()));
        }

        if self.interfere.load(Ordering::SeqCst) {
            // Another sender consumed a sequence number since our last call.
            self.nonce.fetch_add(1, Ordering::SeqCst);
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().unwrap().push(Submission {
            patient_id: patient_id.as_str().to_string(),
            natural_id: natural_id.to_string(),
            digests: commitment.digests().to_vec(),
            links: commitment.links().to_vec(),
            nonce,
        });

        Ok(confirmed(0x42, vec![]))
    }
}

fn full_record(natural_id: &str) -> ConsentDocument {
    // C1 = "yes", C2 = "", C3..C17 absent, C18 = "no".
    let mut slots: Vec<Option<String>> = vec![None; CONSENT_SLOT_COUNT];
    slots[0] = Some("yes".into());
    slots[1] = Some("".into());
    slots[17] = Some("no".into());
    ConsentDocument::new(Some("Jane Roe".into()), Some(natural_id.into()), slots)
}

fn blank_record() -> ConsentDocument {
    ConsentDocument::new(Some("No Id".into()), None, vec![])
}

#[tokio::test]
async fn test_end_to_end_confirmed() {
    let identity = StubIdentity::with_directory(&[("123-45-6789", "P42")]);
    let ledger = StubLedger::new();
    let engine = SyncEngine::new(&identity, &ledger);

    let store = MemoryRecordStore::new(vec![full_record("123-45-6789")]);
    let records = store.load().await.unwrap();
    let report = engine.run(&records).await;

    assert_eq!(report.processed(), 1);
    assert_eq!(report.confirmed(), 1);
    assert!(matches!(
        report.entries[0].status,
        RecordStatus::Confirmed { .. }
    ));

    let submissions = ledger.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];

    assert_eq!(submission.patient_id, "P42");
    assert_eq!(submission.natural_id, "123-45-6789");
    assert_eq!(submission.digests.len(), CONSENT_SLOT_COUNT);
    assert_eq!(submission.links.len(), CONSENT_SLOT_COUNT);
    assert!(submission.links.iter().all(String::is_empty));

    // "yes" vs "" vs absent all digest differently.
    assert_ne!(submission.digests[0], submission.digests[1]);
    assert_ne!(submission.digests[1], submission.digests[2]);
}

#[tokio::test]
async fn test_skip_law() {
    let identity = StubIdentity::with_directory(&[]);
    let ledger = StubLedger::new();
    let engine = SyncEngine::new(&identity, &ledger);

    // One record without a natural id, one whose id the registry does not
    // know. Neither may reach the submitter.
    let report = engine
        .run(&[blank_record(), full_record("999-99-9999")])
        .await;

    assert_eq!(report.skipped(), 2);
    assert!(ledger.submissions().is_empty());

    // The record without a natural id never even reaches the correlator.
    let calls = identity.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["resolve:999-99-9999".to_string()]);
}

#[tokio::test]
async fn test_failure_isolation() {
    let identity =
        StubIdentity::with_directory(&[("111-11-1111", "P1"), ("222-22-2222", "P2")]);
    let ledger = StubLedger::failing_for("111-11-1111");
    let engine = SyncEngine::new(&identity, &ledger);

    let report = engine
        .run(&[full_record("111-11-1111"), full_record("222-22-2222")])
        .await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.confirmed(), 1);

    match &report.entries[0].status {
        RecordStatus::Failed { kind, .. } => assert_eq!(kind.tag(), "transient"),
        other => panic!("expected first record to fail, got {:?}", other),
    }

    // The second record was still submitted.
    let submissions = ledger.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].patient_id, "P2");
}

#[tokio::test]
async fn test_nonce_freshness_under_interference() {
    let identity =
        StubIdentity::with_directory(&[("111-11-1111", "P1"), ("222-22-2222", "P2")]);
    let ledger = StubLedger::new();
    ledger.interfere.store(true, Ordering::SeqCst);
    let engine = SyncEngine::new(&identity, &ledger);

    engine
        .run(&[full_record("111-11-1111"), full_record("222-22-2222")])
        .await;

    let submissions = ledger.submissions();
    assert_eq!(submissions.len(), 2);
    assert!(
        submissions[1].nonce > submissions[0].nonce,
        "sequence numbers must strictly increase: {} then {}",
        submissions[0].nonce,
        submissions[1].nonce
    );
}

#[tokio::test]
async fn test_enroll_assigns_and_binds() {
    let identity = StubIdentity::with_directory(&[("333-33-3333", "P7")]);
    let engine = EnrollEngine::new(&identity);

    // First record already enrolled, second needs assignment.
    let report = engine
        .run(&[full_record("333-33-3333"), full_record("444-44-4444")])
        .await;

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.confirmed(), 1);
    assert!(matches!(
        report.entries[0].status,
        RecordStatus::Skipped(consentry_types::SkipReason::AlreadyAssigned)
    ));

    match &report.entries[1].status {
        RecordStatus::Enrolled { patient_id, .. } => {
            assert_eq!(patient_id.as_str(), "P100");
        }
        other => panic!("expected enrollment, got {:?}", other),
    }

    let calls = identity.calls.lock().unwrap().clone();
    assert!(calls.contains(&"store_digest:P100".to_string()));
    assert!(calls.contains(&"bind:P100:444-44-4444".to_string()));
}

#[tokio::test]
async fn test_enroll_requires_assignment_event() {
    let mut identity = StubIdentity::with_directory(&[]);
    identity.omit_assignment_event = true;
    let engine = EnrollEngine::new(&identity);

    let report = engine.run(&[full_record("555-55-5555")]).await;

    assert_eq!(report.failed(), 1);
    match &report.entries[0].status {
        RecordStatus::Failed { kind, reason } => {
            assert_eq!(kind.tag(), "invariant");
            assert!(reason.contains("IdentifierAssigned"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
