use super::report::{RecordStatus, RunReport};
use crate::registry::IdentityRegistry;
use consentry_crypto::{assignment_seed, canonical_sha256_hex};
use consentry_types::{
    AgentResult, ConsentDocument, FailureKind, Resolution, SkipReason, TransactionOutcome,
};
use serde_json::json;
use tracing::{info, warn};

/// Enrollment: for records with no on-chain identifier yet, ask the
/// identity registry to allocate one, then record the profile digest and
/// bind the natural-person identifier. Allocation is entirely the
/// registry's; the seed passed along is derived from the profile digest,
/// so the client holds no randomness and an identifier is never minted
/// twice for the same record.
pub struct EnrollEngine<'a, I> {
    identity: &'a I,
}

impl<'a, I> EnrollEngine<'a, I>
where
    I: IdentityRegistry,
{
    pub fn new(identity: &'a I) -> Self {
        Self { identity }
    }

    pub async fn run(&self, records: &[ConsentDocument]) -> RunReport {
        let mut report = RunReport::begin();
        info!("Enrolling {} records", records.len());

        for (index, document) in records.iter().enumerate() {
            let status = self.process(document).await;

            match &status {
                RecordStatus::Skipped(reason) => {
                    info!("Record {}: skipped: {}", index, reason);
                }
                RecordStatus::Failed { kind, reason } => {
                    warn!("Record {}: failed [{}]: {}", index, kind.tag(), reason);
                }
                _ => {}
            }

            report.push(index, document.natural_id(), status);
        }

        report.finish();
        info!(
            "Enrollment complete: {} enrolled, {} skipped, {} failed",
            report.confirmed(),
            report.skipped(),
            report.failed()
        );
        report
    }

    async fn process(&self, document: &ConsentDocument) -> RecordStatus {
        let Some(natural_id) = document.natural_id() else {
            return RecordStatus::Skipped(SkipReason::MissingNaturalId);
        };

        // An identifier is assigned once and never regenerated.
        match self.identity.resolve(natural_id).await {
            Ok(Resolution::Found(_)) => {
                return RecordStatus::Skipped(SkipReason::AlreadyAssigned)
            }
            Ok(Resolution::NotFound) => {}
            Err(e) => {
                return RecordStatus::Failed {
                    kind: e.failure_kind(),
                    reason: format!("Identifier resolution: {}", e),
                }
            }
        }

        let profile = json!({ "Name": document.name, "SSN": natural_id });
        let digest_hex = match canonical_sha256_hex(&profile) {
            Ok(digest) => digest,
            Err(e) => {
                return RecordStatus::Failed {
                    kind: e.failure_kind(),
                    reason: format!("Profile digest: {}", e),
                }
            }
        };

        let outcome = match self.identity.assign(assignment_seed(&digest_hex)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return RecordStatus::Failed {
                    kind: e.failure_kind(),
                    reason: format!("Identifier assignment: {}", e),
                }
            }
        };

        let tx_hash = *outcome.tx_hash();
        let patient_id = match &outcome {
            TransactionOutcome::Confirmed { .. } => match outcome.assigned_identifier() {
                Some(id) => id,
                None => {
                    return RecordStatus::Failed {
                        kind: FailureKind::Invariant,
                        reason: "Assignment confirmed without an IdentifierAssigned event".into(),
                    }
                }
            },
            TransactionOutcome::Failed { reason, .. } => {
                return RecordStatus::Failed {
                    kind: FailureKind::Transient,
                    reason: format!("Identifier assignment: {} ({})", reason, tx_hash),
                }
            }
            TransactionOutcome::TimedOut { waited_secs, .. } => {
                return RecordStatus::Failed {
                    kind: FailureKind::Transient,
                    reason: format!(
                        "Identifier assignment: no receipt within {}s ({})",
                        waited_secs, tx_hash
                    ),
                }
            }
        };

        info!("Identifier {} assigned ({})", patient_id, tx_hash);

        if let Some(failed) = expect_confirmed(
            self.identity
                .store_profile_digest(&patient_id, &digest_hex)
                .await,
            "Profile digest storage",
        ) {
            return failed;
        }

        if let Some(failed) = expect_confirmed(
            self.identity.bind_natural_id(&patient_id, natural_id).await,
            "Natural-id binding",
        ) {
            return failed;
        }

        RecordStatus::Enrolled {
            patient_id,
            tx_hash,
        }
    }
}

fn expect_confirmed(
    result: AgentResult<TransactionOutcome>,
    label: &str,
) -> Option<RecordStatus> {
    match result {
        Ok(outcome) if outcome.is_confirmed() => None,
        Ok(outcome) => Some(RecordStatus::Failed {
            kind: FailureKind::Transient,
            reason: format!("{} not confirmed: {:?} ({})", label, outcome.status(), outcome.tx_hash()),
        }),
        Err(e) => Some(RecordStatus::Failed {
            kind: e.failure_kind(),
            reason: format!("{}: {}", label, e),
        }),
    }
}
