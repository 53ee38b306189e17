use super::assembler::assemble;
use super::report::{RecordStatus, RunReport};
use crate::registry::{ConsentRegistry, IdentityRegistry};
use consentry_types::{
    ConsentDocument, FailureKind, Resolution, SkipReason, TransactionOutcome,
};
use tracing::{info, warn};

/// Sequential consent-batch synchronization: one record at a time, at most
/// one on-chain call in flight, confirmed (or timed out) before the next
/// record begins. Records are independent; nothing is transactional across
/// them.
pub struct SyncEngine<'a, I, C> {
    identity: &'a I,
    consents: &'a C,
}

impl<'a, I, C> SyncEngine<'a, I, C>
where
    I: IdentityRegistry,
    C: ConsentRegistry,
{
    pub fn new(identity: &'a I, consents: &'a C) -> Self {
        Self { identity, consents }
    }

    pub async fn run(&self, records: &[ConsentDocument]) -> RunReport {
        let mut report = RunReport::begin();
        info!("Synchronizing {} records", records.len());

        for (index, document) in records.iter().enumerate() {
            let status = self.process(document).await;

            match &status {
                RecordStatus::Skipped(reason) => {
                    warn!("Record {}: skipped: {}", index, reason);
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
            "Run complete: {} confirmed, {} skipped, {} failed",
            report.confirmed(),
            report.skipped(),
            report.failed()
        );
        report
    }

    /// The per-record boundary: every error becomes a terminal record
    /// status here and never escapes to abort the run.
    async fn process(&self, document: &ConsentDocument) -> RecordStatus {
        let Some(natural_id) = document.natural_id() else {
            return RecordStatus::Skipped(SkipReason::MissingNaturalId);
        };

        let patient_id = match self.identity.resolve(natural_id).await {
            Ok(Resolution::Found(id)) => id,
            Ok(Resolution::NotFound) => {
                return RecordStatus::Skipped(SkipReason::IdentifierNotFound)
            }
            Err(e) => {
                return RecordStatus::Failed {
                    kind: e.failure_kind(),
                    reason: format!("Identifier resolution: {}", e),
                }
            }
        };

        info!("Processing record for patient {}", patient_id);

        let commitment = match assemble(document) {
            Ok(commitment) => commitment,
            Err(e) => {
                return RecordStatus::Failed {
                    kind: e.failure_kind(),
                    reason: format!("Commitment assembly: {}", e),
                }
            }
        };

        match self
            .consents
            .create_consents(&patient_id, &commitment, natural_id)
            .await
        {
            Ok(TransactionOutcome::Confirmed {
                tx_hash,
                block_number,
                ..
            }) => {
                info!(
                    "Consents confirmed for patient {} in block {} ({})",
                    patient_id, block_number, tx_hash
                );
                RecordStatus::Confirmed {
                    patient_id,
                    tx_hash,
                }
            }
            Ok(TransactionOutcome::Failed { tx_hash, reason }) => RecordStatus::Failed {
                kind: FailureKind::Transient,
                reason: format!("{} ({})", reason, tx_hash),
            },
            Ok(TransactionOutcome::TimedOut {
                tx_hash,
                waited_secs,
            }) => RecordStatus::Failed {
                kind: FailureKind::Transient,
                reason: format!("No receipt within {}s ({})", waited_secs, tx_hash),
            },
            Err(e) => RecordStatus::Failed {
                kind: e.failure_kind(),
                reason: format!("Submission: {}", e),
            },
        }
    }
}
