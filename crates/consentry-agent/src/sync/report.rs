use consentry_types::{FailureKind, PatientId, SkipReason, TxHash};

/// Terminal state of one record within a run.
#[derive(Clone, Debug)]
pub enum RecordStatus {
    Skipped(SkipReason),
    Confirmed {
        patient_id: PatientId,
        tx_hash: TxHash,
    },
    Enrolled {
        patient_id: PatientId,
        tx_hash: TxHash,
    },
    Failed {
        kind: FailureKind,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct RecordResult {
    pub index: usize,
    pub natural_id: Option<String>,
    pub status: RecordStatus,
}

/// Summary of one run. Outcomes are ephemeral: reported on the console,
/// then discarded — nothing is persisted across runs.
#[derive(Debug, Default)]
pub struct RunReport {
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub entries: Vec<RecordResult>,
}

impl RunReport {
    pub fn begin() -> Self {
        Self {
            started_at: Some(chrono::Utc::now()),
            finished_at: None,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, index: usize, natural_id: Option<&str>, status: RecordStatus) {
        self.entries.push(RecordResult {
            index,
            natural_id: natural_id.map(str::to_string),
            status,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now());
    }

    pub fn processed(&self) -> usize {
        self.entries.len()
    }

    pub fn confirmed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.status,
                    RecordStatus::Confirmed { .. } | RecordStatus::Enrolled { .. }
                )
            })
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, RecordStatus::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, RecordStatus::Failed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counters() {
        let mut report = RunReport::begin();
        report.push(0, Some("1"), RecordStatus::Skipped(SkipReason::MissingNaturalId));
        report.push(
            1,
            Some("2"),
            RecordStatus::Confirmed {
                patient_id: PatientId::new("P1"),
                tx_hash: TxHash::from_bytes([0; 32]),
            },
        );
        report.push(
            2,
            Some("3"),
            RecordStatus::Failed {
                kind: FailureKind::Transient,
                reason: "timeout".into(),
            },
        );
        report.finish();

        assert_eq!(report.processed(), 3);
        assert_eq!(report.confirmed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.finished_at.is_some());
    }
}
