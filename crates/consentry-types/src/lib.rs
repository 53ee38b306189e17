#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod consent;
mod error;
mod outcome;
mod record;

pub use consent::{ConsentCommitment, ConsentDigest, PatientId};
pub use error::{AgentError, AgentResult, FailureKind, SkipReason};
pub use outcome::{DomainEvent, Resolution, SubmissionStatus, TransactionOutcome, TxHash};
pub use record::ConsentDocument;

/// Number of labeled consent slots carried by every record (`C1`..`C18`).
pub const CONSENT_SLOT_COUNT: usize = 18;

pub const DIGEST_SIZE: usize = 32;

pub const TX_HASH_SIZE: usize = 32;
