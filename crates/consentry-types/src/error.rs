use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    /// Classify this error for per-record failure reporting. Configuration
    /// and credential errors never reach the record boundary; they abort
    /// the run before processing begins.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AgentError::Network(_) | AgentError::Contract(_) => FailureKind::Transient,
            _ => FailureKind::Invariant,
        }
    }
}

/// Stable classification attached to every per-record failure diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Invariant,
}

impl FailureKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Invariant => "invariant",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Expected, non-error conditions that remove a record from a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingNaturalId,
    IdentifierNotFound,
    AlreadyAssigned,
}

impl SkipReason {
    pub fn tag(&self) -> &'static str {
        "skip"
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingNaturalId => write!(f, "natural-person identifier missing"),
            SkipReason::IdentifierNotFound => write!(f, "no on-chain identifier for record"),
            SkipReason::AlreadyAssigned => write!(f, "on-chain identifier already assigned"),
        }
    }
}
