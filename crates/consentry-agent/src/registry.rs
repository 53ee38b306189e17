use async_trait::async_trait;
use consentry_types::{AgentResult, ConsentCommitment, PatientId, Resolution, TransactionOutcome};

/// Narrow seam over the on-chain identity registry. The production
/// implementation is [`crate::contracts::LedgerClient`]; tests substitute
/// stubs. The registry is authoritative for identifier allocation — no
/// identifier is ever minted client-side.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    /// Read-only lookup of the identifier correlated with a
    /// natural-person identifier. NotFound is an expected outcome.
    async fn resolve(&self, natural_id: &str) -> AgentResult<Resolution>;

    /// Ask the registry to allocate a fresh identifier. The seed is
    /// entropy for the registry's generator, not the identifier itself.
    async fn assign(&self, seed: u64) -> AgentResult<TransactionOutcome>;

    /// Record the record's profile content hash against an identifier.
    async fn store_profile_digest(
        &self,
        patient_id: &PatientId,
        digest_hex: &str,
    ) -> AgentResult<TransactionOutcome>;

    /// Bind the natural-person identifier to an on-chain identifier.
    async fn bind_natural_id(
        &self,
        patient_id: &PatientId,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome>;
}

/// Narrow seam over the on-chain consent registry.
#[async_trait]
pub trait ConsentRegistry: Send + Sync {
    /// Submit one write-once consent commitment for an identifier.
    /// Exactly one state-changing call is dispatched per invocation; the
    /// implementation fetches a fresh nonce each time and never retries.
    async fn create_consents(
        &self,
        patient_id: &PatientId,
        commitment: &ConsentCommitment,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome>;
}
