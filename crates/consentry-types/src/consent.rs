use crate::error::{AgentError, AgentResult};
use crate::{CONSENT_SLOT_COUNT, DIGEST_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte on-chain consent digest (Keccak-256 over the canonical content
/// hash, see `consentry-crypto`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsentDigest(pub [u8; DIGEST_SIZE]);

impl ConsentDigest {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> AgentResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AgentError::Serialization(e.to_string()))?;
        if bytes.len() != DIGEST_SIZE {
            return Err(AgentError::Serialization("Invalid digest length".into()));
        }
        let mut arr = [0u8; DIGEST_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ConsentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ConsentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Opaque identifier issued by the on-chain identity registry (e.g. "P42").
/// Assigned once per natural person and immutable thereafter.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatientId({})", self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-size consent commitment submitted in a single on-chain call:
/// one digest and one off-chain reference link per consent slot,
/// index-aligned with the record's slots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsentCommitment {
    digests: Vec<ConsentDigest>,
    links: Vec<String>,
}

impl ConsentCommitment {
    /// Both arrays must hold exactly [`CONSENT_SLOT_COUNT`] entries. The
    /// assembler iterates fixed bounds, so a mismatch here is a programming
    /// error, not bad input.
    pub fn new(digests: Vec<ConsentDigest>, links: Vec<String>) -> AgentResult<Self> {
        if digests.len() != CONSENT_SLOT_COUNT || links.len() != CONSENT_SLOT_COUNT {
            return Err(AgentError::Invariant(format!(
                "Commitment arrays must have {} entries, got {} digests / {} links",
                CONSENT_SLOT_COUNT,
                digests.len(),
                links.len()
            )));
        }
        Ok(Self { digests, links })
    }

    pub fn digests(&self) -> &[ConsentDigest] {
        &self.digests
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }
}
