use crate::canonical::canonical_json;
use consentry_types::{AgentResult, ConsentDigest};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hex-encoded SHA-256 of the canonical serialization. This is the
/// content-hash layer: stable across field reordering, distinct for any
/// semantic difference (including empty-string vs absent values).
pub fn canonical_sha256_hex(value: &Value) -> AgentResult<String> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Full consent digest pipeline: canonical JSON -> SHA-256 hex ->
/// Keccak-256, yielding the 32-byte value submitted on-chain. Keccak runs
/// over the hex text, not the raw SHA-256 bytes; the consent registry
/// stores these digests and the encoding must stay fixed.
pub fn consent_digest(value: &Value) -> AgentResult<ConsentDigest> {
    let content_hash = canonical_sha256_hex(value)?;
    Ok(ConsentDigest::from_bytes(keccak256(content_hash.as_bytes())))
}

/// Deterministic seed for the identity registry's assignment call, derived
/// from the record's profile digest. The registry owns collision-free
/// allocation; this value is entropy only, so any stable derivation works.
pub fn assignment_seed(profile_digest_hex: &str) -> u64 {
    let hash = keccak256(profile_digest_hex.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_digest_is_deterministic() {
        let value = json!({"consent": "yes"});
        assert_eq!(
            consent_digest(&value).unwrap(),
            consent_digest(&value).unwrap()
        );
    }

    #[test]
    fn test_digest_field_order_independent() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"consent": "yes", "scope": "labs"}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"scope": "labs", "consent": "yes"}"#).unwrap();
        assert_eq!(consent_digest(&a).unwrap(), consent_digest(&b).unwrap());
    }

    #[test]
    fn test_distinct_values_distinct_digests() {
        let yes = consent_digest(&json!({"consent": "yes"})).unwrap();
        let empty = consent_digest(&json!({"consent": ""})).unwrap();
        let absent = consent_digest(&json!({"consent": null})).unwrap();

        assert_ne!(yes, empty);
        assert_ne!(yes, absent);
        assert_ne!(empty, absent);
    }

    #[test]
    fn test_keccak_known_vector() {
        // keccak256("") is the canonical empty-input vector.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_assignment_seed_stable() {
        let digest = canonical_sha256_hex(&json!({"Name": "A", "SSN": "1"})).unwrap();
        assert_eq!(assignment_seed(&digest), assignment_seed(&digest));
        let other = canonical_sha256_hex(&json!({"Name": "B", "SSN": "2"})).unwrap();
        assert_ne!(assignment_seed(&digest), assignment_seed(&other));
    }

    proptest! {
        #[test]
        fn prop_digest_idempotent(consent in ".{0,64}", scope in ".{0,32}") {
            let value = json!({"consent": consent, "scope": scope});
            prop_assert_eq!(
                consent_digest(&value).unwrap(),
                consent_digest(&value).unwrap()
            );
        }

        #[test]
        fn prop_digest_order_independent(consent in "[a-z]{0,16}", scope in "[a-z]{0,16}") {
            let forward = json!({"consent": consent.clone(), "scope": scope.clone()});
            let reversed: serde_json::Value = serde_json::from_str(&format!(
                r#"{{"scope": "{}", "consent": "{}"}}"#, scope, consent
            )).unwrap();
            prop_assert_eq!(
                consent_digest(&forward).unwrap(),
                consent_digest(&reversed).unwrap()
            );
        }
    }
}
