use consentry_crypto::consent_digest;
use consentry_types::{
    AgentResult, ConsentCommitment, ConsentDocument, CONSENT_SLOT_COUNT,
};
use serde_json::json;

/// Off-chain reference links are an explicit placeholder: the upstream
/// data flow never produces them yet, and no link format is invented here.
pub const OFFCHAIN_LINK_PLACEHOLDER: &str = "";

/// Pack a record's 18 consent slots into one commitment: per-slot digest
/// over `{"consent": <value-or-null>}` plus the link placeholder,
/// index-aligned. An absent slot digests as JSON null, so it stays
/// distinct from an empty-string consent.
pub fn assemble(document: &ConsentDocument) -> AgentResult<ConsentCommitment> {
    let mut digests = Vec::with_capacity(CONSENT_SLOT_COUNT);
    let mut links = Vec::with_capacity(CONSENT_SLOT_COUNT);

    for slot in 0..CONSENT_SLOT_COUNT {
        let value = json!({ "consent": document.slot(slot) });
        digests.push(consent_digest(&value)?);
        links.push(OFFCHAIN_LINK_PLACEHOLDER.to_string());
    }

    // Fixed iteration bounds make a mismatch unreachable; the constructor
    // still checks both lengths before anything goes on-chain.
    ConsentCommitment::new(digests, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(slots: Vec<Option<String>>) -> ConsentDocument {
        ConsentDocument::new(Some("Test".into()), Some("123-45-6789".into()), slots)
    }

    #[test]
    fn test_commitment_always_slot_sized() {
        for slot_count in [0, 1, 18] {
            let doc = document(vec![Some("yes".into()); slot_count]);
            let commitment = assemble(&doc).unwrap();
            assert_eq!(commitment.digests().len(), CONSENT_SLOT_COUNT);
            assert_eq!(commitment.links().len(), CONSENT_SLOT_COUNT);
        }
    }

    #[test]
    fn test_links_are_placeholders() {
        let commitment = assemble(&document(vec![Some("yes".into()); 18])).unwrap();
        assert!(commitment.links().iter().all(String::is_empty));
    }

    #[test]
    fn test_empty_and_absent_slots_differ() {
        let with_empty = assemble(&document(vec![Some("".into())])).unwrap();
        let with_absent = assemble(&document(vec![None])).unwrap();

        assert_ne!(with_empty.digests()[0], with_absent.digests()[0]);
        // Slots 1.. are absent in both records and must agree.
        assert_eq!(with_empty.digests()[1], with_absent.digests()[1]);
    }

    #[test]
    fn test_digests_index_aligned() {
        let doc = document(vec![Some("yes".into()), Some("no".into())]);
        let commitment = assemble(&doc).unwrap();
        let again = assemble(&doc).unwrap();

        assert_eq!(commitment.digests()[0], again.digests()[0]);
        assert_ne!(commitment.digests()[0], commitment.digests()[1]);
    }
}
