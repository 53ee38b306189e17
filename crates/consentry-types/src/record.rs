use crate::CONSENT_SLOT_COUNT;
use serde::{Deserialize, Serialize};

/// One off-chain patient record as read from the document store: a
/// natural-person identifier plus the 18 labeled consent slots. Records are
/// read once per run and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsentDocument {
    pub name: Option<String>,
    natural_id: Option<String>,
    slots: Vec<Option<String>>,
}

impl ConsentDocument {
    pub fn new(
        name: Option<String>,
        natural_id: Option<String>,
        slots: Vec<Option<String>>,
    ) -> Self {
        // An empty identifier string carries no correlation value and is
        // treated the same as an absent field.
        let natural_id = natural_id.filter(|id| !id.trim().is_empty());
        Self {
            name,
            natural_id,
            slots,
        }
    }

    /// The natural-person identifier, if present. Records without one are
    /// skipped, never errored.
    pub fn natural_id(&self) -> Option<&str> {
        self.natural_id.as_deref()
    }

    /// Value of consent slot `index` (0-based, `C1` is slot 0). Slots past
    /// the end of the stored values read as absent.
    pub fn slot(&self, index: usize) -> Option<&str> {
        debug_assert!(index < CONSENT_SLOT_COUNT);
        self.slots.get(index).and_then(|s| s.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_natural_id_is_absent() {
        let doc = ConsentDocument::new(None, Some("  ".into()), vec![]);
        assert!(doc.natural_id().is_none());

        let doc = ConsentDocument::new(None, Some("123-45-6789".into()), vec![]);
        assert_eq!(doc.natural_id(), Some("123-45-6789"));
    }

    #[test]
    fn test_missing_slots_read_as_absent() {
        let doc = ConsentDocument::new(
            Some("Test".into()),
            Some("123".into()),
            vec![Some("yes".into()), None],
        );
        assert_eq!(doc.slot(0), Some("yes"));
        assert_eq!(doc.slot(1), None);
        assert_eq!(doc.slot(17), None);
    }
}
