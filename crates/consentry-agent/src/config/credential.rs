use consentry_types::{AgentError, AgentResult};
use std::fmt;
use zeroize::Zeroizing;

use super::agent::LedgerConfig;

pub const CREDENTIAL_ENV_VAR: &str = "CONSENTRY_PRIVATE_KEY";

/// The sender's private signing credential. Held only in process memory,
/// zeroed on drop, redacted from Debug output, never logged.
pub struct SenderCredential(Zeroizing<String>);

impl SenderCredential {
    /// Environment variable first, configured key file second. A missing
    /// credential is a configuration failure surfaced before any record
    /// is processed.
    pub fn load(config: &LedgerConfig) -> AgentResult<Self> {
        if let Ok(key) = std::env::var(CREDENTIAL_ENV_VAR) {
            return Self::from_hex(key);
        }

        if let Some(ref path) = config.credential_file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                AgentError::Credential(format!("Failed to read credential file: {}", e))
            })?;
            return Self::from_hex(contents.trim().to_string());
        }

        Err(AgentError::Credential(format!(
            "No sender credential: set {} or configure ledger.credential_file",
            CREDENTIAL_ENV_VAR
        )))
    }

    pub fn from_hex(key: String) -> AgentResult<Self> {
        let trimmed = key.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let decoded = hex::decode(hex_part)
            .map_err(|e| AgentError::Credential(format!("Invalid private key hex: {}", e)))?;
        if decoded.len() != 32 {
            return Err(AgentError::Credential(
                "Private key must be 32 bytes".into(),
            ));
        }

        Ok(Self(Zeroizing::new(trimmed.to_string())))
    }

    /// Expose the raw key for signer construction. Call sites must not
    /// persist or log the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SenderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SenderCredential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x614c9d21bbf36fa1ecc3f5004643a3001b5e1fb984bbcfe31ac608d19c9ea4b9";

    #[test]
    fn test_valid_key_accepted() {
        let cred = SenderCredential::from_hex(TEST_KEY.to_string()).unwrap();
        assert_eq!(cred.expose(), TEST_KEY);

        let bare = SenderCredential::from_hex(TEST_KEY[2..].to_string()).unwrap();
        assert_eq!(bare.expose(), &TEST_KEY[2..]);
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(SenderCredential::from_hex("0x1234".into()).is_err());
        assert!(SenderCredential::from_hex("not-hex".into()).is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let cred = SenderCredential::from_hex(TEST_KEY.to_string()).unwrap();
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains(&TEST_KEY[4..10]));
        assert!(rendered.contains("REDACTED"));
    }
}
