use super::bindings::{ConsentManagement, PatientIdAssignedFilter, UserIdentity};
use super::config::ContractConfig;
use crate::config::SenderCredential;
use crate::registry::{ConsentRegistry, IdentityRegistry};
use async_trait::async_trait;
use consentry_types::{
    AgentError, AgentResult, ConsentCommitment, DomainEvent, PatientId, Resolution,
    SubmissionStatus, TransactionOutcome, TxHash, CONSENT_SLOT_COUNT,
};
use ethers::{
    abi::{Detokenize, RawLog},
    contract::{ContractCall, EthLogDecode},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, BlockId, BlockNumber, Log, TransactionReceipt, H256, U256},
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

type LedgerSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Client for the identity and consent registry contracts. Owns the RPC
/// provider and the signing middleware; every state-changing call resolves
/// its sequence number, gas limit and gas price immediately before send
/// and waits for its receipt under an explicit bound.
pub struct LedgerClient {
    config: ContractConfig,
    provider: Option<Arc<Provider<Http>>>,
    signer: Option<Arc<LedgerSigner>>,
    sender: Option<Address>,
}

impl LedgerClient {
    pub fn new(config: ContractConfig) -> Self {
        Self {
            config,
            provider: None,
            signer: None,
            sender: None,
        }
    }

    pub async fn connect(&mut self) -> AgentResult<()> {
        info!("Connecting to ledger RPC: {}", self.config.rpc_url);

        let provider = Provider::<Http>::try_from(self.config.rpc_url.as_str())
            .map_err(|e| AgentError::Network(format!("Failed to create provider: {}", e)))?;

        let chain_id = timeout(self.config.call_timeout, provider.get_chainid())
            .await
            .map_err(|_| AgentError::Network("Chain ID query timed out".into()))?
            .map_err(|e| AgentError::Network(format!("Failed to get chain ID: {}", e)))?;

        if chain_id.as_u64() != self.config.chain_id {
            return Err(AgentError::Network(format!(
                "Chain ID mismatch: expected {}, got {}",
                self.config.chain_id,
                chain_id.as_u64()
            )));
        }

        self.provider = Some(Arc::new(provider));

        info!("Connected to chain {}", self.config.chain_id);
        Ok(())
    }

    pub fn set_signer(&mut self, credential: &SenderCredential) -> AgentResult<Address> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AgentError::Network("Not connected".into()))?
            .clone();

        let wallet: LocalWallet = credential
            .expose()
            .parse()
            .map_err(|e| AgentError::Credential(format!("Invalid private key: {}", e)))?;

        let wallet = wallet.with_chain_id(self.config.chain_id);
        let address = wallet.address();

        let client = SignerMiddleware::new((*provider).clone(), wallet);
        self.signer = Some(Arc::new(client));
        self.sender = Some(address);

        info!("Sender wallet set: {:?}", address);
        Ok(address)
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    fn provider(&self) -> AgentResult<&Arc<Provider<Http>>> {
        self.provider
            .as_ref()
            .ok_or_else(|| AgentError::Network("Not connected".into()))
    }

    fn signer(&self) -> AgentResult<&Arc<LedgerSigner>> {
        self.signer
            .as_ref()
            .ok_or_else(|| AgentError::Credential("No sender wallet configured".into()))
    }

    /// Fresh per-sender sequence number from the pending pool. Never
    /// cached: an external actor submitting from the same sender between
    /// our calls must not cause a collision.
    async fn fresh_nonce(&self) -> AgentResult<U256> {
        let signer = self.signer()?;
        let sender = self
            .sender
            .ok_or_else(|| AgentError::Credential("No sender wallet configured".into()))?;

        signer
            .get_transaction_count(sender, Some(BlockId::Number(BlockNumber::Pending)))
            .await
            .map_err(|e| AgentError::Network(format!("Failed to fetch nonce: {}", e)))
    }

    async fn gas_price(&self) -> AgentResult<U256> {
        if let Some(price) = self.config.gas_price {
            return Ok(price);
        }

        self.signer()?
            .get_gas_price()
            .await
            .map_err(|e| AgentError::Network(format!("Failed to fetch gas price: {}", e)))
    }

    /// Dispatch one state-changing call: resolve nonce and gas terms, sign
    /// via the middleware, submit, and wait for the receipt under the
    /// configured bound. No retry happens here; a caller that retries must
    /// go through this path again to pick up a fresh sequence number.
    async fn dispatch<D>(
        &self,
        call: ContractCall<LedgerSigner, D>,
        label: &str,
    ) -> AgentResult<TransactionOutcome>
    where
        D: Detokenize + Send + Sync,
    {
        let nonce = self.fresh_nonce().await?;
        let gas_price = self.gas_price().await?;

        let mut call = call
            .legacy()
            .gas(self.config.gas_limit)
            .gas_price(gas_price);
        call.tx.set_nonce(nonce);

        debug!(
            status = ?SubmissionStatus::Built,
            call = label,
            nonce = %nonce,
            gas_price = %gas_price,
            "Call built with fresh sequence number"
        );

        let pending = call
            .send()
            .await
            .map_err(|e| AgentError::Contract(format!("Failed to submit {}: {}", label, e)))?;

        let tx_hash = TxHash::from_bytes((*pending).0);
        debug!(status = ?SubmissionStatus::Signed, call = label, "Signed with in-memory credential");
        debug!(status = ?SubmissionStatus::Submitted, call = label, tx = %tx_hash, "Accepted into pending pool");

        self.await_receipt(pending, tx_hash).await
    }

    /// Receipt wait with an explicit timeout; expiry is a terminal
    /// TimedOut outcome, never an unbounded block.
    async fn await_receipt(
        &self,
        pending: PendingTransaction<'_, Http>,
        tx_hash: TxHash,
    ) -> AgentResult<TransactionOutcome> {
        match timeout(self.config.receipt_timeout, pending).await {
            Err(_) => Ok(TransactionOutcome::TimedOut {
                tx_hash,
                waited_secs: self.config.receipt_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(AgentError::Network(format!("Receipt wait failed: {}", e))),
            Ok(Ok(None)) => Ok(TransactionOutcome::Failed {
                tx_hash,
                reason: "Transaction dropped without a receipt".into(),
            }),
            Ok(Ok(Some(receipt))) => Ok(outcome_from_receipt(tx_hash, receipt)),
        }
    }

    /// Fetch receipt, enclosing block and transaction for inspection.
    pub async fn transaction_details(&self, tx_hash: &TxHash) -> AgentResult<TransactionDetails> {
        let provider = self.provider()?;
        let hash = H256(tx_hash.0);

        let receipt = provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| AgentError::Network(format!("Failed to fetch receipt: {}", e)))?
            .ok_or_else(|| AgentError::Contract(format!("No receipt found for {}", tx_hash)))?;

        let block_number = receipt
            .block_number
            .ok_or_else(|| AgentError::Contract("Receipt missing block number".into()))?;

        let block = provider
            .get_block(block_number)
            .await
            .map_err(|e| AgentError::Network(format!("Failed to fetch block: {}", e)))?
            .ok_or_else(|| AgentError::Contract(format!("Block {} not found", block_number)))?;

        let tx = provider
            .get_transaction(hash)
            .await
            .map_err(|e| AgentError::Network(format!("Failed to fetch transaction: {}", e)))?
            .ok_or_else(|| AgentError::Contract(format!("Transaction {} not found", tx_hash)))?;

        Ok(TransactionDetails {
            tx_hash: *tx_hash,
            block_number: block_number.as_u64(),
            block_hash: block.hash.map(|h| format!("{:?}", h)).unwrap_or_default(),
            timestamp: block.timestamp.as_u64(),
            miner: block.author.map(|a| format!("{:?}", a)).unwrap_or_default(),
            block_tx_count: block.transactions.len(),
            from: format!("{:?}", tx.from),
            to: tx.to.map(|a| format!("{:?}", a)),
            gas_used: receipt.gas_used.map(|g| g.as_u64()).unwrap_or_default(),
            succeeded: receipt.status.map(|s| s.as_u64() == 1).unwrap_or(false),
            events: decode_domain_events(&receipt.logs),
        })
    }
}

#[async_trait]
impl IdentityRegistry for LedgerClient {
    async fn resolve(&self, natural_id: &str) -> AgentResult<Resolution> {
        let provider = self.provider()?;
        let identity = UserIdentity::new(self.config.identity_address, provider.clone());

        let call = identity.get_patient_id_by_ssn(natural_id.to_string());
        let id = timeout(self.config.call_timeout, call.call())
            .await
            .map_err(|_| AgentError::Network("Identifier lookup timed out".into()))?
            .map_err(|e| AgentError::Contract(format!("Identifier lookup failed: {}", e)))?;

        if id.is_empty() {
            Ok(Resolution::NotFound)
        } else {
            Ok(Resolution::Found(PatientId::new(id)))
        }
    }

    async fn assign(&self, seed: u64) -> AgentResult<TransactionOutcome> {
        let signer = self.signer()?;
        let identity = UserIdentity::new(self.config.identity_address, signer.clone());

        let call = identity.generate_patient_id(U256::from(seed));
        self.dispatch(call, "generatePatientId").await
    }

    async fn store_profile_digest(
        &self,
        patient_id: &PatientId,
        digest_hex: &str,
    ) -> AgentResult<TransactionOutcome> {
        let signer = self.signer()?;
        let identity = UserIdentity::new(self.config.identity_address, signer.clone());

        let call =
            identity.store_data_hash(patient_id.as_str().to_string(), digest_hex.to_string());
        self.dispatch(call, "storeDataHash").await
    }

    async fn bind_natural_id(
        &self,
        patient_id: &PatientId,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome> {
        let signer = self.signer()?;
        let identity = UserIdentity::new(self.config.identity_address, signer.clone());

        let call = identity.store_ssn(patient_id.as_str().to_string(), natural_id.to_string());
        self.dispatch(call, "storeSSN").await
    }
}

#[async_trait]
impl ConsentRegistry for LedgerClient {
    async fn create_consents(
        &self,
        patient_id: &PatientId,
        commitment: &ConsentCommitment,
        natural_id: &str,
    ) -> AgentResult<TransactionOutcome> {
        let signer = self.signer()?;

        let digests: Vec<[u8; 32]> = commitment.digests().iter().map(|d| *d.as_bytes()).collect();
        let digests: [[u8; 32]; CONSENT_SLOT_COUNT] = digests.try_into().map_err(|_| {
            AgentError::Invariant("Commitment digest array is not slot-sized".into())
        })?;
        let links: [String; CONSENT_SLOT_COUNT] =
            commitment.links().to_vec().try_into().map_err(|_| {
                AgentError::Invariant("Commitment link array is not slot-sized".into())
            })?;

        info!("Submitting consent commitment for patient {}", patient_id);

        let contract = ConsentManagement::new(self.config.consent_address, signer.clone());
        let call = contract.create_consents(
            patient_id.as_str().to_string(),
            digests,
            links,
            natural_id.to_string(),
        );

        self.dispatch(call, "createConsents").await
    }
}

/// Receipt and block facts for one transaction, for console inspection.
#[derive(Clone, Debug)]
pub struct TransactionDetails {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub block_hash: String,
    pub timestamp: u64,
    pub miner: String,
    pub block_tx_count: usize,
    pub from: String,
    pub to: Option<String>,
    pub gas_used: u64,
    pub succeeded: bool,
    pub events: Vec<DomainEvent>,
}

fn outcome_from_receipt(tx_hash: TxHash, receipt: TransactionReceipt) -> TransactionOutcome {
    let succeeded = receipt.status.map(|s| s.as_u64() == 1).unwrap_or(false);

    if succeeded {
        TransactionOutcome::Confirmed {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()).unwrap_or_default(),
            gas_used: receipt.gas_used.map(|g| g.as_u64()).unwrap_or_default(),
            events: decode_domain_events(&receipt.logs),
        }
    } else {
        TransactionOutcome::Failed {
            tx_hash,
            reason: format!(
                "Receipt status 0 in block {}",
                receipt.block_number.map(|n| n.as_u64()).unwrap_or_default()
            ),
        }
    }
}

fn decode_domain_events(logs: &[Log]) -> Vec<DomainEvent> {
    logs.iter()
        .filter_map(|log| {
            let raw = RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            };
            PatientIdAssignedFilter::decode_log(&raw).ok().map(|event| {
                DomainEvent::IdentifierAssigned {
                    account: format!("{:?}", event.user),
                    patient_id: event.patient_id,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::Token;
    use ethers::contract::EthEvent;
    use ethers::types::Bytes;

    fn assigned_log(patient_id: &str) -> Log {
        let user = Address::from_low_u64_be(0xbeef);
        let mut user_topic = [0u8; 32];
        user_topic[12..].copy_from_slice(user.as_bytes());

        Log {
            topics: vec![PatientIdAssignedFilter::signature(), H256::from(user_topic)],
            data: Bytes::from(ethers::abi::encode(&[Token::String(patient_id.to_string())])),
            ..Default::default()
        }
    }

    fn receipt(status: u64, logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt {
            status: Some(status.into()),
            block_number: Some(42u64.into()),
            gas_used: Some(U256::from(53_000u64)),
            logs,
            ..Default::default()
        }
    }

    #[test]
    fn test_success_receipt_confirmed() {
        let tx_hash = TxHash::from_bytes([0x11; 32]);
        let outcome = outcome_from_receipt(tx_hash, receipt(1, vec![]));

        match outcome {
            TransactionOutcome::Confirmed {
                block_number,
                gas_used,
                events,
                ..
            } => {
                assert_eq!(block_number, 42);
                assert_eq!(gas_used, 53_000);
                assert!(events.is_empty());
            }
            other => panic!("expected Confirmed, got {:?}", other),
        }
    }

    #[test]
    fn test_reverted_receipt_failed() {
        let tx_hash = TxHash::from_bytes([0x22; 32]);
        let outcome = outcome_from_receipt(tx_hash, receipt(0, vec![]));

        assert_eq!(outcome.status(), SubmissionStatus::Failed);
        assert_eq!(outcome.tx_hash(), &tx_hash);
    }

    #[test]
    fn test_identifier_event_decoded() {
        let tx_hash = TxHash::from_bytes([0x33; 32]);
        let outcome = outcome_from_receipt(tx_hash, receipt(1, vec![assigned_log("P42")]));

        assert_eq!(
            outcome.assigned_identifier(),
            Some(PatientId::new("P42"))
        );
    }

    #[test]
    fn test_foreign_logs_ignored() {
        let mut log = assigned_log("P42");
        log.topics[0] = H256::zero();

        let events = decode_domain_events(&[log]);
        assert!(events.is_empty());
    }
}
