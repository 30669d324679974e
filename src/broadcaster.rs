//! Transaction Broadcaster
//!
//! Builds legacy (pre-EIP-1559) EVM transactions, signs them locally with EIP-155
//! replay protection and broadcasts them via `eth_sendRawTransaction`. Works with
//! public RPCs that don't hold keys.

use anyhow::{Context, Result};
use ethereum_types::H160;
use sha3::{Digest, Keccak256};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BroadcasterConfig;
use crate::crypto::EvmAccount;
use crate::error::SubmissionError;
use crate::evm_client::EvmClient;

// ============================================================================
// LEGACY TRANSACTION
// ============================================================================

/// Unsigned legacy transaction with zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub to: H160,
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    /// EIP-155 signing hash: keccak256(rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))
    pub fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
        let unsigned_items: Vec<Vec<u8>> = vec![
            rlp_encode_u64(self.nonce),
            rlp_encode_u64(self.gas_price),
            rlp_encode_u64(self.gas_limit),
            self.to.as_bytes().to_vec(),
            vec![], // value = 0
            self.data.clone(),
            rlp_encode_u64(chain_id),
            vec![],
            vec![],
        ];
        Keccak256::digest(rlp_encode_list(&unsigned_items)).into()
    }

    /// Signs the transaction and returns the raw RLP bytes ready for broadcast.
    pub fn sign(&self, account: &EvmAccount, chain_id: u64) -> Result<Vec<u8>> {
        let hash = self.signing_hash(chain_id);
        let (r, s, recovery_id) = account
            .sign_prehash(&hash)
            .context("Failed to sign EVM transaction")?;

        // EIP-155: v = recovery_id + chainId * 2 + 35
        let v = u64::from(recovery_id) + chain_id * 2 + 35;

        let signed_items: Vec<Vec<u8>> = vec![
            rlp_encode_u64(self.nonce),
            rlp_encode_u64(self.gas_price),
            rlp_encode_u64(self.gas_limit),
            self.to.as_bytes().to_vec(),
            vec![], // value = 0
            self.data.clone(),
            rlp_encode_u64(v),
            trim_leading_zeros(&r),
            trim_leading_zeros(&s),
        ];
        Ok(rlp_encode_list(&signed_items))
    }
}

// ============================================================================
// BROADCASTER
// ============================================================================

/// Sends signed transactions to one chain, retrying with a fixed delay.
#[derive(Debug, Clone)]
pub struct TransactionBroadcaster {
    client: EvmClient,
    chain_id: u64,
    config: BroadcasterConfig,
}

impl TransactionBroadcaster {
    pub fn new(client: EvmClient, chain_id: u64, config: BroadcasterConfig) -> Self {
        Self {
            client,
            chain_id,
            config,
        }
    }

    pub fn client(&self) -> &EvmClient {
        &self.client
    }

    /// Signs and broadcasts a call from `account`.
    ///
    /// The nonce is read fresh (pending) on every attempt. The whole operation,
    /// retries included, is bounded by the configured timeout.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Transaction hash reported by the node
    /// * `Err(SubmissionError::Broadcast)` - Every attempt failed
    /// * `Err(SubmissionError::Timeout)` - The timeout elapsed first
    pub async fn send(
        &self,
        account: &EvmAccount,
        to: H160,
        data: &[u8],
        gas_price: u64,
        gas_limit: u64,
    ) -> Result<String, SubmissionError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        tokio::time::timeout(timeout, self.send_with_retries(account, to, data, gas_price, gas_limit))
            .await
            .map_err(|_| SubmissionError::Timeout(self.config.timeout_ms))?
    }

    async fn send_with_retries(
        &self,
        account: &EvmAccount,
        to: H160,
        data: &[u8],
        gas_price: u64,
        gas_limit: u64,
    ) -> Result<String, SubmissionError> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.send_once(account, to, data, gas_price, gas_limit).await {
                Ok(tx_hash) => return Ok(tx_hash),
                Err(e) => {
                    warn!(
                        "Broadcast attempt {}/{} from {} failed: {:#}",
                        attempt,
                        attempts,
                        account.address_hex(),
                        e
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
            }
        }

        Err(SubmissionError::Broadcast(
            last_error.map_or_else(|| "no attempt made".to_string(), |e| format!("{:#}", e)),
        ))
    }

    async fn send_once(
        &self,
        account: &EvmAccount,
        to: H160,
        data: &[u8],
        gas_price: u64,
        gas_limit: u64,
    ) -> Result<String> {
        let nonce = self.client.get_transaction_count(&account.address_hex()).await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            data: data.to_vec(),
        };
        let raw_tx = tx.sign(account, self.chain_id)?;

        debug!(
            "EVM raw tx: nonce={}, gas_price={}, gas_limit={}, chain_id={}, from={}",
            nonce,
            gas_price,
            gas_limit,
            self.chain_id,
            account.address_hex()
        );

        self.client.send_raw_transaction(&raw_tx).await
    }
}

// ============================================================================
// RLP ENCODING HELPERS (for legacy EVM transactions)
// ============================================================================

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Encode a u64 as big-endian bytes with no leading zeros (RLP integer format).
fn rlp_encode_u64(val: u64) -> Vec<u8> {
    trim_leading_zeros(&val.to_be_bytes())
}

/// RLP-encode a single byte-string item.
fn rlp_encode_item(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else if data.len() <= 55 {
        let mut out = vec![0x80 + data.len() as u8];
        out.extend_from_slice(data);
        out
    } else {
        let len_bytes = rlp_encode_u64(data.len() as u64);
        let mut out = vec![0xb7 + len_bytes.len() as u8];
        out.extend_from_slice(&len_bytes);
        out.extend_from_slice(data);
        out
    }
}

/// RLP-encode a list of items (each item is already raw bytes, NOT RLP-encoded).
pub fn rlp_encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.iter().flat_map(|item| rlp_encode_item(item)).collect();

    if payload.len() <= 55 {
        let mut out = vec![0xc0 + payload.len() as u8];
        out.extend(payload);
        out
    } else {
        let len_bytes = rlp_encode_u64(payload.len() as u64);
        let mut out = vec![0xf7 + len_bytes.len() as u8];
        out.extend_from_slice(&len_bytes);
        out.extend(payload);
        out
    }
}
