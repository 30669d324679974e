//! EVM Client Module
//!
//! This module provides a client for communicating with EVM-compatible blockchain nodes
//! via their JSON-RPC API. The hub chain, every watched source chain and the governance
//! chain are all reached through this client.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::abi;

// ============================================================================
// API RESPONSE STRUCTURES
// ============================================================================

/// EVM JSON-RPC request wrapper
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// EVM JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// EVM event log entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvmLog {
    /// Address of the contract that emitted the event
    pub address: String,
    /// Array of topics (indexed event parameters)
    pub topics: Vec<String>,
    /// Event data (non-indexed parameters)
    pub data: String,
    /// Block number (JSON-RPC uses camelCase: blockNumber)
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    /// Transaction hash (JSON-RPC uses camelCase: transactionHash)
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Log index (JSON-RPC uses camelCase: logIndex)
    #[serde(rename = "logIndex", default)]
    pub log_index: Option<String>,
}

/// Subset of a transaction receipt used for correlation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Null while the transaction is pending
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
    /// "0x1" success, "0x0" reverted
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    /// Block the transaction was mined in, `None` while pending.
    pub fn mined_block(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|b| abi::parse_hex_u64(b).ok())
    }
}

// ============================================================================
// EVM CLIENT IMPLEMENTATION
// ============================================================================

/// Client for communicating with EVM-compatible blockchain nodes via JSON-RPC
#[derive(Debug, Clone)]
pub struct EvmClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the EVM node (e.g., "http://127.0.0.1:8545")
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
}

impl EvmClient {
    /// Creates a new EVM client for the given node URL
    ///
    /// # Arguments
    ///
    /// * `node_url` - Base URL of the EVM node (e.g., "http://127.0.0.1:8545")
    /// * `timeout_ms` - Timeout applied to every request
    ///
    /// # Returns
    ///
    /// * `Ok(EvmClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create client
    pub fn new(node_url: &str, timeout_ms: u64) -> Result<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: node_url.to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generic JSON-RPC call helper.
    ///
    /// A `null` result deserializes into `Option::None` when `T` is an `Option`.
    pub async fn json_rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let rpc_future = async {
            let resp = self
                .client
                .post(&self.base_url)
                .json(&request)
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, self.base_url))?;
            resp.json::<JsonRpcResponse<serde_json::Value>>()
                .await
                .with_context(|| format!("Failed to parse {} response from {}", method, self.base_url))
        };

        let response = tokio::time::timeout(self.timeout, rpc_future)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Timed out after {}ms waiting for {} from {}",
                    self.timeout.as_millis(),
                    method,
                    self.base_url
                )
            })??;

        if let Some(error) = response.error {
            anyhow::bail!(
                "JSON-RPC error from {} ({}): {} (code: {})",
                self.base_url,
                method,
                error.message,
                error.code
            );
        }

        let result = response.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result).with_context(|| format!("Failed to deserialize {} result", method))
    }

    /// Current head block number.
    pub async fn get_block_number(&self) -> Result<u64> {
        let block_hex: String = self
            .json_rpc("eth_blockNumber", vec![])
            .await
            .context("eth_blockNumber failed")?;
        abi::parse_hex_u64(&block_hex).context("Failed to parse block number")
    }

    /// Queries logs emitted by `address` with the given event topic in a block range.
    ///
    /// # Arguments
    ///
    /// * `address` - Emitting contract
    /// * `topic0` - Event signature hash
    /// * `from_block` - First block (inclusive)
    /// * `to_block` - Last block (inclusive)
    pub async fn get_logs(
        &self,
        address: &str,
        topic0: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EvmLog>> {
        let filter = serde_json::json!({
            "address": address,
            "topics": [topic0],
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        });

        self.json_rpc("eth_getLogs", vec![filter])
            .await
            .context("eth_getLogs failed")
    }

    /// Receipt of a transaction, `None` if the node does not know it.
    pub async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        self.json_rpc("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
            .await
            .context("eth_getTransactionReceipt failed")
    }

    /// Executes a read-only call against `to` at the latest block.
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>> {
        let result: String = self
            .json_rpc(
                "eth_call",
                vec![
                    serde_json::json!({
                        "to": to,
                        "data": abi::to_hex(data),
                    }),
                    serde_json::json!("latest"),
                ],
            )
            .await
            .with_context(|| format!("eth_call to {} failed", to))?;
        abi::hex_to_bytes(&result)
    }

    /// Dry-runs a transaction and returns the gas it would use.
    pub async fn estimate_gas(
        &self,
        from: &str,
        to: &str,
        data: &[u8],
        gas_price: Option<u64>,
    ) -> Result<u64> {
        let mut tx = serde_json::json!({
            "from": from,
            "to": to,
            "data": abi::to_hex(data),
        });
        if let Some(price) = gas_price {
            tx["gasPrice"] = serde_json::json!(format!("0x{:x}", price));
        }

        let gas_hex: String = self
            .json_rpc("eth_estimateGas", vec![tx])
            .await
            .context("eth_estimateGas failed")?;
        abi::parse_hex_u64(&gas_hex).context("Failed to parse gas estimate")
    }

    /// Pending nonce of `address`.
    pub async fn get_transaction_count(&self, address: &str) -> Result<u64> {
        let nonce_hex: String = self
            .json_rpc(
                "eth_getTransactionCount",
                vec![serde_json::json!(address), serde_json::json!("pending")],
            )
            .await
            .context("eth_getTransactionCount failed")?;
        abi::parse_hex_u64(&nonce_hex).context("Failed to parse nonce")
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let id_hex: String = self
            .json_rpc("eth_chainId", vec![])
            .await
            .context("eth_chainId failed")?;
        abi::parse_hex_u64(&id_hex).context("Failed to parse chain id")
    }

    /// Broadcasts a signed transaction and returns its hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String> {
        self.json_rpc(
            "eth_sendRawTransaction",
            vec![serde_json::json!(abi::to_hex(raw_tx))],
        )
        .await
        .context("eth_sendRawTransaction failed")
    }
}
