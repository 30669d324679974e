//! Shared test helpers for unit tests
//!
//! This module provides helper functions used by unit tests.
//!
//! The module is organized into several categories:
//! - **Constants**: Dummy addresses, ids and keys
//! - **Configuration Builders**: Test configurations and per-chain contexts
//! - **Event Builders**: Relay events, relay logs and source deposit logs
//! - **Fake Chain**: A wiremock responder that answers EVM JSON-RPC calls

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use bridge_validator::abi::{self, Token};
use bridge_validator::config::{BroadcasterConfig, Config, SwapChainConfig};
use bridge_validator::context::ChainContext;
use bridge_validator::crypto::ValidatorIdentity;
use bridge_validator::monitor::ingest;
use bridge_validator::status::StatusRegistry;
use bridge_validator::types::{BridgeEvent, TransferKind};
use bridge_validator::validator::correlator;
use ethereum_types::U256;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ============================================================================
// CONSTANTS
// ============================================================================

// -------------------------------- KEYS ----------------------------------

/// Validator private key (scalar 1)
pub const DUMMY_VALIDATOR_KEY: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Address derived from `DUMMY_VALIDATOR_KEY`
pub const DUMMY_VALIDATOR_ADDR: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";

// ------------------------------ CONTRACTS -------------------------------

/// Hub contract address (matches `Config::default()`)
pub const DUMMY_HUB_CONTRACT_ADDR: &str = "0x0000000000000000000000000000000000000001";

/// Governance vault on ETH (matches `Config::default()`)
pub const DUMMY_GOVERNANCE_VAULT_ADDR: &str = "0x0000000000000000000000000000000000000002";

/// Minter contract on non-governance source chains
pub const DUMMY_MINTER_ADDR: &str = "0x0000000000000000000000000000000000000003";

/// Destination multisig returned by `getBridgeMig`
pub const DUMMY_BRIDGE_MULTISIG_ADDR: &str = "0x0000000000000000000000000000000000000004";

/// Governance multisig wallet
pub const DUMMY_GOV_MULTISIG_ADDR: &str = "0x0000000000000000000000000000000000000005";

/// Token contract on the source chain
pub const DUMMY_TOKEN_ADDR: &str = "0x000000000000000000000000000000000000000b";

// -------------------------------- USERS ---------------------------------

pub const DUMMY_DEPOSITOR_ADDR: &str = "0x0000000000000000000000000000000000000009";

pub const DUMMY_RECIPIENT_ADDR: &str = "0x000000000000000000000000000000000000000a";

// -------------------------------- OTHER ---------------------------------

/// Governance id (matches `Config::default()`)
pub const DUMMY_GOVERNANCE_ID: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Source chain deposit transaction
pub const DUMMY_SOURCE_TX_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000012";

/// Hub transaction that emitted the relay
pub const DUMMY_HUB_TX_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000013";

/// Hash returned by the fake chain for every accepted raw transaction
pub const DUMMY_BROADCAST_TX_HASH: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000ab";

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Default configuration pointed at `hub_url`, with a broadcaster that gives up fast.
pub fn build_test_config(hub_url: &str) -> Config {
    let mut config = Config::default();
    config.hub.rpc_url = hub_url.to_string();
    config.hub.polling_interval_ms = 10;
    config.validator.rpc_timeout_ms = 2_000;
    config.broadcaster = BroadcasterConfig {
        timeout_ms: 5_000,
        max_retries: 0,
        retry_delay_ms: 10,
    };
    config
}

/// Adds a watched chain; ETH uses the governance vault, every other chain the minter.
pub fn with_chain(mut config: Config, name: &str, rpc_url: &str, confirmations: u64) -> Config {
    let vault_addr = if name == config.governance.chain {
        DUMMY_GOVERNANCE_VAULT_ADDR
    } else {
        DUMMY_MINTER_ADDR
    };
    config.chains.push(SwapChainConfig {
        name: name.to_string(),
        rpc_url: rpc_url.to_string(),
        vault_addr: vault_addr.to_string(),
        confirmations,
    });
    config
}

pub fn build_validator_identity() -> Arc<ValidatorIdentity> {
    Arc::new(ValidatorIdentity::from_hex(DUMMY_VALIDATOR_KEY).unwrap())
}

/// Context for `chain_name` whose hub and source RPCs are the given mock servers.
pub fn build_test_context(hub_url: &str, source_url: &str, chain_name: &str, confirmations: u64) -> ChainContext {
    let config = with_chain(build_test_config(hub_url), chain_name, source_url, confirmations);
    let chain = config.chain(chain_name).unwrap().clone();
    ChainContext::new(&config, &chain, build_validator_identity(), StatusRegistry::new()).unwrap()
}

// ============================================================================
// EVENT BUILDERS
// ============================================================================

/// Fields of one source-chain deposit.
#[derive(Debug, Clone)]
pub struct DepositFixture {
    pub to_chain: String,
    pub from_addr: String,
    pub to_addr: Vec<u8>,
    pub token: String,
    /// decimal (fungible) or tokenId (non-fungible)
    pub second: u64,
    pub amount: u64,
    pub deposit_id: u64,
    pub data: Vec<u8>,
}

impl DepositFixture {
    /// A complete fungible deposit toward BSC.
    pub fn new(deposit_id: u64) -> Self {
        Self {
            to_chain: "BSC".to_string(),
            from_addr: DUMMY_DEPOSITOR_ADDR.to_string(),
            to_addr: abi::hex_to_bytes(DUMMY_RECIPIENT_ADDR).unwrap(),
            token: DUMMY_TOKEN_ADDR.to_string(),
            second: 18,
            amount: 1_000,
            deposit_id,
            data: Vec::new(),
        }
    }

    /// ABI-encoded event data in the layout of the vault or minter event.
    pub fn encode(&self, is_governance_chain: bool) -> Vec<u8> {
        let token = abi::parse_address(&self.token).unwrap();
        let mut tokens = vec![
            Token::String(self.to_chain.clone()),
            Token::Address(abi::parse_address(&self.from_addr).unwrap()),
            Token::Bytes(self.to_addr.clone()),
        ];
        if is_governance_chain {
            tokens.push(Token::Address(token));
        } else {
            tokens.push(Token::Bytes(token.as_bytes().to_vec()));
            tokens.push(Token::Address(token));
        }
        tokens.push(Token::Uint(U256::from(self.second)));
        tokens.push(Token::Uint(U256::from(self.amount)));
        tokens.push(Token::Uint(U256::from(self.deposit_id)));
        tokens.push(Token::Bytes(self.data.clone()));
        abi::encode(&tokens)
    }
}

/// Relay event on the hub announcing `fixture` as coming from `from_chain`.
pub fn build_relay_event(kind: TransferKind, from_chain: &str, fixture: &DepositFixture, block: u64) -> BridgeEvent {
    BridgeEvent {
        kind,
        from_chain: from_chain.to_string(),
        to_chain: fixture.to_chain.clone(),
        from_addr: abi::hex_to_bytes(&fixture.from_addr).unwrap(),
        to_addr: fixture.to_addr.clone(),
        token: abi::hex_to_bytes(&fixture.token).unwrap(),
        bytes32s: vec![
            abi::parse_bytes32(DUMMY_GOVERNANCE_ID).unwrap(),
            abi::parse_bytes32(DUMMY_SOURCE_TX_HASH).unwrap(),
        ],
        uints: vec![
            U256::from(fixture.amount),
            U256::from(fixture.second),
            U256::from(fixture.deposit_id),
        ],
        data: fixture.data.clone(),
        block_number: block,
        transaction_hash: DUMMY_HUB_TX_HASH.to_string(),
    }
}

/// JSON-RPC log the hub contract would emit for `event`.
pub fn build_relay_log(event: &BridgeEvent) -> Value {
    json!({
        "address": DUMMY_HUB_CONTRACT_ADDR,
        "topics": [abi::event_topic(&ingest::relay_signature(event.kind))],
        "data": abi::to_hex(&ingest::encode_relay_data(event)),
        "blockNumber": format!("0x{:x}", event.block_number),
        "transactionHash": event.transaction_hash,
        "logIndex": "0x0"
    })
}

/// JSON-RPC log a vault or minter would emit for `fixture`.
pub fn build_deposit_log(
    emitter: &str,
    kind: TransferKind,
    is_governance_chain: bool,
    fixture: &DepositFixture,
    block: u64,
) -> Value {
    json!({
        "address": emitter,
        "topics": [abi::event_topic(&correlator::deposit_signature(kind, is_governance_chain))],
        "data": abi::to_hex(&fixture.encode(is_governance_chain)),
        "blockNumber": format!("0x{:x}", block),
        "transactionHash": DUMMY_SOURCE_TX_HASH,
        "logIndex": "0x0"
    })
}

// ============================================================================
// FAKE CHAIN
// ============================================================================

/// Scripted EVM node answering the JSON-RPC methods the validator uses.
///
/// `eth_call` results are keyed by target address and 4-byte selector.
#[derive(Debug, Clone)]
pub struct FakeChain {
    pub block_number: Option<u64>,
    pub nonce: u64,
    pub receipts: HashMap<String, Value>,
    pub logs: Vec<Value>,
    pub calls: HashMap<(String, String), String>,
    pub estimate_gas: Result<u64, String>,
    pub send_raw: Result<String, String>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            block_number: Some(0),
            nonce: 0,
            receipts: HashMap::new(),
            logs: Vec::new(),
            calls: HashMap::new(),
            estimate_gas: Ok(21_000),
            send_raw: Ok(DUMMY_BROADCAST_TX_HASH.to_string()),
        }
    }

    pub fn with_block_number(mut self, block: u64) -> Self {
        self.block_number = Some(block);
        self
    }

    /// Makes `eth_blockNumber` fail.
    pub fn without_block_number(mut self) -> Self {
        self.block_number = None;
        self
    }

    pub fn with_receipt(mut self, tx_hash: &str, block: u64) -> Self {
        self.receipts.insert(
            tx_hash.to_lowercase(),
            json!({
                "transactionHash": tx_hash,
                "blockNumber": format!("0x{:x}", block),
                "status": "0x1"
            }),
        );
        self
    }

    /// Receipt of a transaction that is known but not mined yet.
    pub fn with_pending_receipt(mut self, tx_hash: &str) -> Self {
        self.receipts.insert(
            tx_hash.to_lowercase(),
            json!({
                "transactionHash": tx_hash,
                "blockNumber": null
            }),
        );
        self
    }

    pub fn with_log(mut self, log: Value) -> Self {
        self.logs.push(log);
        self
    }

    pub fn with_call(mut self, to: &str, signature: &str, output: Vec<u8>) -> Self {
        let selector = hex::encode(abi::selector(signature));
        self.calls
            .insert((to.to_lowercase(), selector), abi::to_hex(&output));
        self
    }

    pub fn with_estimate_gas(mut self, gas: u64) -> Self {
        self.estimate_gas = Ok(gas);
        self
    }

    pub fn with_estimate_gas_error(mut self, message: &str) -> Self {
        self.estimate_gas = Err(message.to_string());
        self
    }

    pub fn with_send_error(mut self, message: &str) -> Self {
        self.send_raw = Err(message.to_string());
        self
    }

    fn get_logs(&self, filter: &Value) -> Value {
        let address = filter["address"].as_str().unwrap_or_default();
        let topic = filter["topics"][0].as_str().unwrap_or_default();
        let from = abi::parse_hex_u64(filter["fromBlock"].as_str().unwrap_or("0x0")).unwrap_or(0);
        let to = abi::parse_hex_u64(filter["toBlock"].as_str().unwrap_or("0x0")).unwrap_or(u64::MAX);

        let logs: Vec<Value> = self
            .logs
            .iter()
            .filter(|log| abi::addresses_match(log["address"].as_str().unwrap_or_default(), address))
            .filter(|log| {
                log["topics"][0]
                    .as_str()
                    .is_some_and(|t| t.eq_ignore_ascii_case(topic))
            })
            .filter(|log| {
                let block = abi::parse_hex_u64(log["blockNumber"].as_str().unwrap_or("0x0")).unwrap_or(0);
                block >= from && block <= to
            })
            .cloned()
            .collect();
        json!(logs)
    }

    fn eth_call(&self, tx: &Value) -> Result<Value, String> {
        let to = tx["to"].as_str().unwrap_or_default().to_lowercase();
        let data = tx["data"].as_str().unwrap_or_default();
        let selector = data.strip_prefix("0x").unwrap_or(data).get(..8).unwrap_or_default();
        self.calls
            .get(&(to, selector.to_string()))
            .map(|output| json!(output))
            .ok_or_else(|| "execution reverted".to_string())
    }
}

fn rpc_result(id: &Value, result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    }))
}

fn rpc_error(id: &Value, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": -32000, "message": message }
    }))
}

impl Respond for FakeChain {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let id = body["id"].clone();
        let params = &body["params"];

        let result = match body["method"].as_str().unwrap_or_default() {
            "eth_blockNumber" => self
                .block_number
                .map(|b| json!(format!("0x{:x}", b)))
                .ok_or_else(|| "node unavailable".to_string()),
            "eth_chainId" => Ok(json!("0x539")),
            "eth_getTransactionReceipt" => {
                let hash = params[0].as_str().unwrap_or_default().to_lowercase();
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            "eth_getLogs" => Ok(self.get_logs(&params[0])),
            "eth_call" => self.eth_call(&params[0]),
            "eth_estimateGas" => self
                .estimate_gas
                .clone()
                .map(|gas| json!(format!("0x{:x}", gas))),
            "eth_getTransactionCount" => Ok(json!(format!("0x{:x}", self.nonce))),
            "eth_sendRawTransaction" => self.send_raw.clone().map(|hash| json!(hash)),
            other => Err(format!("method {} not found", other)),
        };

        match result {
            Ok(value) => rpc_result(&id, value),
            Err(message) => rpc_error(&id, &message),
        }
    }
}

/// Starts a mock server that answers every POST with `chain`.
pub async fn mount_fake_chain(chain: FakeChain) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chain)
        .mount(&server)
        .await;
    server
}

/// Bodies of every JSON-RPC request with the given method received by `server`.
pub async fn rpc_requests(server: &MockServer, rpc_method: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter(|body| body["method"] == rpc_method)
        .collect()
}
