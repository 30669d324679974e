//! Unit tests for the EVM JSON-RPC client
//!
//! These tests run the client against a mock node and verify request shapes,
//! result parsing and error propagation.

use bridge_validator::evm_client::EvmClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{mount_fake_chain, rpc_requests, FakeChain, DUMMY_SOURCE_TX_HASH};

// ============================================================================
// BASIC QUERIES
// ============================================================================

/// Test that block numbers are parsed from hex quantities
/// Why: Heights drive both the tracker and the confirmation gate
#[tokio::test]
async fn test_get_block_number() {
    let server = mount_fake_chain(FakeChain::new().with_block_number(0x1b4)).await;
    let client = EvmClient::new(&server.uri(), 1_000).unwrap();

    assert_eq!(client.get_block_number().await.unwrap(), 436);
}

/// Test that the chain id is read from the node
/// Why: Startup compares it with the id transactions are signed for
#[tokio::test]
async fn test_get_chain_id() {
    let server = mount_fake_chain(FakeChain::new()).await;
    let client = EvmClient::new(&server.uri(), 1_000).unwrap();

    assert_eq!(client.chain_id().await.unwrap(), 1337);
    assert_eq!(rpc_requests(&server, "eth_chainId").await.len(), 1);
}

/// Test that JSON-RPC errors carry the node message
/// Why: Operators need the node's reason in logs
#[tokio::test]
async fn test_json_rpc_error_is_reported() {
    let server = mount_fake_chain(FakeChain::new().with_estimate_gas_error("execution reverted: bad sig")).await;
    let client = EvmClient::new(&server.uri(), 1_000).unwrap();

    let err = client
        .estimate_gas(
            "0x0000000000000000000000000000000000000009",
            "0x0000000000000000000000000000000000000001",
            &[0x01],
            Some(0),
        )
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("execution reverted: bad sig"));
}

/// Test that the estimate request carries the gas price as a hex quantity
/// Why: The hub runs with a zero gas price and the dry run must match
#[tokio::test]
async fn test_estimate_gas_sends_gas_price() {
    let server = mount_fake_chain(FakeChain::new().with_estimate_gas(0x5208)).await;
    let client = EvmClient::new(&server.uri(), 1_000).unwrap();

    let gas = client
        .estimate_gas(
            "0x0000000000000000000000000000000000000009",
            "0x0000000000000000000000000000000000000001",
            &[0xab, 0xcd],
            Some(0),
        )
        .await
        .unwrap();
    assert_eq!(gas, 21_000);

    let requests = rpc_requests(&server, "eth_estimateGas").await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["params"][0]["gasPrice"], "0x0");
    assert_eq!(requests[0]["params"][0]["data"], "0xabcd");
}

// ============================================================================
// RECEIPTS
// ============================================================================

/// Test receipt lookup for unknown, pending and mined transactions
/// Why: Correlation distinguishes "not yet mined" from "mined at block N"
#[tokio::test]
async fn test_transaction_receipt_states() {
    let pending = "0x00000000000000000000000000000000000000000000000000000000000000ff";
    let server = mount_fake_chain(
        FakeChain::new()
            .with_receipt(DUMMY_SOURCE_TX_HASH, 77)
            .with_pending_receipt(pending),
    )
    .await;
    let client = EvmClient::new(&server.uri(), 1_000).unwrap();

    let mined = client.get_transaction_receipt(DUMMY_SOURCE_TX_HASH).await.unwrap().unwrap();
    assert_eq!(mined.mined_block(), Some(77));

    let pending = client.get_transaction_receipt(pending).await.unwrap().unwrap();
    assert_eq!(pending.mined_block(), None);

    let unknown = client
        .get_transaction_receipt("0x0000000000000000000000000000000000000000000000000000000000000abc")
        .await
        .unwrap();
    assert!(unknown.is_none());
}

// ============================================================================
// LOGS
// ============================================================================

/// Test the eth_getLogs filter shape
/// Why: Nodes reject filters with decimal block numbers
#[tokio::test]
async fn test_get_logs_filter_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_getLogs",
            "params": [{
                "address": "0x0000000000000000000000000000000000000001",
                "topics": ["0x1111111111111111111111111111111111111111111111111111111111111111"],
                "fromBlock": "0x64",
                "toBlock": "0x64"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [{
                "address": "0x0000000000000000000000000000000000000001",
                "topics": ["0x1111111111111111111111111111111111111111111111111111111111111111"],
                "data": "0x",
                "blockNumber": "0x64",
                "transactionHash": DUMMY_SOURCE_TX_HASH
            }]
        })))
        .mount(&server)
        .await;

    let client = EvmClient::new(&server.uri(), 1_000).unwrap();
    let logs = client
        .get_logs(
            "0x0000000000000000000000000000000000000001",
            "0x1111111111111111111111111111111111111111111111111111111111111111",
            100,
            100,
        )
        .await
        .unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].block_number, "0x64");
    assert!(logs[0].log_index.is_none());
}

// ============================================================================
// TRANSPORT FAILURES
// ============================================================================

/// Test that an unreachable node yields an error, not a hang
/// Why: Every RPC is bounded by the configured timeout
#[tokio::test]
async fn test_unreachable_node_errors() {
    let client = EvmClient::new("http://127.0.0.1:1", 500).unwrap();
    assert!(client.get_block_number().await.is_err());
}

/// Test that a slow node hits the request timeout
/// Why: A stalled endpoint must not stall the pipeline
#[tokio::test]
async fn test_slow_node_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": "0x1"}))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = EvmClient::new(&server.uri(), 100).unwrap();
    assert!(client.get_block_number().await.is_err());
}
