//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_deposit_log, build_relay_event, build_relay_log, build_test_config, build_test_context,
    build_validator_identity, mount_fake_chain, rpc_requests, with_chain, DepositFixture, FakeChain,
    DUMMY_BRIDGE_MULTISIG_ADDR, DUMMY_BROADCAST_TX_HASH, DUMMY_DEPOSITOR_ADDR, DUMMY_GOVERNANCE_ID,
    DUMMY_GOVERNANCE_VAULT_ADDR, DUMMY_GOV_MULTISIG_ADDR, DUMMY_HUB_CONTRACT_ADDR, DUMMY_HUB_TX_HASH,
    DUMMY_MINTER_ADDR, DUMMY_RECIPIENT_ADDR, DUMMY_SOURCE_TX_HASH, DUMMY_TOKEN_ADDR,
    DUMMY_VALIDATOR_ADDR, DUMMY_VALIDATOR_KEY,
};
