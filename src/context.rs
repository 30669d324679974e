//! Per-chain execution context.
//!
//! Everything one swap pipeline needs is carried here explicitly: the chain's
//! configuration, RPC clients for the hub and the source chain, the validator
//! identity, the sender factory, the submission path and the status registry.

use anyhow::{Context, Result};
use ethereum_types::H160;
use std::sync::Arc;

use crate::abi;
use crate::broadcaster::TransactionBroadcaster;
use crate::config::{Config, SwapChainConfig};
use crate::crypto::{EphemeralAccountFactory, ValidatorIdentity};
use crate::evm_client::EvmClient;
use crate::status::StatusRegistry;
use crate::submission::SubmissionAdapter;

#[derive(Debug, Clone)]
pub struct ChainContext {
    /// Chain tag, e.g. "BSC"
    pub name: String,
    /// Vault (governance chain) or minter address on the source chain
    pub vault: H160,
    /// Required source confirmations
    pub confirmations: u64,
    /// Whether this chain hosts the governance vault
    pub is_governance_chain: bool,
    pub governance_id: [u8; 32],
    pub hub_contract: H160,
    pub polling_interval_ms: u64,
    pub hub_client: EvmClient,
    pub source_client: EvmClient,
    pub identity: Arc<ValidatorIdentity>,
    pub accounts: EphemeralAccountFactory,
    pub submitter: SubmissionAdapter,
    pub status: StatusRegistry,
}

impl ChainContext {
    /// Builds the context for one `[[chains]]` entry.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated service configuration
    /// * `chain` - The chain entry this context serves
    /// * `identity` - Shared validator identity
    /// * `status` - Shared status registry
    pub fn new(
        config: &Config,
        chain: &SwapChainConfig,
        identity: Arc<ValidatorIdentity>,
        status: StatusRegistry,
    ) -> Result<Self> {
        let timeout_ms = config.validator.rpc_timeout_ms;
        let hub_client = EvmClient::new(&config.hub.rpc_url, timeout_ms)
            .with_context(|| format!("Failed to create hub client for {}", chain.name))?;
        let source_client = EvmClient::new(&chain.rpc_url, timeout_ms)
            .with_context(|| format!("Failed to create source client for {}", chain.name))?;

        let broadcaster = TransactionBroadcaster::new(
            hub_client.clone(),
            config.hub.chain_id,
            config.broadcaster.clone(),
        );

        Ok(Self {
            name: chain.name.clone(),
            vault: abi::parse_address(&chain.vault_addr)?,
            confirmations: chain.confirmations,
            is_governance_chain: config.governance.chain == chain.name,
            governance_id: abi::parse_bytes32(&config.governance.id)?,
            hub_contract: abi::parse_address(&config.hub.hub_contract_addr)?,
            polling_interval_ms: config.hub.polling_interval_ms,
            hub_client,
            source_client,
            identity,
            accounts: EphemeralAccountFactory::new(),
            submitter: SubmissionAdapter::new(broadcaster, status.clone()),
            status,
        })
    }

    /// Status key for the source chain height, e.g. "BSC_MAINNET".
    pub fn source_height_key(&self) -> String {
        format!("{}_MAINNET", self.name)
    }
}
