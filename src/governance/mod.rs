//! Governance Confirmation Flow
//!
//! The validator is also an owner of the governance multisig wallet. Operators
//! ask it, through the API, to describe a pending multisig transaction or to add
//! its confirmation. Multisig state is read fresh on every request.

pub mod decoder;

use ethereum_types::{H160, U256};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::abi::{self, ParamType, Token};
use crate::broadcaster::TransactionBroadcaster;
use crate::config::{Config, GovernanceChainConfig, GovernanceConfig};
use crate::crypto::ValidatorIdentity;
use crate::error::GovernanceError;
use crate::evm_client::EvmClient;
use crate::gas_oracle::GasPriceOracle;
use crate::status::StatusRegistry;
use crate::submission::{ContractCall, GasPolicy, ProgressReport, SubmissionAdapter};

// ============================================================================
// MULTISIG METHODS
// ============================================================================

pub const TRANSACTIONS: &str = "transactions(uint256)";
pub const GET_CONFIRMATIONS: &str = "getConfirmations(uint256)";
pub const REQUIRED: &str = "required()";
pub const CONFIRM_TRANSACTION: &str = "confirmTransaction(uint256)";

/// Status key used when a confirmation is submitted.
pub const GOVERNANCE_PROGRESS_KEY: &str = "GOV";

/// Gas limit multiplier applied to the confirmation estimate.
pub const CONFIRM_GAS_MULTIPLIER: u64 = 2;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Multisig transaction state as read from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceTransaction {
    pub transaction_id: U256,
    pub destination: H160,
    pub value: U256,
    pub data: Vec<u8>,
    pub executed: bool,
    pub confirmed_validators: Vec<H160>,
    pub required: U256,
}

impl GovernanceTransaction {
    pub fn is_confirmed_by(&self, validator: H160) -> bool {
        self.confirmed_validators.iter().any(|v| *v == validator)
    }

    /// Confirmations already equal the threshold.
    pub fn threshold_reached(&self) -> bool {
        U256::from(self.confirmed_validators.len()) == self.required
    }
}

/// Operator-facing description of a multisig transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub transaction_id: String,
    pub destination: String,
    pub destination_contract: String,
    pub value: String,
    pub data: String,
    pub executed: bool,
    pub my_address: String,
    pub my_confirmation: bool,
    pub multisig_requirement: String,
    pub confirmed_validators: Vec<String>,
    pub decoded_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfirmOutcome {
    /// This validator already confirmed, or the threshold is already met
    AlreadyConfirmed,
    Submitted { tx_hash: String },
}

// ============================================================================
// GOVERNANCE CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct GovernanceClient {
    chain_name: String,
    client: EvmClient,
    oracle: GasPriceOracle,
    submitter: SubmissionAdapter,
    identity: Arc<ValidatorIdentity>,
    governance: GovernanceConfig,
    contracts: BTreeMap<String, String>,
}

impl GovernanceClient {
    /// Builds a client for the configured governance chain.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(GovernanceClient))` - `[governance_chain]` is configured
    /// * `Ok(None)` - No governance chain configured
    /// * `Err(anyhow::Error)` - Client construction failed
    pub fn from_config(
        config: &Config,
        identity: Arc<ValidatorIdentity>,
        status: StatusRegistry,
    ) -> anyhow::Result<Option<Self>> {
        let Some(ref chain) = config.governance_chain else {
            return Ok(None);
        };
        Self::new(config, chain, identity, status).map(Some)
    }

    pub fn new(
        config: &Config,
        chain: &GovernanceChainConfig,
        identity: Arc<ValidatorIdentity>,
        status: StatusRegistry,
    ) -> anyhow::Result<Self> {
        let timeout_ms = config.validator.rpc_timeout_ms;
        let client = EvmClient::new(&chain.rpc_url, timeout_ms)?;
        let oracle = GasPriceOracle::new(&chain.gas_oracle_url, timeout_ms)?;
        let broadcaster = TransactionBroadcaster::new(client.clone(), chain.chain_id, config.broadcaster.clone());

        Ok(Self {
            chain_name: chain.name.clone(),
            client,
            oracle,
            submitter: SubmissionAdapter::new(broadcaster, status),
            identity,
            governance: config.governance.clone(),
            contracts: chain.contracts.clone(),
        })
    }

    async fn call_multisig(
        &self,
        multisig: H160,
        signature: &str,
        args: &[Token],
        outputs: &[ParamType],
    ) -> Result<Vec<Token>, GovernanceError> {
        let calldata = abi::encode_call(signature, args);
        let output = self.client.call(&abi::hex_address(&multisig), &calldata).await?;
        Ok(abi::decode(outputs, &output)?)
    }

    /// Reads transaction, threshold and confirmations of `tx_id`.
    ///
    /// A zero destination means the id does not exist.
    pub async fn read_transaction(&self, multisig: H160, tx_id: U256) -> Result<GovernanceTransaction, GovernanceError> {
        let invalid = || GovernanceError::InvalidTransactionId(tx_id);

        let mut fields = self
            .call_multisig(
                multisig,
                TRANSACTIONS,
                &[Token::Uint(tx_id)],
                &[ParamType::Address, ParamType::Uint, ParamType::Bytes, ParamType::Bool],
            )
            .await?
            .into_iter();

        let destination = fields.next().and_then(Token::into_address).ok_or_else(invalid)?;
        if destination.is_zero() {
            return Err(invalid());
        }
        let value = fields.next().and_then(Token::into_uint).ok_or_else(invalid)?;
        let data = fields.next().and_then(Token::into_bytes).ok_or_else(invalid)?;
        let executed = fields.next().and_then(Token::into_bool).ok_or_else(invalid)?;

        let required = self
            .call_multisig(multisig, REQUIRED, &[], &[ParamType::Uint])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(invalid)?;

        let confirmed_validators = self
            .call_multisig(
                multisig,
                GET_CONFIRMATIONS,
                &[Token::Uint(tx_id)],
                &[ParamType::Array(Box::new(ParamType::Address))],
            )
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_array)
            .ok_or_else(invalid)?
            .into_iter()
            .filter_map(Token::into_address)
            .collect();

        Ok(GovernanceTransaction {
            transaction_id: tx_id,
            destination,
            value,
            data,
            executed,
            confirmed_validators,
            required,
        })
    }

    /// Human label for a transaction destination.
    ///
    /// Configured contracts whose name mentions the governance chain are matched
    /// first; the governance vault itself overrides any match.
    pub fn destination_label(&self, destination: H160) -> String {
        let destination_hex = abi::hex_address(&destination);
        let mut label = "Unknown Contract".to_string();

        if let Some((name, _)) = self.contracts.iter().find(|(name, address)| {
            !address.is_empty() && abi::addresses_match(address, &destination_hex) && name.contains(&self.chain_name)
        }) {
            label = name.clone();
        }

        if abi::addresses_match(&self.governance.address, &destination_hex) {
            label = format!("{} Vault", self.governance.chain);
        }

        label
    }

    /// Describes a pending multisig transaction for operators.
    pub async fn get_transaction(&self, multisig: H160, tx_id: U256) -> Result<TransactionView, GovernanceError> {
        let tx = self.read_transaction(multisig, tx_id).await?;
        let me = self.identity.address();

        Ok(TransactionView {
            transaction_id: tx.transaction_id.to_string(),
            destination: abi::hex_address(&tx.destination),
            destination_contract: self.destination_label(tx.destination),
            value: tx.value.to_string(),
            data: abi::to_hex(&tx.data),
            executed: tx.executed,
            my_address: abi::hex_address(&me),
            my_confirmation: tx.is_confirmed_by(me),
            multisig_requirement: tx.required.to_string(),
            confirmed_validators: tx.confirmed_validators.iter().map(abi::hex_address).collect(),
            decoded_data: decoder::describe_call_data(&tx.data),
        })
    }

    /// Adds this validator's confirmation to `tx_id` unless it is redundant.
    ///
    /// # Returns
    ///
    /// * `Ok(ConfirmOutcome::AlreadyConfirmed)` - Nothing was sent
    /// * `Ok(ConfirmOutcome::Submitted)` - `confirmTransaction` broadcast
    /// * `Err(GovernanceError)` - Invalid id, oracle, estimation or broadcast failure
    pub async fn confirm(&self, multisig: H160, tx_id: U256) -> Result<ConfirmOutcome, GovernanceError> {
        let tx = self.read_transaction(multisig, tx_id).await?;
        let me = self.identity.address();

        if tx.is_confirmed_by(me) || tx.threshold_reached() {
            info!("[{}] Transaction {} Already Confirmed", self.chain_name, tx_id);
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        let gas_price = self
            .oracle
            .confirmation_gas_price()
            .await
            .map_err(|e| GovernanceError::GasOracle(format!("{:#}", e)))?;

        let call = ContractCall {
            to: multisig,
            method: "confirmTransaction",
            data: abi::encode_call(CONFIRM_TRANSACTION, &[Token::Uint(tx_id)]),
        };
        let policy = GasPolicy::EstimateMultiplier {
            multiplier: CONFIRM_GAS_MULTIPLIER,
            gas_price,
        };
        let progress = ProgressReport {
            chain: GOVERNANCE_PROGRESS_KEY.to_string(),
            block: None,
        };

        let tx_hash = self
            .submitter
            .submit(&call, self.identity.account(), policy, Some(progress))
            .await?;

        Ok(ConfirmOutcome::Submitted { tx_hash })
    }
}
