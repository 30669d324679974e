//! Submission Adapter
//!
//! Common path for every state-changing call the validator makes: dry-run the
//! call with `eth_estimateGas`, pick the gas limit according to a policy, hand the
//! transaction to the broadcaster and record progress on success.

use ethereum_types::H160;
use tracing::{error, info};

use crate::abi;
use crate::broadcaster::TransactionBroadcaster;
use crate::crypto::EvmAccount;
use crate::error::SubmissionError;
use crate::status::StatusRegistry;

/// Gas limit used for hub swap submissions regardless of the estimate.
pub const FIXED_GAS_LIMIT: u64 = 99_999_999;

/// How gas price and gas limit are chosen for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPolicy {
    /// Gas price 0 and a fixed gas limit; the estimate only gates the send
    FixedCeiling,
    /// Oracle gas price and `estimate * multiplier` as gas limit
    EstimateMultiplier { multiplier: u64, gas_price: u64 },
}

impl GasPolicy {
    pub fn gas_price(&self) -> u64 {
        match self {
            GasPolicy::FixedCeiling => 0,
            GasPolicy::EstimateMultiplier { gas_price, .. } => *gas_price,
        }
    }

    pub fn gas_limit(&self, estimate: u64) -> u64 {
        match self {
            GasPolicy::FixedCeiling => FIXED_GAS_LIMIT,
            GasPolicy::EstimateMultiplier { multiplier, .. } => estimate.saturating_mul(*multiplier),
        }
    }
}

/// An encoded contract call.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub to: H160,
    /// Method name, used for logging and progress reporting
    pub method: &'static str,
    pub data: Vec<u8>,
}

/// Where to record progress once a submission is accepted.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub chain: String,
    /// Triggering block, if the submission was block driven
    pub block: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SubmissionAdapter {
    broadcaster: TransactionBroadcaster,
    status: StatusRegistry,
}

impl SubmissionAdapter {
    pub fn new(broadcaster: TransactionBroadcaster, status: StatusRegistry) -> Self {
        Self {
            broadcaster,
            status,
        }
    }

    /// Estimates, sends and reports one call.
    ///
    /// # Arguments
    ///
    /// * `call` - Target contract, method name and calldata
    /// * `sender` - Account that signs and pays for the transaction
    /// * `policy` - Gas price and limit selection
    /// * `progress` - Progress entry to publish on success
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Transaction hash
    /// * `Err(SubmissionError::Estimation)` - Dry run failed, nothing was sent
    /// * `Err(SubmissionError::Broadcast | Timeout)` - Send failed
    pub async fn submit(
        &self,
        call: &ContractCall,
        sender: &EvmAccount,
        policy: GasPolicy,
        progress: Option<ProgressReport>,
    ) -> Result<String, SubmissionError> {
        let to = abi::hex_address(&call.to);
        let gas_price = policy.gas_price();

        let estimate = self
            .broadcaster
            .client()
            .estimate_gas(&sender.address_hex(), &to, &call.data, Some(gas_price))
            .await
            .map_err(|e| {
                error!("{} estimateGas error: {:#}", call.method, e);
                SubmissionError::Estimation(format!("{:#}", e))
            })?;

        let gas_limit = policy.gas_limit(estimate);
        let tx_hash = self
            .broadcaster
            .send(sender, call.to, &call.data, gas_price, gas_limit)
            .await?;

        info!(
            "{} submitted: tx={}, from={}, gas_limit={}",
            call.method,
            tx_hash,
            sender.address_hex(),
            gas_limit
        );

        if let Some(progress) = progress {
            self.status
                .report_progress(&progress.chain, call.method, progress.block)
                .await;
        }

        Ok(tx_hash)
    }
}
