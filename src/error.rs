//! Error taxonomy for swap validation, submission and governance confirmation.

use ethereum_types::U256;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification used for logging and operator reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// RPC failure, missing receipt or missing contract state
    Transient,
    /// The swap itself is malformed and will never be signed
    InvalidData,
    /// The hub rejected the dry run
    Estimation,
    /// The transaction could not be delivered
    Broadcast,
}

/// Transaction submission failures.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("gas estimation failed: {0}")]
    Estimation(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("broadcast timed out after {0}ms")]
    Timeout(u64),
}

/// Failures of one swap validation attempt.
///
/// Every variant is terminal for the attempt. Transient ones may succeed if a
/// later relay event for the same swap is observed.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("RPC failure: {0:#}")]
    Rpc(#[from] anyhow::Error),

    #[error("No Transaction Receipt for {0}")]
    ReceiptNotFound(String),

    #[error("missing contract state: {0}")]
    MissingContractState(String),

    #[error("Invalid Transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid Transaction: {count} deposits match depositId {deposit_id}")]
    AmbiguousDeposit { deposit_id: U256, count: usize },

    #[error("Invalid Transaction (event params): missing {0}")]
    MissingField(&'static str),

    #[error("Invalid toAddress ( {chain}, {address} )")]
    InvalidAddress { chain: String, address: String },

    #[error("Invalid data ( {chain}, {payload} )")]
    InvalidPayload { chain: String, payload: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl SwapError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SwapError::Rpc(_)
            | SwapError::ReceiptNotFound(_)
            | SwapError::MissingContractState(_)
            | SwapError::Signing(_) => FailureKind::Transient,
            SwapError::InvalidTransaction(_)
            | SwapError::AmbiguousDeposit { .. }
            | SwapError::MissingField(_)
            | SwapError::InvalidAddress { .. }
            | SwapError::InvalidPayload { .. } => FailureKind::InvalidData,
            SwapError::Submission(SubmissionError::Estimation(_)) => FailureKind::Estimation,
            SwapError::Submission(_) => FailureKind::Broadcast,
        }
    }
}

/// Governance confirmation failures.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("no governance chain configured")]
    NotConfigured,

    #[error("Invalid Transaction Id: {0}")]
    InvalidTransactionId(U256),

    #[error("Invalid multisig address: {0}")]
    InvalidMultisig(String),

    #[error("RPC failure: {0:#}")]
    Rpc(#[from] anyhow::Error),

    #[error("gas price unavailable: {0}")]
    GasOracle(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
