//! Bridge Validator Library
//!
//! This crate implements a validator node for a multi-chain asset bridge. It watches
//! relay events on the hub chain, correlates each one with a deposit on its source
//! chain, waits for the confirmation depth and submits this validator's signature
//! toward the destination multisig threshold. The same node confirms pending
//! governance multisig transactions on operator request.

pub mod abi;
pub mod address_format;
pub mod api;
pub mod broadcaster;
pub mod config;
pub mod context;
pub mod crypto;
pub mod error;
pub mod evm_client;
pub mod gas_oracle;
pub mod governance;
pub mod hasher;
pub mod monitor;
pub mod status;
pub mod submission;
pub mod tracker;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use config::{ApiConfig, Config, GovernanceConfig, HubConfig, SwapChainConfig};
pub use context::ChainContext;
pub use crypto::{EphemeralAccountFactory, EvmAccount, SignaturePayload, ValidatorIdentity};
pub use error::{FailureKind, GovernanceError, SubmissionError, SwapError};
pub use governance::{ConfirmOutcome, GovernanceClient};
pub use monitor::ChainWatcher;
pub use status::{ConnectionStatus, StatusRegistry};
pub use tracker::BlockRangeTracker;
pub use types::{BridgeEvent, DepositRecord, Transfer, TransferKind};
pub use validator::SwapOutcome;
