//! Bridge Domain Types
//!
//! Relay events observed on the hub, deposits observed on source chains and the
//! transfer variants that decide which uint fields are packed into a swap message.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

// ============================================================================
// TRANSFER KIND
// ============================================================================

/// Fungible and non-fungible swaps share the pipeline and differ only in
/// event names, the contract method and the second packed uint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    Fungible,
    NonFungible,
}

impl TransferKind {
    pub const ALL: [TransferKind; 2] = [TransferKind::Fungible, TransferKind::NonFungible];

    /// Hub event announcing a swap of this kind.
    pub fn relay_event(&self) -> &'static str {
        match self {
            TransferKind::Fungible => "SwapRelay",
            TransferKind::NonFungible => "SwapNFTRelay",
        }
    }

    /// Source-chain event that backs a swap of this kind.
    ///
    /// The chain hosting the governance vault emits deposits; every other chain
    /// emits swap requests from its minter.
    pub fn deposit_event(&self, is_governance_chain: bool) -> &'static str {
        match (self, is_governance_chain) {
            (TransferKind::Fungible, true) => "Deposit",
            (TransferKind::NonFungible, true) => "DepositNFT",
            (TransferKind::Fungible, false) => "SwapRequest",
            (TransferKind::NonFungible, false) => "SwapRequestNFT",
        }
    }

    /// Hub contract method that records a validator signature.
    pub fn validate_method(&self) -> &'static str {
        match self {
            TransferKind::Fungible => "validateSwap",
            TransferKind::NonFungible => "validateSwapNFT",
        }
    }
}

// ============================================================================
// RELAY EVENT
// ============================================================================

/// Decoded `SwapRelay` / `SwapNFTRelay` log from the hub contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEvent {
    pub kind: TransferKind,
    pub from_chain: String,
    pub to_chain: String,
    pub from_addr: Vec<u8>,
    pub to_addr: Vec<u8>,
    pub token: Vec<u8>,
    /// `[governanceId, sourceTxHash]`
    pub bytes32s: Vec<[u8; 32]>,
    /// `[amount, decimal or tokenId, depositId]`
    pub uints: Vec<U256>,
    pub data: Vec<u8>,
    /// Hub block the relay was emitted in
    pub block_number: u64,
    /// Hub transaction that emitted the relay
    pub transaction_hash: String,
}

impl BridgeEvent {
    pub fn governance_id(&self) -> Option<&[u8; 32]> {
        self.bytes32s.first()
    }

    pub fn source_tx_hash(&self) -> Option<&[u8; 32]> {
        self.bytes32s.get(1)
    }

    pub fn deposit_id(&self) -> Option<U256> {
        self.uints.get(2).copied()
    }
}

// ============================================================================
// DEPOSIT RECORD
// ============================================================================

/// Amount plus the kind-specific second uint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Fungible { amount: U256, decimal: U256 },
    NonFungible { amount: U256, token_id: U256 },
}

impl Transfer {
    pub fn kind(&self) -> TransferKind {
        match self {
            Transfer::Fungible { .. } => TransferKind::Fungible,
            Transfer::NonFungible { .. } => TransferKind::NonFungible,
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            Transfer::Fungible { amount, .. } | Transfer::NonFungible { amount, .. } => *amount,
        }
    }

    /// Packed uint array for the swap message: `[amount, decimal|tokenId, depositId]`.
    pub fn uints(&self, deposit_id: U256) -> Vec<U256> {
        match self {
            Transfer::Fungible { amount, decimal } => vec![*amount, *decimal, deposit_id],
            Transfer::NonFungible { amount, token_id } => vec![*amount, *token_id, deposit_id],
        }
    }
}

/// Deposit fields as decoded from a source-chain log, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawDeposit {
    pub to_chain: String,
    pub from_addr: Vec<u8>,
    pub to_addr: Vec<u8>,
    /// Zero address for native-coin deposits
    pub token: Vec<u8>,
    pub amount: Option<U256>,
    pub decimal: Option<U256>,
    pub token_id: Option<U256>,
    pub deposit_id: U256,
    pub data: Vec<u8>,
}

/// Source-chain deposit correlated with a relay event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRecord {
    pub to_chain: String,
    pub from_addr: Vec<u8>,
    pub to_addr: Vec<u8>,
    pub token: Vec<u8>,
    pub transfer: Transfer,
    pub deposit_id: U256,
    pub data: Vec<u8>,
    /// Source block the deposit was included in
    pub block_number: u64,
}

impl DepositRecord {
    /// Builds a deposit record, rejecting any missing required field.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which second uint (`decimal` or `tokenId`) is required
    /// * `raw` - Decoded event fields
    /// * `block_number` - Source block of the deposit
    ///
    /// # Returns
    ///
    /// * `Ok(DepositRecord)` - All required fields are present
    /// * `Err(SwapError::MissingField)` - Naming the first absent field
    pub fn new(kind: TransferKind, raw: RawDeposit, block_number: u64) -> Result<Self, SwapError> {
        if raw.to_chain.is_empty() {
            return Err(SwapError::MissingField("toChain"));
        }
        if raw.from_addr.is_empty() {
            return Err(SwapError::MissingField("fromAddr"));
        }
        if raw.to_addr.is_empty() {
            return Err(SwapError::MissingField("toAddr"));
        }
        if raw.token.is_empty() {
            return Err(SwapError::MissingField("token"));
        }
        let amount = raw.amount.ok_or(SwapError::MissingField("amount"))?;

        let transfer = match kind {
            TransferKind::Fungible => Transfer::Fungible {
                amount,
                decimal: raw.decimal.ok_or(SwapError::MissingField("decimal"))?,
            },
            TransferKind::NonFungible => Transfer::NonFungible {
                amount,
                token_id: raw.token_id.ok_or(SwapError::MissingField("tokenId"))?,
            },
        };

        Ok(Self {
            to_chain: raw.to_chain,
            from_addr: raw.from_addr,
            to_addr: raw.to_addr,
            token: raw.token,
            transfer,
            deposit_id: raw.deposit_id,
            data: raw.data,
            block_number,
        })
    }

    pub fn uints(&self) -> Vec<U256> {
        self.transfer.uints(self.deposit_id)
    }
}
