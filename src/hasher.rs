//! Canonical swap message hashing.
//!
//! Every validator must produce byte-identical digests for the same swap, otherwise
//! signatures land under different hashes and the multisig threshold is never met.
//! The layout mirrors Solidity `sha256(abi.encodePacked(...))` in the hub contract.

use ethereum_types::{H160, U256};
use sha2::{Digest, Sha256};

use crate::types::DepositRecord;

/// Fields of one swap as the hub contract hashes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapMessage {
    pub hub_contract: H160,
    pub from_chain: String,
    pub to_chain: String,
    pub from_addr: Vec<u8>,
    pub to_addr: Vec<u8>,
    pub token: Vec<u8>,
    pub bytes32s: Vec<[u8; 32]>,
    pub uints: Vec<U256>,
    pub data: Vec<u8>,
}

impl SwapMessage {
    /// Assembles the message for a correlated deposit.
    ///
    /// `bytes32s` is `[governanceId, sourceTxHash]`; the uints come from the deposit.
    pub fn from_deposit(
        hub_contract: H160,
        from_chain: &str,
        governance_id: [u8; 32],
        source_tx_hash: [u8; 32],
        deposit: &DepositRecord,
    ) -> Self {
        Self {
            hub_contract,
            from_chain: from_chain.to_string(),
            to_chain: deposit.to_chain.clone(),
            from_addr: deposit.from_addr.clone(),
            to_addr: deposit.to_addr.clone(),
            token: deposit.token.clone(),
            bytes32s: vec![governance_id, source_tx_hash],
            uints: deposit.uints(),
            data: deposit.data.clone(),
        }
    }
}

/// `abi.encodePacked(address, string, string, bytes, bytes, bytes, bytes32[], uint256[], bytes)`.
///
/// Address is 20 bytes, strings and bytes are raw, and every array element
/// occupies a full 32-byte word. Empty data contributes nothing.
pub fn build_message(message: &SwapMessage) -> Vec<u8> {
    let mut packed = Vec::with_capacity(
        20 + message.from_chain.len()
            + message.to_chain.len()
            + message.from_addr.len()
            + message.to_addr.len()
            + message.token.len()
            + 32 * (message.bytes32s.len() + message.uints.len())
            + message.data.len(),
    );

    packed.extend_from_slice(message.hub_contract.as_bytes());
    packed.extend_from_slice(message.from_chain.as_bytes());
    packed.extend_from_slice(message.to_chain.as_bytes());
    packed.extend_from_slice(&message.from_addr);
    packed.extend_from_slice(&message.to_addr);
    packed.extend_from_slice(&message.token);
    for word in &message.bytes32s {
        packed.extend_from_slice(word);
    }
    for value in &message.uints {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        packed.extend_from_slice(&word);
    }
    packed.extend_from_slice(&message.data);

    packed
}

/// SHA-256 of the packed message.
pub fn hash_message(packed: &[u8]) -> [u8; 32] {
    Sha256::digest(packed).into()
}
