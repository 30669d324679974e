//! Swap validation pipeline.
//!
//! For every relevant relay event: correlate with the source deposit, wait for
//! the confirmation depth, hash the canonical message, skip if this validator
//! already signed it, otherwise sign and submit the signature to the hub.

pub mod confirmation;
pub mod correlator;
pub mod signature_guard;

use serde::Serialize;

use crate::abi::{self, Token};
use crate::context::ChainContext;
use crate::crypto::SignaturePayload;
use crate::error::SwapError;
use crate::hasher::{self, SwapMessage};
use crate::submission::{ContractCall, GasPolicy, ProgressReport};
use crate::types::{BridgeEvent, TransferKind};

/// Terminal outcome of a swap validation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwapOutcome {
    /// Signature submitted to the hub
    Submitted { tx_hash: String },
    /// This validator's address is already recorded for the hash
    AlreadySigned { hash: String },
    /// Deposit not deep enough yet; dropped until a later relay surfaces it again
    NotConfirmed {
        current: Option<u64>,
        deposit_block: u64,
    },
}

/// Argument layout shared by `validateSwap` and `validateSwapNFT`.
const VALIDATE_PARAMS: &str = "(string,string,bytes,bytes,bytes,bytes32[],uint256[],bytes,bytes32[])";

pub fn validate_signature(kind: TransferKind) -> String {
    format!("{}{}", kind.validate_method(), VALIDATE_PARAMS)
}

/// Calldata for `validateSwap` / `validateSwapNFT`.
pub fn encode_validate_call(kind: TransferKind, message: &SwapMessage, signature: &SignaturePayload) -> Vec<u8> {
    abi::encode_call(
        &validate_signature(kind),
        &[
            Token::String(message.from_chain.clone()),
            Token::String(message.to_chain.clone()),
            Token::Bytes(message.from_addr.clone()),
            Token::Bytes(message.to_addr.clone()),
            Token::Bytes(message.token.clone()),
            Token::Array(message.bytes32s.iter().copied().map(Token::FixedBytes32).collect()),
            Token::Array(message.uints.iter().copied().map(Token::Uint).collect()),
            Token::Bytes(message.data.clone()),
            Token::Array(
                signature
                    .to_bytes32s()
                    .into_iter()
                    .map(Token::FixedBytes32)
                    .collect(),
            ),
        ],
    )
}

/// Runs the full pipeline for one relay event.
///
/// # Arguments
///
/// * `ctx` - Context of the chain the event originates from
/// * `event` - Relay event already filtered for this chain and governance id
///
/// # Returns
///
/// * `Ok(SwapOutcome)` - Submitted, already signed, or not yet confirmed
/// * `Err(SwapError)` - The attempt failed; see [`SwapError::kind`]
pub async fn validate_swap(ctx: &ChainContext, event: &BridgeEvent) -> Result<SwapOutcome, SwapError> {
    let correlation = correlator::correlate(ctx, event).await?;
    let deposit = &correlation.deposit;

    let check = confirmation::current_height_confirms(ctx, deposit.block_number, ctx.confirmations).await;
    if !check.confirmed {
        return Ok(SwapOutcome::NotConfirmed {
            current: check.current,
            deposit_block: deposit.block_number,
        });
    }

    let sender = ctx.accounts.next_account();

    let message = SwapMessage::from_deposit(
        ctx.hub_contract,
        &ctx.name,
        ctx.governance_id,
        correlation.source_tx_hash,
        deposit,
    );
    let hash = hasher::hash_message(&hasher::build_message(&message));

    if signature_guard::already_signed(ctx, &message.to_chain, &hash).await? {
        return Ok(SwapOutcome::AlreadySigned {
            hash: abi::to_hex(&hash),
        });
    }

    let signature = ctx
        .identity
        .sign_digest(&hash)
        .map_err(|e| SwapError::Signing(format!("{:#}", e)))?;

    let call = ContractCall {
        to: ctx.hub_contract,
        method: event.kind.validate_method(),
        data: encode_validate_call(event.kind, &message, &signature),
    };
    let progress = ProgressReport {
        chain: ctx.name.clone(),
        block: Some(event.block_number),
    };

    let tx_hash = ctx
        .submitter
        .submit(&call, &sender, GasPolicy::FixedCeiling, Some(progress))
        .await?;

    Ok(SwapOutcome::Submitted { tx_hash })
}
