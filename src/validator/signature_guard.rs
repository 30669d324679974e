//! Duplicate-signature guard.
//!
//! Before signing, the destination multisig is asked which validators already
//! signed the swap hash. Restarts and redelivered events therefore never produce
//! a second signature from this validator.

use ethereum_types::H160;

use crate::abi::{self, ParamType, Token};
use crate::context::ChainContext;
use crate::error::SwapError;

pub const GET_BRIDGE_MIG: &str = "getBridgeMig(string,bytes32)";
pub const GET_HASH_VALIDATORS: &str = "getHashValidators(bytes32)";

/// Resolves the multisig that collects signatures for swaps toward `to_chain`.
pub async fn destination_multisig(ctx: &ChainContext, to_chain: &str) -> Result<H160, SwapError> {
    let calldata = abi::encode_call(
        GET_BRIDGE_MIG,
        &[
            Token::String(to_chain.to_string()),
            Token::FixedBytes32(ctx.governance_id),
        ],
    );
    let output = ctx
        .hub_client
        .call(&abi::hex_address(&ctx.hub_contract), &calldata)
        .await?;

    let multisig = abi::decode(&[ParamType::Address], &output)?
        .into_iter()
        .next()
        .and_then(|t| t.into_address())
        .unwrap_or_default();

    if multisig.is_zero() {
        return Err(SwapError::MissingContractState(format!(
            "no bridge multisig registered for {}",
            to_chain
        )));
    }
    Ok(multisig)
}

/// Validators that already signed `hash` on `multisig`.
pub async fn hash_validators(ctx: &ChainContext, multisig: H160, hash: &[u8; 32]) -> Result<Vec<H160>, SwapError> {
    let calldata = abi::encode_call(GET_HASH_VALIDATORS, &[Token::FixedBytes32(*hash)]);
    let output = ctx
        .hub_client
        .call(&abi::hex_address(&multisig), &calldata)
        .await?;

    let validators = abi::decode(&[ParamType::Array(Box::new(ParamType::Address))], &output)?
        .into_iter()
        .next()
        .and_then(|t| t.into_array())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|t| t.into_address())
        .collect();
    Ok(validators)
}

/// Whether this validator already signed `hash` for swaps toward `to_chain`.
pub async fn already_signed(ctx: &ChainContext, to_chain: &str, hash: &[u8; 32]) -> Result<bool, SwapError> {
    let multisig = destination_multisig(ctx, to_chain).await?;
    let me = ctx.identity.address();
    Ok(hash_validators(ctx, multisig, hash)
        .await?
        .iter()
        .any(|validator| *validator == me))
}
