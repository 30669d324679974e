//! Cross-chain correlation.
//!
//! A relay event only names the source transaction and the deposit id. The
//! correlator finds the matching deposit on the source chain, checks it is
//! complete and that its destination is well formed.

use anyhow::{Context, Result};
use ethereum_types::U256;
use tracing::debug;

use crate::abi::{self, ParamType};
use crate::address_format;
use crate::context::ChainContext;
use crate::evm_client::EvmLog;
use crate::error::SwapError;
use crate::types::{BridgeEvent, DepositRecord, RawDeposit, TransferKind};

// ============================================================================
// DEPOSIT EVENT LAYOUTS
// ============================================================================

/// Parameter types of the source event, in declaration order.
///
/// Vault events: `(toChain, fromAddr, toAddr, token, decimal|tokenId, amount, depositId, data)`.
/// Minter events add a `tokenAddress` after a bytes `token`.
pub fn deposit_params(kind: TransferKind, is_governance_chain: bool) -> Vec<(&'static str, ParamType)> {
    let second = match kind {
        TransferKind::Fungible => "decimal",
        TransferKind::NonFungible => "tokenId",
    };

    let mut params = vec![
        ("toChain", ParamType::String),
        ("fromAddr", ParamType::Address),
        ("toAddr", ParamType::Bytes),
    ];
    if is_governance_chain {
        params.push(("token", ParamType::Address));
    } else {
        params.push(("token", ParamType::Bytes));
        params.push(("tokenAddress", ParamType::Address));
    }
    params.push((second, ParamType::Uint));
    params.push(("amount", ParamType::Uint));
    params.push(("depositId", ParamType::Uint));
    params.push(("data", ParamType::Bytes));
    params
}

/// Full event signature of the source event, e.g.
/// `Deposit(string,address,bytes,address,uint8,uint256,uint256,bytes)`.
pub fn deposit_signature(kind: TransferKind, is_governance_chain: bool) -> String {
    let second = match kind {
        TransferKind::Fungible => "uint8",
        TransferKind::NonFungible => "uint256",
    };
    let token = if is_governance_chain {
        "address"
    } else {
        "bytes,address"
    };
    format!(
        "{}(string,address,bytes,{},{},uint256,uint256,bytes)",
        kind.deposit_event(is_governance_chain),
        token,
        second
    )
}

/// Decodes a source-chain deposit log into its raw fields.
pub fn decode_deposit_log(kind: TransferKind, is_governance_chain: bool, log: &EvmLog) -> Result<RawDeposit> {
    let params = deposit_params(kind, is_governance_chain);
    let types: Vec<ParamType> = params.iter().map(|(_, t)| t.clone()).collect();
    let data = abi::hex_to_bytes(&log.data)?;
    let tokens = abi::decode(&types, &data)
        .with_context(|| format!("Failed to decode {} data", kind.deposit_event(is_governance_chain)))?;

    let mut raw = RawDeposit::default();
    for ((name, _), token) in params.into_iter().zip(tokens) {
        match name {
            "toChain" => raw.to_chain = token.into_string().unwrap_or_default(),
            "fromAddr" => {
                raw.from_addr = token
                    .into_address()
                    .map(|a| a.as_bytes().to_vec())
                    .unwrap_or_default()
            }
            "toAddr" => raw.to_addr = token.into_bytes().unwrap_or_default(),
            "token" => {
                raw.token = match token {
                    abi::Token::Address(a) => a.as_bytes().to_vec(),
                    other => other.into_bytes().unwrap_or_default(),
                }
            }
            "decimal" => raw.decimal = token.into_uint(),
            "tokenId" => raw.token_id = token.into_uint(),
            "amount" => raw.amount = token.into_uint(),
            "depositId" => raw.deposit_id = token.into_uint().unwrap_or_default(),
            "data" => raw.data = token.into_bytes().unwrap_or_default(),
            _ => {}
        }
    }
    Ok(raw)
}

// ============================================================================
// CORRELATION
// ============================================================================

/// A relay event matched with its source-chain deposit.
#[derive(Debug, Clone)]
pub struct Correlation {
    pub source_tx_hash: [u8; 32],
    pub deposit: DepositRecord,
}

/// Finds and validates the deposit backing `event`.
///
/// # Returns
///
/// * `Ok(Correlation)` - Exactly one complete, well-formed deposit matched
/// * `Err(SwapError::ReceiptNotFound)` - Source transaction unknown or pending
/// * `Err(SwapError::InvalidTransaction | AmbiguousDeposit)` - No match or several
/// * `Err(SwapError::MissingField)` - The deposit lacks a required field
/// * `Err(SwapError::InvalidAddress | InvalidPayload)` - Bad destination
/// * `Err(SwapError::Rpc)` - Source chain query failed
pub async fn correlate(ctx: &ChainContext, event: &BridgeEvent) -> Result<Correlation, SwapError> {
    let source_tx_hash = *event
        .source_tx_hash()
        .ok_or_else(|| SwapError::InvalidTransaction("relay carries no source tx hash".to_string()))?;
    let deposit_id = event
        .deposit_id()
        .ok_or_else(|| SwapError::InvalidTransaction("relay carries no depositId".to_string()))?;

    let tx_hash_hex = abi::to_hex(&source_tx_hash);
    let receipt = ctx
        .source_client
        .get_transaction_receipt(&tx_hash_hex)
        .await?
        .ok_or_else(|| SwapError::ReceiptNotFound(tx_hash_hex.clone()))?;
    let receipt_block = receipt
        .mined_block()
        .ok_or_else(|| SwapError::ReceiptNotFound(tx_hash_hex.clone()))?;

    let kind = event.kind;
    let event_name = kind.deposit_event(ctx.is_governance_chain);
    let topic = abi::event_topic(&deposit_signature(kind, ctx.is_governance_chain));
    let logs = ctx
        .source_client
        .get_logs(&abi::hex_address(&ctx.vault), &topic, receipt_block, receipt_block)
        .await?;

    ctx.status
        .set_block_height(&ctx.source_height_key(), receipt_block)
        .await;

    if logs.is_empty() {
        return Err(SwapError::InvalidTransaction(format!(
            "no '{}' event in block {}",
            event_name, receipt_block
        )));
    }

    let mut matches = matching_deposits(ctx, kind, &logs, deposit_id);
    if matches.len() > 1 {
        return Err(SwapError::AmbiguousDeposit {
            deposit_id,
            count: matches.len(),
        });
    }
    let raw = matches.pop().ok_or_else(|| {
        SwapError::InvalidTransaction(format!(
            "no '{}' event with depositId {} from {}",
            event_name,
            deposit_id,
            abi::hex_address(&ctx.vault)
        ))
    })?;

    let deposit = DepositRecord::new(kind, raw, receipt_block)?;

    if !address_format::is_valid_address(&deposit.to_chain, &deposit.to_addr) {
        return Err(SwapError::InvalidAddress {
            chain: deposit.to_chain.clone(),
            address: abi::to_hex(&deposit.to_addr),
        });
    }
    if !deposit.data.is_empty() && !address_format::is_valid_payload(&deposit.to_chain, &deposit.data) {
        return Err(SwapError::InvalidPayload {
            chain: deposit.to_chain.clone(),
            payload: abi::to_hex(&deposit.data),
        });
    }

    Ok(Correlation {
        source_tx_hash,
        deposit,
    })
}

/// Decoded deposits emitted by the configured vault with the given deposit id.
fn matching_deposits(ctx: &ChainContext, kind: TransferKind, logs: &[EvmLog], deposit_id: U256) -> Vec<RawDeposit> {
    let vault = abi::hex_address(&ctx.vault);
    logs.iter()
        .filter(|log| abi::addresses_match(&log.address, &vault))
        .filter_map(|log| match decode_deposit_log(kind, ctx.is_governance_chain, log) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("[{}] Skipping undecodable deposit log {}: {:#}", ctx.name, log.transaction_hash, e);
                None
            }
        })
        .filter(|raw| raw.deposit_id == deposit_id)
        .collect()
}
