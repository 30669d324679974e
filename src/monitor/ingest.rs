//! Relay event ingestion.
//!
//! Fetches `SwapRelay` / `SwapNFTRelay` logs emitted by the hub contract in one
//! block, decodes them and keeps only the events this chain module is
//! responsible for.

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::abi::{self, ParamType, Token};
use crate::context::ChainContext;
use crate::evm_client::EvmLog;
use crate::types::{BridgeEvent, TransferKind};

/// Relay events carry identical fields for both transfer kinds.
const RELAY_PARAMS: &str = "(string,string,bytes,bytes,bytes,bytes32[],uint256[],bytes)";

/// Full event signature of the relay event for `kind`.
pub fn relay_signature(kind: TransferKind) -> String {
    format!("{}{}", kind.relay_event(), RELAY_PARAMS)
}

fn relay_param_types() -> Vec<ParamType> {
    vec![
        ParamType::String,
        ParamType::String,
        ParamType::Bytes,
        ParamType::Bytes,
        ParamType::Bytes,
        ParamType::Array(Box::new(ParamType::FixedBytes32)),
        ParamType::Array(Box::new(ParamType::Uint)),
        ParamType::Bytes,
    ]
}

/// Decodes one hub log into a relay event.
///
/// # Returns
///
/// * `Ok(BridgeEvent)` - Log matched the relay layout
/// * `Err(anyhow::Error)` - Wrong topic or malformed data
pub fn decode_relay_log(kind: TransferKind, log: &EvmLog) -> Result<BridgeEvent> {
    let topic = abi::event_topic(&relay_signature(kind));
    match log.topics.first() {
        Some(t) if t.eq_ignore_ascii_case(&topic) => {}
        _ => anyhow::bail!("Log is not a {} event", kind.relay_event()),
    }

    let data = abi::hex_to_bytes(&log.data)?;
    let mut tokens = abi::decode(&relay_param_types(), &data)
        .with_context(|| format!("Failed to decode {} data", kind.relay_event()))?
        .into_iter();

    let mut next = || {
        tokens
            .next()
            .ok_or_else(|| anyhow::anyhow!("{} data has too few fields", kind.relay_event()))
    };
    let malformed = || anyhow::anyhow!("{} field has an unexpected type", kind.relay_event());

    let from_chain = next()?.into_string().ok_or_else(malformed)?;
    let to_chain = next()?.into_string().ok_or_else(malformed)?;
    let from_addr = next()?.into_bytes().ok_or_else(malformed)?;
    let to_addr = next()?.into_bytes().ok_or_else(malformed)?;
    let token = next()?.into_bytes().ok_or_else(malformed)?;
    let bytes32s = next()?
        .into_array()
        .ok_or_else(malformed)?
        .into_iter()
        .map(|t| t.into_fixed_bytes32().ok_or_else(malformed))
        .collect::<Result<Vec<_>>>()?;
    let uints = next()?
        .into_array()
        .ok_or_else(malformed)?
        .into_iter()
        .map(|t| t.into_uint().ok_or_else(malformed))
        .collect::<Result<Vec<_>>>()?;
    let payload = next()?.into_bytes().ok_or_else(malformed)?;

    Ok(BridgeEvent {
        kind,
        from_chain,
        to_chain,
        from_addr,
        to_addr,
        token,
        bytes32s,
        uints,
        data: payload,
        block_number: abi::parse_hex_u64(&log.block_number)?,
        transaction_hash: log.transaction_hash.clone(),
    })
}

/// ABI-encodes relay event data, the inverse of [`decode_relay_log`].
pub fn encode_relay_data(event: &BridgeEvent) -> Vec<u8> {
    abi::encode(&[
        Token::String(event.from_chain.clone()),
        Token::String(event.to_chain.clone()),
        Token::Bytes(event.from_addr.clone()),
        Token::Bytes(event.to_addr.clone()),
        Token::Bytes(event.token.clone()),
        Token::Array(event.bytes32s.iter().copied().map(Token::FixedBytes32).collect()),
        Token::Array(event.uints.iter().copied().map(Token::Uint).collect()),
        Token::Bytes(event.data.clone()),
    ])
}

/// Whether a decoded relay belongs to this module: same origin chain and same
/// governance deployment.
pub fn is_relevant(event: &BridgeEvent, chain_name: &str, governance_id: &[u8; 32]) -> bool {
    event.from_chain == chain_name && event.governance_id() == Some(governance_id)
}

async fn fetch_kind(ctx: &ChainContext, block: u64, kind: TransferKind) -> Result<Vec<BridgeEvent>> {
    let topic = abi::event_topic(&relay_signature(kind));
    let logs = ctx
        .hub_client
        .get_logs(&abi::hex_address(&ctx.hub_contract), &topic, block, block)
        .await
        .with_context(|| format!("[{}] Failed to get '{}' events from block {}", ctx.name, kind.relay_event(), block))?;

    let events: Vec<BridgeEvent> = logs
        .iter()
        .filter_map(|log| match decode_relay_log(kind, log) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("[{}] Skipping undecodable log {}: {:#}", ctx.name, log.transaction_hash, e);
                None
            }
        })
        .filter(|event| is_relevant(event, &ctx.name, &ctx.governance_id))
        .collect();

    if !events.is_empty() {
        info!(
            "[{}] Get '{}' event from block {}. length: {}",
            ctx.name,
            kind.relay_event(),
            block,
            events.len()
        );
    }

    Ok(events)
}

/// Fetches and filters relay events of the given kinds in `block`.
///
/// Each kind is queried on its own. A failed query is logged and drops only
/// that kind's events for the block; the call fails only when every query failed.
pub async fn fetch_events(ctx: &ChainContext, block: u64, kinds: &[TransferKind]) -> Result<Vec<BridgeEvent>> {
    let results = join_all(kinds.iter().map(|kind| fetch_kind(ctx, block, *kind))).await;

    let mut events = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(found) => events.extend(found),
            Err(e) => {
                error!("{:#}", e);
                failures.push(e);
            }
        }
    }

    if !kinds.is_empty() && failures.len() == kinds.len() {
        if let Some(e) = failures.pop() {
            return Err(e);
        }
    }
    Ok(events)
}
