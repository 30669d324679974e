//! EVM ABI Encoding Module
//!
//! Minimal Solidity ABI support for the contracts the validator talks to:
//! function selectors, event topics, head/tail encoding of call arguments and
//! decoding of return values and event data.
//!
//! Supported types are `address`, `uint256`, `bool`, `bytes32`, `bytes`,
//! `string` and dynamic arrays of those.

use anyhow::{Context, Result};
use ethereum_types::{H160, U256};
use sha3::{Digest, Keccak256};

// ============================================================================
// TYPES
// ============================================================================

/// ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Uint,
    Bool,
    FixedBytes32,
    Bytes,
    String,
    Array(Box<ParamType>),
}

impl ParamType {
    fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::Bytes | ParamType::String | ParamType::Array(_))
    }
}

/// ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(H160),
    Uint(U256),
    Bool(bool),
    FixedBytes32([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Token>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Bytes(_) | Token::String(_) | Token::Array(_))
    }

    pub fn into_address(self) -> Option<H160> {
        match self {
            Token::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<U256> {
        match self {
            Token::Uint(u) => Some(u),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_fixed_bytes32(self) -> Option<[u8; 32]> {
        match self {
            Token::FixedBytes32(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(items) => Some(items),
            _ => None,
        }
    }
}

// ============================================================================
// SIGNATURES
// ============================================================================

/// Function selector: keccak256(signature)[0..4]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Event topic hash for an event signature string, 0x-prefixed.
pub fn event_topic(signature: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

// ============================================================================
// ENCODING
// ============================================================================

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn usize_word(value: usize) -> [u8; 32] {
    uint_word(U256::from(value))
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let padding = (32 - (data.len() % 32)) % 32;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

fn encode_static(token: &Token) -> [u8; 32] {
    match token {
        Token::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_bytes());
            word
        }
        Token::Uint(value) => uint_word(*value),
        Token::Bool(value) => usize_word(usize::from(*value)),
        Token::FixedBytes32(bytes) => *bytes,
        Token::Bytes(_) | Token::String(_) | Token::Array(_) => {
            unreachable!("dynamic token encoded as static")
        }
    }
}

fn encode_dynamic(token: &Token) -> Vec<u8> {
    match token {
        Token::Bytes(data) => {
            let mut out = usize_word(data.len()).to_vec();
            out.extend(padded(data));
            out
        }
        Token::String(s) => {
            let mut out = usize_word(s.len()).to_vec();
            out.extend(padded(s.as_bytes()));
            out
        }
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode(items));
            out
        }
        _ => encode_static(token).to_vec(),
    }
}

/// ABI-encodes a tuple of tokens (head/tail layout).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = 32 * tokens.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_dynamic(token));
        } else {
            head.extend_from_slice(&encode_static(token));
        }
    }

    head.extend(tail);
    head
}

/// Builds calldata: selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

// ============================================================================
// DECODING
// ============================================================================

fn read_word(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..offset + 32)
        .ok_or_else(|| anyhow::anyhow!("ABI data too short: need word at offset {}, have {} bytes", offset, data.len()))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize> {
    let word = read_word(data, offset)?;
    let value = U256::from_big_endian(word);
    if value > U256::from(u32::MAX) {
        return Err(anyhow::anyhow!("ABI offset/length out of range: {}", value));
    }
    Ok(value.as_usize())
}

fn decode_static(param: &ParamType, word: &[u8]) -> Result<Token> {
    Ok(match param {
        ParamType::Address => Token::Address(H160::from_slice(&word[12..32])),
        ParamType::Uint => Token::Uint(U256::from_big_endian(word)),
        ParamType::Bool => Token::Bool(word[31] != 0),
        ParamType::FixedBytes32 => {
            let mut out = [0u8; 32];
            out.copy_from_slice(word);
            Token::FixedBytes32(out)
        }
        _ => return Err(anyhow::anyhow!("{:?} is not a static type", param)),
    })
}

fn decode_dynamic(param: &ParamType, data: &[u8], offset: usize) -> Result<Token> {
    let len = read_usize(data, offset)?;
    let start = offset + 32;
    match param {
        ParamType::Bytes | ParamType::String => {
            let bytes = data
                .get(start..start + len)
                .ok_or_else(|| anyhow::anyhow!("ABI data too short for {} dynamic bytes", len))?
                .to_vec();
            if *param == ParamType::String {
                let s = String::from_utf8(bytes).context("ABI string is not valid UTF-8")?;
                Ok(Token::String(s))
            } else {
                Ok(Token::Bytes(bytes))
            }
        }
        ParamType::Array(inner) => {
            // every element takes at least one head word
            let available = data.len().saturating_sub(start) / 32;
            if len > available {
                return Err(anyhow::anyhow!(
                    "ABI array length {} exceeds remaining data ({} words)",
                    len,
                    available
                ));
            }
            let types = vec![(**inner).clone(); len];
            let items = decode(&types, &data[start.min(data.len())..])?;
            Ok(Token::Array(items))
        }
        _ => Err(anyhow::anyhow!("{:?} is not a dynamic type", param)),
    }
}

/// Decodes an ABI-encoded tuple of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(types.len());
    for (i, param) in types.iter().enumerate() {
        let head_offset = i * 32;
        if param.is_dynamic() {
            let offset = read_usize(data, head_offset)?;
            tokens.push(decode_dynamic(param, data, offset)?);
        } else {
            let word = read_word(data, head_offset)?;
            tokens.push(decode_static(param, word)?);
        }
    }
    Ok(tokens)
}

// ============================================================================
// HEX HELPERS
// ============================================================================

/// Decodes a hex string with or without 0x prefix.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    let clean = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(clean).with_context(|| format!("Invalid hex: {}", s))
}

/// Encodes bytes as 0x-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Formats an address as full 0x-prefixed lowercase hex.
pub fn hex_address(addr: &H160) -> String {
    to_hex(addr.as_bytes())
}

/// Parses a 20-byte EVM address.
pub fn parse_address(s: &str) -> Result<H160> {
    let bytes = hex_to_bytes(s)?;
    if bytes.len() != 20 {
        return Err(anyhow::anyhow!(
            "Invalid address length: expected 20 bytes, got {} ({})",
            bytes.len(),
            s
        ));
    }
    Ok(H160::from_slice(&bytes))
}

/// Parses a 32-byte value such as a governance id or transaction hash.
pub fn parse_bytes32(s: &str) -> Result<[u8; 32]> {
    let bytes = hex_to_bytes(s)?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        anyhow::anyhow!("Invalid bytes32 length: expected 32 bytes, got {} ({})", v.len(), s)
    })
}

/// Parses a JSON-RPC quantity ("0x1a") as u64.
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let clean = s.strip_prefix("0x").unwrap_or(s);
    if clean.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(clean, 16).with_context(|| format!("Invalid hex quantity: {}", s))
}

/// Case-insensitive comparison of two hex addresses.
pub fn addresses_match(a: &str, b: &str) -> bool {
    let a = a.strip_prefix("0x").unwrap_or(a);
    let b = b.strip_prefix("0x").unwrap_or(b);
    a.eq_ignore_ascii_case(b)
}
