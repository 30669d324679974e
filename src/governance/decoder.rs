//! Call-data decoder for governance transactions.
//!
//! Resolves the 4-byte selector against the administrative methods a
//! governance multisig is expected to call and decodes the arguments into a
//! readable form for operators.

use serde::Serialize;

use crate::abi::{self, ParamType, Token};

/// Reported when call data matches no known method.
pub const UNKNOWN_CALL_DATA: &str = "Unknown Transaction Call Data";

/// One decoded argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedParam {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
    /// Inner call carried by a `bytes` argument, when it decodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<Box<DecodedCall>>,
}

/// A decoded method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCall {
    pub name: String,
    pub params: Vec<DecodedParam>,
}

struct KnownMethod {
    name: &'static str,
    params: &'static [(&'static str, &'static str)],
}

const KNOWN_METHODS: &[KnownMethod] = &[
    KnownMethod { name: "addOwner", params: &[("owner", "address")] },
    KnownMethod { name: "removeOwner", params: &[("owner", "address")] },
    KnownMethod { name: "replaceOwner", params: &[("owner", "address"), ("newOwner", "address")] },
    KnownMethod { name: "changeRequirement", params: &[("_required", "uint256")] },
    KnownMethod {
        name: "submitTransaction",
        params: &[("destination", "address"), ("value", "uint256"), ("data", "bytes")],
    },
    KnownMethod { name: "confirmTransaction", params: &[("transactionId", "uint256")] },
    KnownMethod { name: "revokeConfirmation", params: &[("transactionId", "uint256")] },
    KnownMethod { name: "executeTransaction", params: &[("transactionId", "uint256")] },
    KnownMethod { name: "transfer", params: &[("to", "address"), ("value", "uint256")] },
    KnownMethod { name: "approve", params: &[("spender", "address"), ("value", "uint256")] },
    KnownMethod { name: "changeActivate", params: &[("activate", "bool")] },
    KnownMethod { name: "setTaxRate", params: &[("_taxRate", "uint256")] },
    KnownMethod { name: "setTaxReceiver", params: &[("_taxReceiver", "address")] },
    KnownMethod { name: "addChain", params: &[("chain", "string")] },
    KnownMethod { name: "removeChain", params: &[("chain", "string")] },
    KnownMethod { name: "setValidChain", params: &[("chain", "string"), ("valid", "bool")] },
    KnownMethod { name: "upgradeTo", params: &[("newImplementation", "address")] },
];

fn param_type(solidity: &str) -> Option<ParamType> {
    Some(match solidity {
        "address" => ParamType::Address,
        "uint256" => ParamType::Uint,
        "bool" => ParamType::Bool,
        "bytes32" => ParamType::FixedBytes32,
        "bytes" => ParamType::Bytes,
        "string" => ParamType::String,
        _ => return None,
    })
}

impl KnownMethod {
    fn signature(&self) -> String {
        let types: Vec<&str> = self.params.iter().map(|(_, t)| *t).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

fn token_value(token: Token) -> serde_json::Value {
    match token {
        Token::Address(a) => serde_json::json!(abi::hex_address(&a)),
        Token::Uint(u) => serde_json::json!(u.to_string()),
        Token::Bool(b) => serde_json::json!(b),
        Token::FixedBytes32(b) => serde_json::json!(abi::to_hex(&b)),
        Token::Bytes(b) => serde_json::json!(abi::to_hex(&b)),
        Token::String(s) => serde_json::json!(s),
        Token::Array(items) => serde_json::Value::Array(items.into_iter().map(token_value).collect()),
    }
}

/// Decodes governance call data, `None` if the selector is unknown or the
/// arguments do not decode.
pub fn decode_call_data(data: &[u8]) -> Option<DecodedCall> {
    if data.len() < 4 {
        return None;
    }
    let (selector, args) = data.split_at(4);

    let method = KNOWN_METHODS
        .iter()
        .find(|m| abi::selector(&m.signature()) == selector)?;

    let types = method
        .params
        .iter()
        .map(|(_, t)| param_type(t))
        .collect::<Option<Vec<_>>>()?;
    let tokens = abi::decode(&types, args).ok()?;

    Some(DecodedCall {
        name: method.name.to_string(),
        params: method
            .params
            .iter()
            .zip(tokens)
            .map(|((name, kind), token)| {
                let decoded = match &token {
                    Token::Bytes(inner) => decode_call_data(inner).map(Box::new),
                    _ => None,
                };
                DecodedParam {
                    name: name.to_string(),
                    kind: kind.to_string(),
                    value: token_value(token),
                    decoded,
                }
            })
            .collect(),
    })
}

/// Decoded call as JSON, or the unknown-call-data marker string.
pub fn describe_call_data(data: &[u8]) -> serde_json::Value {
    match decode_call_data(data) {
        Some(call) => serde_json::to_value(call).unwrap_or_else(|_| serde_json::json!(UNKNOWN_CALL_DATA)),
        None => serde_json::json!(UNKNOWN_CALL_DATA),
    }
}
