//! Destination address and payload validation.
//!
//! A deposit is only signed if its destination address (and optional auxiliary
//! payload) is well formed for the destination chain. Addresses arrive as raw
//! bytes from the deposit event.

// ============================================================================
// ADDRESS FAMILIES
// ============================================================================

/// Address encoding rules shared by a group of chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// 20-byte account address, any payload
    Evm,
    /// 21-byte address: 0x00 prefix for accounts, 0x01 for contracts, no payload
    Icon,
    /// 20-byte account id, payload is an optional destination tag (up to 4 bytes)
    Xrp,
    /// 20-byte account address, no payload
    Terra,
}

const EVM_CHAINS: &[&str] = &[
    "ETH", "BSC", "HECO", "MATIC", "KLAYTN", "CELO", "AVAX", "FANTOM", "HARMONY", "OEC",
    "XDAI", "ORBIT", "KLAYTN_V1", "GOV",
];

/// Resolves the address family for a chain tag, `None` for unknown chains.
pub fn family_of(chain: &str) -> Option<AddressFamily> {
    let chain = chain.to_ascii_uppercase();
    match chain.as_str() {
        "ICON" => Some(AddressFamily::Icon),
        "XRP" => Some(AddressFamily::Xrp),
        "TERRA" => Some(AddressFamily::Terra),
        other if EVM_CHAINS.contains(&other) => Some(AddressFamily::Evm),
        _ => None,
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Returns whether `address` is a valid destination on `chain`.
///
/// # Arguments
///
/// * `chain` - Destination chain tag (e.g. "ETH", "ICON")
/// * `address` - Raw address bytes from the deposit
///
/// # Returns
///
/// `false` for unknown chains, wrong lengths, the zero address, or an
/// unrecognised ICON prefix.
pub fn is_valid_address(chain: &str, address: &[u8]) -> bool {
    let Some(family) = family_of(chain) else {
        return false;
    };

    if address.iter().all(|b| *b == 0) {
        return false;
    }

    match family {
        AddressFamily::Evm | AddressFamily::Xrp | AddressFamily::Terra => address.len() == 20,
        AddressFamily::Icon => address.len() == 21 && matches!(address[0], 0x00 | 0x01),
    }
}

/// Returns whether the auxiliary payload is acceptable for `chain`.
///
/// An empty payload is always acceptable on known chains.
pub fn is_valid_payload(chain: &str, payload: &[u8]) -> bool {
    let Some(family) = family_of(chain) else {
        return false;
    };

    if payload.is_empty() {
        return true;
    }

    match family {
        AddressFamily::Evm => true,
        AddressFamily::Xrp => payload.len() <= 4,
        AddressFamily::Icon | AddressFamily::Terra => false,
    }
}
