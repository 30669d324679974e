//! Unit tests for destination address and payload validation

use bridge_validator::address_format::{self, AddressFamily};

/// Test chain tag resolution
/// Why: Unknown destinations must never be signed
#[test]
fn test_family_of() {
    assert_eq!(address_format::family_of("ETH"), Some(AddressFamily::Evm));
    assert_eq!(address_format::family_of("klaytn"), Some(AddressFamily::Evm));
    assert_eq!(address_format::family_of("ICON"), Some(AddressFamily::Icon));
    assert_eq!(address_format::family_of("XRP"), Some(AddressFamily::Xrp));
    assert_eq!(address_format::family_of("TERRA"), Some(AddressFamily::Terra));
    assert_eq!(address_format::family_of("DOGE"), None);
}

/// Test EVM address rules
/// Why: EVM destinations are exactly 20 non-zero bytes
#[test]
fn test_evm_addresses() {
    assert!(address_format::is_valid_address("BSC", &[0x11; 20]));
    assert!(!address_format::is_valid_address("BSC", &[0x11; 21]));
    assert!(!address_format::is_valid_address("BSC", &[0x11; 19]));
    assert!(!address_format::is_valid_address("BSC", &[0u8; 20]));
    assert!(!address_format::is_valid_address("BSC", &[]));
}

/// Test ICON address rules
/// Why: ICON addresses carry an account/contract prefix byte
#[test]
fn test_icon_addresses() {
    let mut account = vec![0x00];
    account.extend_from_slice(&[0x22; 20]);
    let mut contract = vec![0x01];
    contract.extend_from_slice(&[0x22; 20]);
    let mut bad_prefix = vec![0x02];
    bad_prefix.extend_from_slice(&[0x22; 20]);

    assert!(address_format::is_valid_address("ICON", &account));
    assert!(address_format::is_valid_address("ICON", &contract));
    assert!(!address_format::is_valid_address("ICON", &bad_prefix));
    assert!(!address_format::is_valid_address("ICON", &[0x22; 20]));
}

/// Test unknown destination chains
/// Why: Validation fails closed
#[test]
fn test_unknown_chain_rejected() {
    assert!(!address_format::is_valid_address("DOGE", &[0x11; 20]));
    assert!(!address_format::is_valid_payload("DOGE", &[]));
}

/// Test payload rules per family
/// Why: Only some destinations accept auxiliary data
#[test]
fn test_payload_rules() {
    assert!(address_format::is_valid_payload("ETH", &[]));
    assert!(address_format::is_valid_payload("ETH", &[0xab; 100]));

    assert!(address_format::is_valid_payload("XRP", &[0, 0, 0, 1]));
    assert!(!address_format::is_valid_payload("XRP", &[0, 0, 0, 0, 1]));

    assert!(address_format::is_valid_payload("ICON", &[]));
    assert!(!address_format::is_valid_payload("ICON", &[1]));
    assert!(!address_format::is_valid_payload("TERRA", &[1]));
}
