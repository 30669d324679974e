//! Unit tests for cryptographic operations
//!
//! These tests verify key loading, address derivation, swap signatures in the
//! `ecrecover` format and ephemeral sender generation.

use bridge_validator::crypto::{self, EphemeralAccountFactory, EvmAccount, ValidatorIdentity};
use bridge_validator::abi;

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{DUMMY_VALIDATOR_ADDR, DUMMY_VALIDATOR_KEY};

/// 1. Test: Address Derivation
/// Verifies the well-known address of private key 1.
/// Why: The multisig identifies validators by this address.
#[test]
fn test_address_derivation_known_vector() {
    let account = EvmAccount::from_hex(DUMMY_VALIDATOR_KEY).unwrap();
    assert_eq!(account.address_hex(), DUMMY_VALIDATOR_ADDR);

    let unprefixed = EvmAccount::from_hex(DUMMY_VALIDATOR_KEY.trim_start_matches("0x")).unwrap();
    assert_eq!(unprefixed.address(), account.address());
}

/// 2. Test: Invalid Private Keys
/// Verifies that malformed keys are rejected.
/// Why: A bad key must abort startup instead of signing garbage.
#[test]
fn test_invalid_private_keys_rejected() {
    assert!(EvmAccount::from_hex("0x1234").is_err());
    assert!(EvmAccount::from_hex("not hex").is_err());
    assert!(EvmAccount::from_hex(&format!("0x{}", "00".repeat(32))).is_err());
    assert!(ValidatorIdentity::from_hex("0x").is_err());
}

/// 3. Test: Signature Recovers To Validator
/// Verifies `v` is 27 or 28 and the signature recovers to the validator address.
/// Why: The hub multisig checks signatures with `ecrecover`.
#[test]
fn test_sign_digest_recovers_to_validator() {
    let identity = ValidatorIdentity::from_hex(DUMMY_VALIDATOR_KEY).unwrap();
    let digest = [0x42u8; 32];

    let payload = identity.sign_digest(&digest).unwrap();
    assert!(payload.v == 27 || payload.v == 28);
    assert_eq!(payload.validator, identity.address());
    assert_eq!(crypto::recover_signer(&digest, &payload).unwrap(), identity.address());

    let other = [0x43u8; 32];
    assert_ne!(crypto::recover_signer(&other, &payload).unwrap(), identity.address());
}

/// 4. Test: Signature Payload Words
/// Verifies the `[validator, v, r, s]` layout passed to `validateSwap`.
/// Why: The contract reads each field from a fixed position.
#[test]
fn test_signature_payload_words() {
    let identity = ValidatorIdentity::from_hex(DUMMY_VALIDATOR_KEY).unwrap();
    let payload = identity.sign_digest(&[0x01u8; 32]).unwrap();
    let words = payload.to_bytes32s();

    assert_eq!(words.len(), 4);
    assert!(words[0][..12].iter().all(|b| *b == 0));
    assert_eq!(&words[0][12..], identity.address().as_bytes());
    assert!(words[1][..31].iter().all(|b| *b == 0));
    assert_eq!(words[1][31], payload.v);
    assert_eq!(words[2], payload.r);
    assert_eq!(words[3], payload.s);
}

/// 5. Test: Signing Is Deterministic
/// Verifies RFC 6979 nonces give identical signatures for identical input.
/// Why: Retried validations must not depend on randomness.
#[test]
fn test_signing_is_deterministic() {
    let identity = ValidatorIdentity::from_hex(DUMMY_VALIDATOR_KEY).unwrap();
    assert_eq!(
        identity.sign_digest(&[0x07u8; 32]).unwrap(),
        identity.sign_digest(&[0x07u8; 32]).unwrap()
    );
}

/// 6. Test: Ephemeral Senders Are Fresh
/// Verifies every sender is a distinct, usable key.
/// Why: Swap submissions use a new unfunded account each time.
#[test]
fn test_ephemeral_senders_are_fresh() {
    let factory = EphemeralAccountFactory::new();
    let first = factory.next_account();
    let second = factory.next_account();

    assert_ne!(first.address(), second.address());

    let restored = EvmAccount::from_hex(&first.private_key_hex()).unwrap();
    assert_eq!(restored.address(), first.address());
}

/// 7. Test: Debug Output Hides The Key
/// Verifies the private key never appears in debug formatting.
/// Why: Accounts are logged with `{:?}` in several places.
#[test]
fn test_debug_output_hides_private_key() {
    let account = EvmAccount::from_hex(DUMMY_VALIDATOR_KEY).unwrap();
    let debug = format!("{:?}", account);

    assert!(debug.contains(&abi::hex_address(&account.address())));
    assert!(!debug.contains(&account.private_key_hex()));
}
