//! Cryptographic Operations Module
//!
//! This module handles all secp256k1 operations of the validator: loading the
//! long-lived validator key, signing swap digests in the `ecrecover` format the hub
//! multisig verifies, signing EVM transactions, and minting the throwaway sender
//! accounts that pay for swap submissions.
//!
//! ## Security Requirements
//!
//! **CRITICAL**: Private keys must never be exposed or logged.

use anyhow::{Context, Result};
use ethereum_types::H160;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::RngCore;
use sha3::{Digest, Keccak256};
use tracing::info;

use crate::abi;
use crate::config::Config;

// ============================================================================
// SIGNATURE PAYLOAD
// ============================================================================

/// A validator signature over a swap digest.
///
/// Encoded as the `bytes32[] sigs` argument of `validateSwap`:
/// `[validator (left-padded), v (left-padded), r, s]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePayload {
    pub validator: H160,
    /// 27 or 28
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl SignaturePayload {
    pub fn to_bytes32s(&self) -> Vec<[u8; 32]> {
        let mut validator = [0u8; 32];
        validator[12..].copy_from_slice(self.validator.as_bytes());
        let mut v = [0u8; 32];
        v[31] = self.v;
        vec![validator, v, self.r, self.s]
    }
}

// ============================================================================
// EVM ACCOUNT
// ============================================================================

/// A secp256k1 key and its derived 20-byte EVM address.
#[derive(Clone)]
pub struct EvmAccount {
    signing_key: SigningKey,
    address: H160,
}

impl std::fmt::Debug for EvmAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmAccount")
            .field("address", &abi::hex_address(&self.address))
            .finish_non_exhaustive()
    }
}

impl EvmAccount {
    /// Creates an account from a hex-encoded 32-byte private key (0x prefix optional).
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let bytes = abi::hex_to_bytes(private_key.trim()).context("Private key is not valid hex")?;
        if bytes.len() != 32 {
            return Err(anyhow::anyhow!(
                "Invalid private key length: expected 32 bytes, got {}",
                bytes.len()
            ));
        }
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("Failed to convert private key to array"))?;
        Self::from_bytes(&secret)
    }

    pub fn from_bytes(secret: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_bytes(&(*secret).into())
            .map_err(|e| anyhow::anyhow!("Failed to create ECDSA signing key: {}", e))?;
        let address = address_of(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Generates a fresh account from OS randomness.
    pub fn random() -> Self {
        let mut rng = rand::rngs::OsRng;
        loop {
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            // Zero and values above the curve order are rejected; draw again.
            if let Ok(account) = Self::from_bytes(&secret) {
                return account;
            }
        }
    }

    pub fn address(&self) -> H160 {
        self.address
    }

    pub fn address_hex(&self) -> String {
        abi::hex_address(&self.address)
    }

    /// Hex-encoded private key, for the key generation utility only.
    pub fn private_key_hex(&self) -> String {
        abi::to_hex(&self.signing_key.to_bytes())
    }

    /// Signs a 32-byte digest as-is.
    ///
    /// # Returns
    ///
    /// * `Ok((r, s, recovery_id))` - Low-s signature and its recovery id (0 or 1)
    /// * `Err(anyhow::Error)` - Signing failed
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<([u8; 32], [u8; 32], u8)> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| anyhow::anyhow!("Failed to sign precomputed hash: {}", e))?;

        let sig_bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..64]);

        Ok((r, s, recovery_id.to_byte()))
    }
}

/// Ethereum address: keccak256(uncompressed_public_key[1..])[12..32]
fn address_of(verifying_key: &VerifyingKey) -> H160 {
    let point = verifying_key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    H160::from_slice(&hash[12..32])
}

/// Recovers the signer address of a swap signature, as `ecrecover` would.
pub fn recover_signer(digest: &[u8; 32], payload: &SignaturePayload) -> Result<H160> {
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&payload.r);
    rs[32..].copy_from_slice(&payload.s);
    let signature = Signature::from_slice(&rs).map_err(|e| anyhow::anyhow!("Invalid signature: {}", e))?;
    let recovery_id = RecoveryId::from_byte(payload.v.wrapping_sub(27))
        .ok_or_else(|| anyhow::anyhow!("Invalid recovery byte: {}", payload.v))?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|e| anyhow::anyhow!("Failed to recover signer: {}", e))?;
    Ok(address_of(&key))
}

// ============================================================================
// VALIDATOR IDENTITY
// ============================================================================

/// Long-lived validator key whose address the multisig counts toward its threshold.
#[derive(Debug, Clone)]
pub struct ValidatorIdentity {
    account: EvmAccount,
}

impl ValidatorIdentity {
    /// Loads the validator key from the environment variable named in configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(ValidatorIdentity)` - Key loaded and address derived
    /// * `Err(anyhow::Error)` - Variable unset or key malformed
    pub fn from_config(config: &Config) -> Result<Self> {
        let private_key = config.validator.get_private_key()?;
        let identity = Self::from_hex(&private_key)?;
        info!("Validator identity loaded: {}", identity.address_hex());
        Ok(identity)
    }

    pub fn from_hex(private_key: &str) -> Result<Self> {
        Ok(Self {
            account: EvmAccount::from_hex(private_key).context("Invalid Ethereum Wallet Account")?,
        })
    }

    pub fn address(&self) -> H160 {
        self.account.address()
    }

    pub fn address_hex(&self) -> String {
        self.account.address_hex()
    }

    /// Account view of the identity, used when the validator itself sends a transaction.
    pub fn account(&self) -> &EvmAccount {
        &self.account
    }

    /// Signs a swap digest for the hub multisig, `v = 27 + recovery id`.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<SignaturePayload> {
        let (r, s, recovery_id) = self.account.sign_prehash(digest)?;
        Ok(SignaturePayload {
            validator: self.address(),
            v: 27 + recovery_id,
            r,
            s,
        })
    }
}

// ============================================================================
// EPHEMERAL SENDERS
// ============================================================================

/// Source of single-use sender accounts for swap submissions.
///
/// Hub gas price is zero, so a fresh account can submit without funding.
#[derive(Debug, Clone, Default)]
pub struct EphemeralAccountFactory;

impl EphemeralAccountFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn next_account(&self) -> EvmAccount {
        EvmAccount::random()
    }
}
