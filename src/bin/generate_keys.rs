//! secp256k1 Key Generation Utility
//!
//! This binary generates a new secp256k1 key for a bridge validator.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin generate_keys
//! ```
//!
//! Export the private key under the variable named by `validator.private_key_env`
//! in `config/validator.toml`, and register the address with the multisig owners.

use bridge_validator::crypto::EvmAccount;

fn main() {
    let account = EvmAccount::random();

    println!("Generated secp256k1 Key Pair:");
    println!("Private Key (hex): {}", account.private_key_hex());
    println!("Address: {}", account.address_hex());
    println!();
    println!("export BRIDGE_VALIDATOR_PRIVATE_KEY={}", account.private_key_hex());
}
