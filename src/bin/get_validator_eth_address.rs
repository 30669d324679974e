//! Get Validator Ethereum Address
//!
//! This binary reads the validator configuration, loads the key from the configured
//! environment variable and prints the derived Ethereum address. This is the address
//! multisig contracts must list as a validator.

use anyhow::Result;
use bridge_validator::config::Config;
use bridge_validator::crypto::ValidatorIdentity;

fn main() -> Result<()> {
    let config = Config::load()?;
    let identity = ValidatorIdentity::from_config(&config)?;

    println!("{}", identity.address_hex());

    Ok(())
}
