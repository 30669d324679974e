//! Bridge Validator Service
//!
//! A validator node for a multi-chain asset bridge.
//!
//! ## Overview
//!
//! The validator:
//! 1. Watches `SwapRelay` / `SwapNFTRelay` events on the hub chain, one watcher per source chain
//! 2. Correlates each relay with the deposit on its source chain and waits for confirmations
//! 3. Signs the canonical swap hash and submits it to the hub unless already signed
//! 4. Confirms governance multisig transactions on operator request
//!
//! ## Security Requirements
//!
//! **CRITICAL**: The validator key signs swaps that release funds on destination chains.
//! It is loaded from an environment variable and must never be logged.

use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use bridge_validator::api::ApiServer;
use bridge_validator::config::Config;
use bridge_validator::context::ChainContext;
use bridge_validator::crypto::ValidatorIdentity;
use bridge_validator::evm_client::EvmClient;
use bridge_validator::governance::GovernanceClient;
use bridge_validator::monitor::ChainWatcher;
use bridge_validator::status::StatusRegistry;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point that initializes and runs the validator.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads and validates configuration
/// 3. Loads the validator identity
/// 4. Starts one hub watcher per configured chain
/// 5. Runs the operator API until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging for debugging and monitoring
    tracing_subscriber::fmt::init();

    info!("Starting Bridge Validator");

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Bridge Validator");
        println!();
        println!("Usage: bridge-validator [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  BRIDGE_VALIDATOR_CONFIG_PATH    Path to config file (default: config/validator.toml)");
        println!("  BRIDGE_VALIDATOR_PRIVATE_KEY    Validator private key (name configurable via validator.private_key_env)");
        return Ok(());
    }

    let mut config_path = None;
    let mut i = 1; // Skip program name
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            config_path = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    if let Some(path) = config_path {
        std::env::set_var("BRIDGE_VALIDATOR_CONFIG_PATH", &path);
        info!("Using custom config: {}", path);
    }

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    check_chain_id("hub", &config.hub.rpc_url, config.hub.chain_id, config.validator.rpc_timeout_ms).await?;
    if let Some(ref gov_chain) = config.governance_chain {
        check_chain_id(&gov_chain.name, &gov_chain.rpc_url, gov_chain.chain_id, config.validator.rpc_timeout_ms).await?;
    }

    let identity = Arc::new(ValidatorIdentity::from_config(&config)?);
    let status = StatusRegistry::new();

    let mut watchers = Vec::with_capacity(config.chains.len());
    for chain in &config.chains {
        let ctx = ChainContext::new(&config, chain, identity.clone(), status.clone())?;
        status.set_address(&chain.name, &identity.address_hex()).await;
        info!(
            "[{}] Chain module initialized (vault {}, {} confirmations)",
            chain.name, chain.vault_addr, chain.confirmations
        );
        watchers.push(ChainWatcher::new(Arc::new(ctx)));
    }
    if watchers.is_empty() {
        info!("No [[chains]] configured, swap validation is idle");
    }

    let governance = GovernanceClient::from_config(&config, identity.clone(), status.clone())?;
    if let Some(ref gov_chain) = config.governance_chain {
        status.set_address(&gov_chain.name, &identity.address_hex()).await;
        info!("Governance multisig chain configured: {}", gov_chain.name);
    }

    info!("All components initialized successfully");

    tokio::spawn(async move {
        for result in join_all(watchers.into_iter().map(ChainWatcher::run)).await {
            if let Err(e) = result {
                error!("Chain watcher stopped: {:#}", e);
            }
        }
    });

    // Run the API server (this blocks until shutdown)
    let api_server = ApiServer::new(config, status, governance);
    api_server.run().await
}

/// Aborts startup when a reachable node serves another chain. An unreachable
/// node only logs a warning; the watchers keep retrying.
async fn check_chain_id(label: &str, rpc_url: &str, expected: u64, timeout_ms: u64) -> Result<()> {
    let client = EvmClient::new(rpc_url, timeout_ms)?;
    match client.chain_id().await {
        Ok(actual) if actual != expected => {
            anyhow::bail!(
                "[{}] Chain id mismatch at {}: configured {}, node reports {}",
                label, rpc_url, expected, actual
            )
        }
        Ok(_) => Ok(()),
        Err(e) => {
            warn!("[{}] Could not verify chain id at {}: {:#}", label, rpc_url, e);
            Ok(())
        }
    }
}
