//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the bridge validator.
//! Configuration includes the hub chain endpoint, the governance deployment this
//! validator serves, one entry per watched source chain, signing key location,
//! broadcaster timing and API settings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
///
/// This structure holds configuration for:
/// - Hub chain connection details (where relay events are emitted and swaps are validated)
/// - Governance deployment identity (chain, vault address, governance id)
/// - Source chains watched by this validator (one swap pipeline per entry)
/// - Validator key location and RPC timeouts
/// - Transaction broadcaster settings
/// - Governance multisig chain (optional)
/// - API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hub chain configuration
    pub hub: HubConfig,
    /// Governance deployment this validator belongs to
    pub governance: GovernanceConfig,
    /// Source chains to validate swaps for
    #[serde(default)]
    pub chains: Vec<SwapChainConfig>,
    /// Validator identity and RPC settings
    pub validator: ValidatorConfig,
    /// Transaction broadcaster settings
    #[serde(default)]
    pub broadcaster: BroadcasterConfig,
    /// Chain hosting the governance multisig (optional)
    #[serde(default)]
    pub governance_chain: Option<GovernanceChainConfig>,
    /// API server configuration (host, port, CORS settings)
    pub api: ApiConfig,
}

/// Hub chain configuration.
///
/// The hub contract emits `SwapRelay` / `SwapNFTRelay` events, resolves the
/// per-destination multisig and accepts `validateSwap` submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Human-readable name for the hub chain
    pub name: String,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// EIP-155 chain id used when signing transactions
    pub chain_id: u64,
    /// Address of the hub contract
    pub hub_contract_addr: String,
    /// Interval between head polls in milliseconds
    pub polling_interval_ms: u64,
}

/// Governance deployment identity.
///
/// Every relay event carries the governance id as `bytes32s[0]`; events for
/// other deployments are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Chain that hosts the governance vault (e.g. "ETH")
    pub chain: String,
    /// Vault address on the governance chain
    pub address: String,
    /// Governance id (32-byte hex)
    pub id: String,
}

/// Configuration for one watched source chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapChainConfig {
    /// Chain tag as it appears in relay events (e.g. "BSC")
    pub name: String,
    /// RPC endpoint URL of the source chain
    pub rpc_url: String,
    /// Vault (governance chain) or minter (other chains) contract address
    pub vault_addr: String,
    /// Required confirmation depth before a deposit is signed
    pub confirmations: u64,
}

/// Validator identity and RPC settings.
///
/// The private key is loaded from an environment variable at runtime.
/// The config file contains the environment variable name, not the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Environment variable name containing the secp256k1 private key (hex)
    /// Default: "BRIDGE_VALIDATOR_PRIVATE_KEY"
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
    /// Timeout for individual RPC requests in milliseconds
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
}

fn default_private_key_env() -> String {
    "BRIDGE_VALIDATOR_PRIVATE_KEY".to_string()
}

fn default_rpc_timeout_ms() -> u64 {
    30_000
}

impl ValidatorConfig {
    /// Loads the private key from the environment variable.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The private key (hex encoded)
    /// * `Err(anyhow::Error)` - Failed to load from environment
    pub fn get_private_key(&self) -> anyhow::Result<String> {
        std::env::var(&self.private_key_env).map_err(|_| {
            anyhow::anyhow!(
                "Environment variable '{}' not set. Please set it with the validator secp256k1 private key (hex encoded).",
                self.private_key_env
            )
        })
    }
}

/// Transaction broadcaster settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcasterConfig {
    /// Overall timeout of one broadcast in milliseconds
    pub timeout_ms: u64,
    /// Additional attempts after a failed send
    pub max_retries: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

/// Chain hosting the governance multisig wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceChainConfig {
    /// Human-readable name (e.g. "ETH")
    pub name: String,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Gas price oracle endpoint returning `{"fast": <number>}`
    pub gas_oracle_url: String,
    /// Known contract labels used to describe transaction destinations
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
}

/// API server configuration for operator access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests
    pub cors_origins: Vec<String>,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the TOML file.
    ///
    /// The path is taken from `BRIDGE_VALIDATOR_CONFIG_PATH` when set,
    /// otherwise `config/validator.toml`. The loaded configuration is
    /// validated before it is returned.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded configuration
    /// - `Err(anyhow::Error)` - Failed to load, parse or validate configuration
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BRIDGE_VALIDATOR_CONFIG_PATH")
            .unwrap_or_else(|_| "config/validator.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/validator.template.toml config/validator.toml\n\
                Then edit config/validator.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Validates the configuration.
    ///
    /// Startup must abort on any of these, there is no partial operation:
    /// - governance chain, address or id missing
    /// - governance id not 32 bytes of hex
    /// - malformed contract addresses or RPC URLs
    /// - duplicate chain names or a zero polling interval
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.governance.chain.is_empty()
            || self.governance.address.is_empty()
            || self.governance.id.is_empty()
        {
            return Err(anyhow::anyhow!("Empty Governance Info"));
        }

        crate::abi::parse_bytes32(&self.governance.id).map_err(|e| {
            anyhow::anyhow!("Configuration error: invalid governance id: {}", e)
        })?;
        crate::abi::parse_address(&self.governance.address).map_err(|e| {
            anyhow::anyhow!("Configuration error: invalid governance address: {}", e)
        })?;
        crate::abi::parse_address(&self.hub.hub_contract_addr).map_err(|e| {
            anyhow::anyhow!("Configuration error: invalid hub contract address: {}", e)
        })?;
        validate_url("hub", &self.hub.rpc_url)?;

        if self.hub.polling_interval_ms == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: hub polling_interval_ms must be greater than zero"
            ));
        }

        let mut names = HashSet::new();
        for chain in &self.chains {
            if !names.insert(chain.name.as_str()) {
                return Err(anyhow::anyhow!(
                    "Configuration error: chain '{}' is configured more than once",
                    chain.name
                ));
            }
            validate_url(&chain.name, &chain.rpc_url)?;
            crate::abi::parse_address(&chain.vault_addr).map_err(|e| {
                anyhow::anyhow!(
                    "Configuration error: invalid vault address for {}: {}",
                    chain.name,
                    e
                )
            })?;
        }

        if let Some(ref gov_chain) = self.governance_chain {
            validate_url(&gov_chain.name, &gov_chain.rpc_url)?;
            validate_url("gas oracle", &gov_chain.gas_oracle_url)?;
        }

        Ok(())
    }

    /// Creates a default configuration with placeholder values.
    ///
    /// This configuration is suitable for local development and testing.
    /// For production use, all placeholder values must be replaced.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self {
            hub: HubConfig {
                name: "ORBIT".to_string(),
                rpc_url: "http://127.0.0.1:8545".to_string(),
                chain_id: 1337,
                hub_contract_addr: "0x0000000000000000000000000000000000000001".to_string(),
                polling_interval_ms: 1000,
            },
            governance: GovernanceConfig {
                chain: "ETH".to_string(),
                address: "0x0000000000000000000000000000000000000002".to_string(),
                id: format!("0x{}", "00".repeat(31) + "01"),
            },
            chains: Vec::new(),
            validator: ValidatorConfig {
                private_key_env: default_private_key_env(),
                rpc_timeout_ms: default_rpc_timeout_ms(),
            },
            broadcaster: BroadcasterConfig::default(),
            governance_chain: None,
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3334,
                cors_origins: vec!["http://localhost:3334".to_string()],
            },
        }
    }

    /// Looks up a watched chain by its tag.
    pub fn chain(&self, name: &str) -> Option<&SwapChainConfig> {
        self.chains.iter().find(|c| c.name == name)
    }
}

fn validate_url(label: &str, raw: &str) -> anyhow::Result<()> {
    url::Url::parse(raw)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("Configuration error: invalid RPC URL for {} ('{}'): {}", label, raw, e))
}
