//! Gas price oracle client used for governance confirmations.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Oracle response; only the `fast` tier is used.
#[derive(Debug, Deserialize)]
struct GasPriceResponse {
    fast: f64,
}

#[derive(Debug, Clone)]
pub struct GasPriceOracle {
    client: Client,
    url: String,
}

impl GasPriceOracle {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Raw `fast` value reported by the oracle.
    pub async fn fast_gas_price_gwei(&self) -> Result<f64> {
        let response: GasPriceResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to send gas price request to {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Gas price oracle {} returned an error status", self.url))?
            .json()
            .await
            .with_context(|| format!("Failed to parse gas price response from {}", self.url))?;
        Ok(response.fast)
    }

    /// Gas price in wei for a confirmation transaction.
    pub async fn confirmation_gas_price(&self) -> Result<u64> {
        let fast = self.fast_gas_price_gwei().await?;
        Ok(confirmation_gas_price_wei(fast))
    }
}

/// `(fast * 0.1 + 0.5) * 1.2` gwei, truncated to whole wei.
///
/// The oracle reports `fast` in tenths of a gwei.
pub fn confirmation_gas_price_wei(fast: f64) -> u64 {
    ((fast * 0.1 + 0.5) * 1.2 * 1e9) as u64
}
