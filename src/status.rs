//! Status registry shared by every chain watcher and the operator API.
//!
//! Records node connection states, last seen block heights, the last block each
//! chain submitted a validation for, and the validator addresses in use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// STATUS DATA STRUCTURES
// ============================================================================

/// Connection state of one RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Reconnecting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    pub endpoint: String,
    pub status: ConnectionStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeight {
    pub block: u64,
    pub updated_at: DateTime<Utc>,
}

/// Last successful submission of `method`, with the block it was triggered by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub method: String,
    pub block: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time copy of the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Keyed by chain tag
    pub connections: BTreeMap<String, NodeStatus>,
    /// Keyed by chain tag; source heights use `<CHAIN>_MAINNET`
    pub block_heights: BTreeMap<String, BlockHeight>,
    /// Keyed by chain tag
    pub progress: BTreeMap<String, Progress>,
    /// Validator address per chain tag
    pub addresses: BTreeMap<String, String>,
}

// ============================================================================
// STATUS REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_connection_status(&self, chain: &str, endpoint: &str, status: ConnectionStatus) {
        let mut state = self.inner.write().await;
        state.connections.insert(
            chain.to_string(),
            NodeStatus {
                endpoint: endpoint.to_string(),
                status,
                updated_at: Utc::now(),
            },
        );
    }

    pub async fn set_block_height(&self, chain: &str, block: u64) {
        let mut state = self.inner.write().await;
        state.block_heights.insert(
            chain.to_string(),
            BlockHeight {
                block,
                updated_at: Utc::now(),
            },
        );
    }

    pub async fn report_progress(&self, chain: &str, method: &str, block: Option<u64>) {
        let mut state = self.inner.write().await;
        state.progress.insert(
            chain.to_string(),
            Progress {
                method: method.to_string(),
                block,
                updated_at: Utc::now(),
            },
        );
    }

    pub async fn set_address(&self, chain: &str, address: &str) {
        let mut state = self.inner.write().await;
        state.addresses.insert(chain.to_string(), address.to_string());
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().await.clone()
    }
}
