//! Hub chain monitoring.
//!
//! One [`ChainWatcher`] runs per configured source chain. It polls the hub head,
//! turns head notifications into an ordered sequence of blocks with the
//! [`BlockRangeTracker`], and spawns one task per block that fetches relay events
//! and validates every swap found.

pub mod ingest;

use futures::future::join_all;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::context::ChainContext;
use crate::status::ConnectionStatus;
use crate::tracker::BlockRangeTracker;
use crate::types::TransferKind;
use crate::validator::{self, SwapOutcome};

// ============================================================================
// CHAIN WATCHER
// ============================================================================

pub struct ChainWatcher {
    ctx: Arc<ChainContext>,
    tracker: BlockRangeTracker,
}

impl ChainWatcher {
    pub fn new(ctx: Arc<ChainContext>) -> Self {
        Self {
            ctx,
            tracker: BlockRangeTracker::new(),
        }
    }

    pub fn context(&self) -> &Arc<ChainContext> {
        &self.ctx
    }

    /// Polls the hub head forever.
    ///
    /// Connection status moves `connecting -> connected`, and on failure
    /// `disconnected -> reconnecting -> connected`. Poll errors never touch the
    /// tracker.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let ctx = self.ctx.clone();
        let endpoint = ctx.hub_client.base_url().to_string();
        let interval = Duration::from_millis(ctx.polling_interval_ms);

        info!("[{}] Starting hub watcher on {}", ctx.name, endpoint);
        ctx.status
            .set_connection_status(&ctx.name, &endpoint, ConnectionStatus::Connecting)
            .await;

        let mut connected = false;
        let mut reconnecting = false;

        loop {
            if reconnecting {
                ctx.status
                    .set_connection_status(&ctx.name, &endpoint, ConnectionStatus::Reconnecting)
                    .await;
            }

            match ctx.hub_client.get_block_number().await {
                Ok(head) => {
                    if !connected {
                        ctx.status
                            .set_connection_status(&ctx.name, &endpoint, ConnectionStatus::Connected)
                            .await;
                        connected = true;
                        reconnecting = false;
                    }
                    self.on_head(head);
                }
                Err(e) => {
                    error!("[{}] subscribeNewBlock error: {:#}", ctx.name, e);
                    if connected {
                        ctx.status
                            .set_connection_status(&ctx.name, &endpoint, ConnectionStatus::Disconnected)
                            .await;
                        connected = false;
                    }
                    reconnecting = true;
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// Advances the tracker to `head` and spawns one processing task per new block,
    /// in increasing block order.
    pub fn on_head(&mut self, head: u64) -> Vec<JoinHandle<()>> {
        match self.tracker.on_new_block(head) {
            Some(range) => self.spawn_range(range),
            None => Vec::new(),
        }
    }

    fn spawn_range(&self, range: RangeInclusive<u64>) -> Vec<JoinHandle<()>> {
        range
            .map(|block| {
                let ctx = self.ctx.clone();
                tokio::spawn(async move { process_block(&ctx, block).await })
            })
            .collect()
    }
}

// ============================================================================
// BLOCK PROCESSING
// ============================================================================

/// Fetches relay events in `block` and validates each swap concurrently.
///
/// The block is skipped when every relay query fails; it is not rescanned.
pub async fn process_block(ctx: &ChainContext, block: u64) {
    ctx.status.set_block_height(&ctx.name, block).await;

    let events = match ingest::fetch_events(ctx, block, &TransferKind::ALL).await {
        Ok(events) => events,
        Err(e) => {
            error!(
                "[{}] Failed to fetch relay events in block {}, block skipped: {:#}",
                ctx.name, block, e
            );
            return;
        }
    };

    let results = join_all(events.iter().map(|event| validator::validate_swap(ctx, event))).await;

    for (event, result) in events.iter().zip(results) {
        let deposit_id = event.deposit_id().unwrap_or_default();
        match result {
            Ok(SwapOutcome::Submitted { tx_hash }) => {
                info!(
                    "[{}] {} submitted for depositId {}: {}",
                    ctx.name,
                    event.kind.validate_method(),
                    deposit_id,
                    tx_hash
                );
            }
            Ok(SwapOutcome::AlreadySigned { hash }) => {
                info!("[{}] Already signed. validated swapHash: {}", ctx.name, hash);
            }
            Ok(SwapOutcome::NotConfirmed { current, deposit_block }) => {
                info!(
                    "[{}] depositId({}) is not confirmed yet (current {:?}, deposit block {})",
                    ctx.name, deposit_id, current, deposit_block
                );
            }
            Err(e) => {
                error!(
                    "[{}] {} failed for depositId {} ({:?}): {}",
                    ctx.name,
                    event.kind.validate_method(),
                    deposit_id,
                    e.kind(),
                    e
                );
            }
        }
    }
}
