//! Confirmation gate.

use tracing::error;

use crate::context::ChainContext;

/// `current - deposit >= depth`; a deposit exactly `depth` blocks deep is confirmed.
pub fn is_confirmed(current: u64, deposit: u64, depth: u64) -> bool {
    current.saturating_sub(deposit) >= depth
}

/// Result of checking a deposit against the live source height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationCheck {
    /// Source height, `None` if it could not be read
    pub current: Option<u64>,
    pub confirmed: bool,
}

/// Reads the source chain height and applies [`is_confirmed`].
///
/// Fails closed: a height read error counts as not confirmed.
pub async fn current_height_confirms(ctx: &ChainContext, deposit: u64, depth: u64) -> ConfirmationCheck {
    match ctx.source_client.get_block_number().await {
        Ok(current) => ConfirmationCheck {
            current: Some(current),
            confirmed: is_confirmed(current, deposit, depth),
        },
        Err(e) => {
            error!("[{}] getBlockNumber() execute error: {:#}", ctx.name, e);
            ConfirmationCheck {
                current: None,
                confirmed: false,
            }
        }
    }
}
