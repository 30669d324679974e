//! Block Range Tracker
//!
//! Turns an at-least-once stream of head notifications into an exactly-once,
//! strictly increasing sequence of block numbers to scan.

use std::ops::RangeInclusive;

/// Per-chain cursor over processed hub blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockRangeTracker {
    last_processed: Option<u64>,
}

impl BlockRangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest block handed out so far.
    pub fn last_processed(&self) -> Option<u64> {
        self.last_processed
    }

    /// Advances the cursor to `block`.
    ///
    /// The first notification yields just `[block, block]`. Afterwards every block
    /// between the cursor and `block` is yielded once, in order, so gaps in the
    /// feed are filled. Stale or repeated notifications yield nothing and leave
    /// the cursor untouched.
    pub fn on_new_block(&mut self, block: u64) -> Option<RangeInclusive<u64>> {
        let start = match self.last_processed {
            None => block,
            Some(last) => last.checked_add(1)?,
        };
        if block < start {
            return None;
        }
        self.last_processed = Some(block);
        Some(start..=block)
    }
}
