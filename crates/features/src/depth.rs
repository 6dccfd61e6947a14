//! Resting depth change tracking.
//!
//! Remembers the last non-zero size seen at each bid and ask level so that
//! successive depth snapshots can be turned into signed size changes.

use ladder_core::{BookSide, PriceLevel, Quantity, SignedQuantity};
use std::collections::BTreeMap;

/// Last observed non-zero resting size per level.
#[derive(Debug, Clone, Default)]
pub struct DepthDeltaTracker {
    bids: BTreeMap<PriceLevel, Quantity>,
    asks: BTreeMap<PriceLevel, Quantity>,
}

impl DepthDeltaTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, side: BookSide) -> &BTreeMap<PriceLevel, Quantity> {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// Change in resting size at `level` since the previous non-zero
    /// observation.
    ///
    /// A non-zero `current` replaces the stored size. A zero `current` is
    /// never stored, so an emptied level keeps its last size. Returns 0 when
    /// the level has no history.
    pub fn delta(&mut self, level: PriceLevel, current: Quantity, side: BookSide) -> SignedQuantity {
        let table = match side {
            BookSide::Bid => &mut self.bids,
            BookSide::Ask => &mut self.asks,
        };

        let previous = if current > 0 {
            table.insert(level, current)
        } else {
            table.get(&level).copied()
        };

        match previous {
            Some(previous) => current as SignedQuantity - previous as SignedQuantity,
            None => 0,
        }
    }

    /// Delta as a ladder displays it: only for a level that currently has
    /// size and actually changed.
    pub fn visible_delta(
        &mut self,
        level: PriceLevel,
        current: Quantity,
        side: BookSide,
    ) -> Option<SignedQuantity> {
        let change = self.delta(level, current, side);
        (current > 0 && change != 0).then_some(change)
    }

    /// Stored size at `level`.
    pub fn previous(&self, level: PriceLevel, side: BookSide) -> Option<Quantity> {
        self.table(side).get(&level).copied()
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }
}
