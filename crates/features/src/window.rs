//! Sliding-window trade ledger.
//!
//! Holds one [`TradeCell`] per price level and side. A cell accumulates size
//! until it goes stale relative to the trade clock, at which point it is
//! removed outright. Alongside the cells the ledger keeps a per-level baseline
//! used by the "last size" consumer to report only new size.

use ladder_core::{PriceLevel, Quantity, Side, TimestampMs, TradeCell};
use std::collections::BTreeMap;

/// Cells and last-size baselines for one side.
#[derive(Debug, Clone, Default)]
struct WindowSide {
    cells: BTreeMap<PriceLevel, TradeCell>,
    baselines: BTreeMap<PriceLevel, Quantity>,
}

impl WindowSide {
    fn record(&mut self, level: PriceLevel, size: Quantity, quote_px: f64, ts_ms: TimestampMs) {
        let previous = self.cells.get(&level).map_or(0, |cell| cell.size);

        // An acknowledged level measures its next delta from the size it had
        // before this update.
        self.baselines.entry(level).or_insert(previous);

        self.cells.insert(
            level,
            TradeCell {
                size: previous + size,
                quote_px,
                ts_ms,
            },
        );
    }

    fn evict_stale(&mut self, now_ms: TimestampMs, window_ms: i64) -> usize {
        let baselines = &mut self.baselines;
        let before = self.cells.len();

        self.cells.retain(|level, cell| {
            let stale = now_ms - cell.ts_ms > window_ms;
            if stale {
                baselines.remove(level);
            }
            !stale
        });

        before - self.cells.len()
    }

    fn total(&self) -> Quantity {
        self.cells.values().map(|cell| cell.size).sum()
    }

    fn last_size(&mut self, level: PriceLevel) -> Quantity {
        let current = match self.cells.get(&level) {
            Some(cell) if cell.size > 0 => cell.size,
            _ => return 0,
        };

        let baseline = self.baselines.insert(level, current).unwrap_or(0);
        current.saturating_sub(baseline)
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.baselines.clear();
    }
}

/// Trailing per-level trade activity for both sides.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowLedger {
    buys: WindowSide,
    sells: WindowSide,
}

impl SlidingWindowLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, side: Side) -> &WindowSide {
        match side {
            Side::Buyer => &self.buys,
            Side::Seller => &self.sells,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut WindowSide {
        match side {
            Side::Buyer => &mut self.buys,
            Side::Seller => &mut self.sells,
        }
    }

    /// Fold a trade into the cell at `level`.
    ///
    /// `quote_px` is the ask for buyer trades and the bid for seller trades; it
    /// and `ts_ms` replace the cell's previous snapshot.
    pub fn record(
        &mut self,
        level: PriceLevel,
        side: Side,
        size: Quantity,
        quote_px: f64,
        ts_ms: TimestampMs,
    ) {
        self.side_mut(side).record(level, size, quote_px, ts_ms);
    }

    /// Remove every cell whose last trade is more than `window_seconds` older
    /// than `now_ms`, together with its last-size baseline.
    ///
    /// Returns the number of cells removed.
    pub fn evict_stale(&mut self, now_ms: TimestampMs, window_seconds: u32) -> usize {
        let window_ms = i64::from(window_seconds) * 1000;
        self.buys.evict_stale(now_ms, window_ms) + self.sells.evict_stale(now_ms, window_ms)
    }

    /// Cell at a level, if resident.
    pub fn cell(&self, level: PriceLevel, side: Side) -> Option<&TradeCell> {
        self.side(side).cells.get(&level)
    }

    /// Resident cells for one side in ascending price order.
    pub fn cells(&self, side: Side) -> impl Iterator<Item = (PriceLevel, &TradeCell)> {
        self.side(side).cells.iter().map(|(&level, cell)| (level, cell))
    }

    /// Sum of cell sizes on one side.
    pub fn total(&self, side: Side) -> Quantity {
        self.side(side).total()
    }

    /// Size added to the cell at `level` since its baseline, then move the
    /// baseline up to the current size.
    ///
    /// Returns 0 without touching the baseline when no cell is resident.
    pub fn last_size(&mut self, level: PriceLevel, side: Side) -> Quantity {
        self.side_mut(side).last_size(level)
    }

    /// Drop the baseline at `level`.
    pub fn remove_last(&mut self, level: PriceLevel, side: Side) {
        self.side_mut(side).baselines.remove(&level);
    }

    /// Baseline currently stored at `level`.
    pub fn baseline(&self, level: PriceLevel, side: Side) -> Option<Quantity> {
        self.side(side).baselines.get(&level).copied()
    }

    /// Number of resident cells across both sides.
    pub fn len(&self) -> usize {
        self.buys.cells.len() + self.sells.cells.len()
    }

    /// Check if no cells are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear cells and baselines on both sides.
    pub fn clear(&mut self) {
        self.buys.clear();
        self.sells.clear();
    }
}
