//! Session volume-at-price ledger.
//!
//! Cumulative buyer and seller volume per price level since the last session
//! reset. Nothing is evicted until the session is cleared.

use ladder_core::{PriceLevel, Quantity, Side};
use serde::Serialize;
use std::collections::BTreeMap;

/// Session volume at a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelVolume {
    pub level: PriceLevel,
    pub buy_volume: Quantity,
    pub sell_volume: Quantity,
}

impl LevelVolume {
    /// Buy plus sell volume.
    pub fn total(&self) -> Quantity {
        self.buy_volume + self.sell_volume
    }
}

/// Per-level session totals.
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    buys: BTreeMap<PriceLevel, Quantity>,
    sells: BTreeMap<PriceLevel, Quantity>,
}

impl SessionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, side: Side) -> &BTreeMap<PriceLevel, Quantity> {
        match side {
            Side::Buyer => &self.buys,
            Side::Seller => &self.sells,
        }
    }

    /// Add traded size at a level.
    pub fn add(&mut self, level: PriceLevel, side: Side, size: Quantity) {
        let table = match side {
            Side::Buyer => &mut self.buys,
            Side::Seller => &mut self.sells,
        };
        *table.entry(level).or_insert(0) += size;
    }

    /// Volume for one side at a level (0 if never traded).
    pub fn volume(&self, level: PriceLevel, side: Side) -> Quantity {
        self.table(side).get(&level).copied().unwrap_or(0)
    }

    /// Buy plus sell volume at a level.
    pub fn total_at(&self, level: PriceLevel) -> Quantity {
        self.volume(level, Side::Buyer) + self.volume(level, Side::Seller)
    }

    /// Every traded level in ascending price order.
    pub fn levels(&self) -> Vec<LevelVolume> {
        let mut merged: BTreeMap<PriceLevel, LevelVolume> = BTreeMap::new();

        for (&level, &volume) in &self.buys {
            merged
                .entry(level)
                .or_insert(LevelVolume { level, buy_volume: 0, sell_volume: 0 })
                .buy_volume = volume;
        }
        for (&level, &volume) in &self.sells {
            merged
                .entry(level)
                .or_insert(LevelVolume { level, buy_volume: 0, sell_volume: 0 })
                .sell_volume = volume;
        }

        merged.into_values().collect()
    }

    /// Check if nothing has traded this session.
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.buys.clear();
        self.sells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_per_side() {
        let mut ledger = SessionLedger::new();
        let level = PriceLevel(400);

        ledger.add(level, Side::Buyer, 10);
        ledger.add(level, Side::Buyer, 5);
        ledger.add(level, Side::Seller, 4);

        assert_eq!(ledger.volume(level, Side::Buyer), 15);
        assert_eq!(ledger.volume(level, Side::Seller), 4);
        assert_eq!(ledger.total_at(level), 19);
    }

    #[test]
    fn test_missing_level_reads_zero() {
        let ledger = SessionLedger::new();
        assert_eq!(ledger.total_at(PriceLevel(1)), 0);
        assert_eq!(ledger.volume(PriceLevel(1), Side::Seller), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_levels_merge_sides() {
        let mut ledger = SessionLedger::new();
        ledger.add(PriceLevel(401), Side::Buyer, 10);
        ledger.add(PriceLevel(400), Side::Seller, 4);
        ledger.add(PriceLevel(401), Side::Seller, 2);

        let levels = ledger.levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level, PriceLevel(400));
        assert_eq!(levels[0].buy_volume, 0);
        assert_eq!(levels[0].sell_volume, 4);
        assert_eq!(levels[1].total(), 12);
    }

    #[test]
    fn test_clear() {
        let mut ledger = SessionLedger::new();
        ledger.add(PriceLevel(400), Side::Buyer, 1);
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
