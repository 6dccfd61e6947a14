//! Trade side inference from the prevailing quote.
//!
//! Every trade is attributed to either the buyer or the seller; there is no
//! ambiguous bucket.

use ladder_core::{Quantity, Side, Tick, TimestampMs};
use serde::{Deserialize, Serialize};

/// Strategy that decides which side initiated a trade.
///
/// Implementations must be stateless and deterministic.
pub trait TradeClassifier: Send + Sync {
    /// Classify a trade given the quote it printed against.
    fn classify(
        &self,
        ask: f64,
        bid: f64,
        price: f64,
        size: Quantity,
        ts_ms: TimestampMs,
    ) -> Side;

    /// Classify a tick.
    fn classify_tick(&self, tick: &Tick) -> Side {
        self.classify(tick.ask, tick.bid, tick.price, tick.size, tick.ts_ms)
    }
}

/// Midpoint classifier.
///
/// A trade above the bid/ask midpoint is a buy, anything else is a sell. When
/// the market is locked (`ask == bid`) the shared price takes the place of the
/// midpoint. Trades exactly at the midpoint are sells.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointClassifier;

impl TradeClassifier for MidpointClassifier {
    fn classify(
        &self,
        ask: f64,
        bid: f64,
        price: f64,
        _size: Quantity,
        _ts_ms: TimestampMs,
    ) -> Side {
        let reference = if ask == bid { ask } else { (ask + bid) / 2.0 };

        if price > reference {
            Side::Buyer
        } else {
            Side::Seller
        }
    }
}

/// Counts of classified trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Total trades classified.
    pub total_trades: u64,
    /// Trades classified as buyer-initiated.
    pub buyer_trades: u64,
    /// Trades classified as seller-initiated.
    pub seller_trades: u64,
    /// Total volume classified.
    pub total_volume: Quantity,
    /// Buyer-initiated volume.
    pub buyer_volume: Quantity,
    /// Seller-initiated volume.
    pub seller_volume: Quantity,
}

impl ClassificationStats {
    /// Fold one classified trade into the counts.
    pub fn record(&mut self, side: Side, size: Quantity) {
        self.total_trades += 1;
        self.total_volume += size;

        match side {
            Side::Buyer => {
                self.buyer_trades += 1;
                self.buyer_volume += size;
            }
            Side::Seller => {
                self.seller_trades += 1;
                self.seller_volume += size;
            }
        }
    }

    /// Fraction of volume that was buyer-initiated.
    pub fn buyer_fraction(&self) -> f64 {
        if self.total_volume > 0 {
            self.buyer_volume as f64 / self.total_volume as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
