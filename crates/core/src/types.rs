//! Core data types for the order-flow ladder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since Unix epoch (UTC), taken from the trade clock.
pub type TimestampMs = i64;

/// Traded or resting size.
pub type Quantity = u64;

/// Signed size change between two depth observations.
pub type SignedQuantity = i64;

/// Convert a UTC datetime to a trade-clock timestamp.
#[inline]
pub fn ts_from_datetime(dt: DateTime<Utc>) -> TimestampMs {
    dt.timestamp_millis()
}

/// Convert a trade-clock timestamp back to a UTC datetime.
#[inline]
pub fn ts_to_datetime(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts_ms)
}

/// A price expressed as an integer number of ticks.
///
/// Every ledger keys on `PriceLevel` so that two prices that differ only by
/// floating-point noise land on the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PriceLevel(pub i64);

impl PriceLevel {
    /// Snap a price to the nearest tick index.
    #[inline]
    pub fn from_price(price: f64, tick_size: f64) -> Self {
        PriceLevel((price / tick_size).round() as i64)
    }

    /// Convert back to a display price.
    #[inline]
    pub fn to_price(self, tick_size: f64) -> f64 {
        self.0 as f64 * tick_size
    }

    /// The level `ticks` away from this one (negative moves down).
    #[inline]
    pub fn offset(self, ticks: i64) -> Self {
        PriceLevel(self.0 + ticks)
    }

    /// Raw tick index.
    #[inline]
    pub fn ticks(self) -> i64 {
        self.0
    }
}

/// A single market trade with the prevailing quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp in milliseconds.
    pub ts_ms: TimestampMs,
    /// Best ask at the time of the trade.
    pub ask: f64,
    /// Best bid at the time of the trade.
    pub bid: f64,
    /// Trade price.
    pub price: f64,
    /// Trade size.
    pub size: Quantity,
    /// Set by the feed on the first tick of a new trading session.
    #[serde(default)]
    pub first_of_session: bool,
}

/// The aggressor of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buyer-initiated trade.
    Buyer,
    /// Seller-initiated trade.
    Seller,
}

impl Side {
    /// The other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buyer => Side::Seller,
            Side::Seller => Side::Buyer,
        }
    }
}

/// Side of the resting order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookSide {
    Bid,
    Ask,
}

/// Same-price trade volume accumulated in the sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeCell {
    /// Cumulative size since the cell was created.
    pub size: Quantity,
    /// Last seen ask for buyer cells, last seen bid for seller cells.
    pub quote_px: f64,
    /// Trade-clock time of the latest trade folded into the cell.
    pub ts_ms: TimestampMs,
}

/// Buy/sell strength pair, each nominally a percentage.
///
/// The two values are not guaranteed to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderFlowStrength {
    pub buy_strength: f64,
    pub sell_strength: f64,
}

impl OrderFlowStrength {
    /// Both values rounded half away from zero, as shown on the ladder.
    pub fn rounded(&self) -> (i64, i64) {
        (
            self.buy_strength.round() as i64,
            self.sell_strength.round() as i64,
        )
    }

    /// Split `total_rows` ladder rows between buyers and sellers.
    ///
    /// Buyer rows are rounded half to even; sellers get the remainder.
    pub fn bar(&self, total_rows: u32, threshold: u32) -> StrengthBar {
        let buy_rows = (total_rows as f64 * (self.buy_strength / 100.0))
            .round_ties_even()
            .clamp(0.0, total_rows as f64) as u32;

        StrengthBar {
            buy_rows,
            sell_rows: total_rows - buy_rows,
            buy_strong: self.buy_strength >= threshold as f64,
            sell_strong: self.sell_strength >= threshold as f64,
        }
    }
}

/// Row allocation of the strength bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthBar {
    pub buy_rows: u32,
    pub sell_rows: u32,
    /// Buy strength reached the highlight threshold.
    pub buy_strong: bool,
    /// Sell strength reached the highlight threshold.
    pub sell_strong: bool,
}
