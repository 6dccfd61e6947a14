//! Order-flow aggregation engine.
//!
//! Owns the session ledger, sliding-window ledger, and depth tracker behind a
//! single lock and exposes the ingestion and query API used by a ladder.
//! Prices cross this boundary as `f64` and are snapped to [`PriceLevel`]s with
//! the instrument tick size given at construction.

use crate::{
    depth::DepthDeltaTracker,
    imbalance::ImbalanceCalculator,
    session::{LevelVolume, SessionLedger},
    window::SlidingWindowLedger,
};
use ladder_core::{
    BookSide, Config, OrderFlowStrength, PriceLevel, Quantity, Result, Side, SignedQuantity,
    Tick, TimestampMs, TradeCell,
};
use ladder_ingestion::{ClassificationStats, MidpointClassifier, TradeClassifier};
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Mutable engine state.
#[derive(Debug, Default)]
struct Ledgers {
    session: SessionLedger,
    window: SlidingWindowLedger,
    depth: DepthDeltaTracker,
    stats: ClassificationStats,
    /// Largest per-level session volume seen this session.
    max_volume: Quantity,
}

/// Order-flow engine shared between one tick producer and any number of
/// readers.
///
/// Every method takes `&self`. Reads share the lock; ingestion, resets, and
/// the consuming queries (`depth_delta`, `last_buy_size`, `last_sell_size`)
/// take it exclusively, so each call is atomic with respect to the others.
pub struct OrderFlowEngine {
    classifier: Box<dyn TradeClassifier>,
    calculator: ImbalanceCalculator,
    tick_size: f64,
    state: RwLock<Ledgers>,
}

impl OrderFlowEngine {
    /// Create an engine with the midpoint classifier.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_classifier(config, Box::new(MidpointClassifier))
    }

    /// Create an engine with a custom classification strategy.
    pub fn with_classifier(config: &Config, classifier: Box<dyn TradeClassifier>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            classifier,
            calculator: ImbalanceCalculator::new(&config.order_flow),
            tick_size: config.instrument.tick_size,
            state: RwLock::new(Ledgers::default()),
        })
    }

    /// Instrument tick size.
    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Snap a price to its level.
    #[inline]
    pub fn level(&self, price: f64) -> PriceLevel {
        PriceLevel::from_price(price, self.tick_size)
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Classify a trade and fold it into the session totals and, when
    /// `update_window` is set, the sliding window.
    ///
    /// Historical replay passes `update_window = false` to seed session totals
    /// without disturbing the live window.
    pub fn classify_and_record(
        &self,
        update_window: bool,
        ask: f64,
        bid: f64,
        price: f64,
        size: Quantity,
        ts_ms: TimestampMs,
    ) -> Side {
        let side = self.classifier.classify(ask, bid, price, size, ts_ms);
        let level = self.level(price);

        let mut state = self.state.write();
        state.session.add(level, side, size);
        if update_window {
            let quote_px = match side {
                Side::Buyer => ask,
                Side::Seller => bid,
            };
            state.window.record(level, side, size, quote_px, ts_ms);
        }

        state.stats.record(side, size);
        let volume = state.session.total_at(level);
        state.max_volume = state.max_volume.max(volume);

        side
    }

    /// [`classify_and_record`](Self::classify_and_record) for a tick.
    pub fn record_tick(&self, tick: &Tick, update_window: bool) -> Side {
        self.classify_and_record(
            update_window,
            tick.ask,
            tick.bid,
            tick.price,
            tick.size,
            tick.ts_ms,
        )
    }

    /// Drop window cells older than `window_seconds` relative to `now_ms`.
    ///
    /// Call once per incoming tick, before recording it. `now_ms` must not go
    /// backwards; an earlier time under-evicts.
    pub fn evict_stale(&self, now_ms: TimestampMs, window_seconds: u32) -> usize {
        let evicted = self.state.write().window.evict_stale(now_ms, window_seconds);
        if evicted > 0 {
            trace!(now_ms, window_seconds, evicted, "Evicted stale window cells");
        }
        evicted
    }

    /// Clear session totals, depth history, statistics, and the window.
    pub fn reset_session(&self) {
        *self.state.write() = Ledgers::default();
        debug!("Order flow session reset");
    }

    /// Clear the sliding window only.
    pub fn reset_window(&self) {
        self.state.write().window.clear();
        debug!("Order flow sliding window reset");
    }

    // ------------------------------------------------------------------
    // Session volume
    // ------------------------------------------------------------------

    /// Buy plus sell session volume at `price`.
    pub fn volume_at_price(&self, price: f64) -> Quantity {
        self.state.read().session.total_at(self.level(price))
    }

    /// Session buyer volume at `price`.
    pub fn buy_volume_at_price(&self, price: f64) -> Quantity {
        self.state.read().session.volume(self.level(price), Side::Buyer)
    }

    /// Session seller volume at `price`.
    pub fn sell_volume_at_price(&self, price: f64) -> Quantity {
        self.state.read().session.volume(self.level(price), Side::Seller)
    }

    /// Every traded level this session, ascending.
    pub fn session_levels(&self) -> Vec<LevelVolume> {
        self.state.read().session.levels()
    }

    /// Largest per-level session volume seen after any recorded trade.
    pub fn max_volume(&self) -> Quantity {
        self.state.read().max_volume
    }

    /// Classification counts for the session.
    pub fn stats(&self) -> ClassificationStats {
        self.state.read().stats.clone()
    }

    // ------------------------------------------------------------------
    // Sliding window
    // ------------------------------------------------------------------

    /// Sum of resident buyer cells.
    pub fn window_buy_total(&self) -> Quantity {
        self.state.read().window.total(Side::Buyer)
    }

    /// Sum of resident seller cells.
    pub fn window_sell_total(&self) -> Quantity {
        self.state.read().window.total(Side::Seller)
    }

    /// Copy of the window cell at `price`.
    pub fn window_cell_at(&self, price: f64, side: Side) -> Option<TradeCell> {
        self.state.read().window.cell(self.level(price), side).copied()
    }

    // ------------------------------------------------------------------
    // Imbalance and strength
    // ------------------------------------------------------------------

    /// Window buyer volume on buy imbalances still valid at `current_price`.
    pub fn imbalanced_buy_volume(&self, current_price: f64) -> Quantity {
        let state = self.state.read();
        self.calculator
            .imbalanced_buy_volume(&state.window, self.level(current_price))
    }

    /// Window seller volume on sell imbalances still valid at `current_price`.
    pub fn imbalanced_sell_volume(&self, current_price: f64) -> Quantity {
        let state = self.state.read();
        self.calculator
            .imbalanced_sell_volume(&state.window, self.level(current_price))
    }

    /// Buy/sell strength at `current_price`.
    pub fn strength(&self, current_price: f64) -> OrderFlowStrength {
        let state = self.state.read();
        self.calculator.strength(&state.window, self.level(current_price))
    }

    /// Session buys at `price` dominate session sells one tick below.
    pub fn session_buy_imbalance(&self, price: f64) -> bool {
        let state = self.state.read();
        self.calculator
            .session_buy_imbalance(&state.session, self.level(price))
    }

    /// Session sells at `price` dominate session buys one tick above.
    pub fn session_sell_imbalance(&self, price: f64) -> bool {
        let state = self.state.read();
        self.calculator
            .session_sell_imbalance(&state.session, self.level(price))
    }

    /// Window buy cell at `price` dominates the sell cell one tick below.
    pub fn window_buy_imbalance(&self, price: f64) -> bool {
        let state = self.state.read();
        self.calculator
            .window_buy_imbalance(&state.window, self.level(price))
    }

    /// Window sell cell at `price` dominates the buy cell one tick above.
    pub fn window_sell_imbalance(&self, price: f64) -> bool {
        let state = self.state.read();
        self.calculator
            .window_sell_imbalance(&state.window, self.level(price))
    }

    // ------------------------------------------------------------------
    // Consuming queries
    // ------------------------------------------------------------------

    /// Change in resting size at `price` since the last non-zero observation.
    pub fn depth_delta(&self, price: f64, current_size: Quantity, side: BookSide) -> SignedQuantity {
        self.state
            .write()
            .depth
            .delta(self.level(price), current_size, side)
    }

    /// Depth change only when the level has size and the size moved.
    pub fn visible_depth_delta(
        &self,
        price: f64,
        current_size: Quantity,
        side: BookSide,
    ) -> Option<SignedQuantity> {
        self.state
            .write()
            .depth
            .visible_delta(self.level(price), current_size, side)
    }

    /// New buyer size at `price` since the last read; advances the baseline.
    pub fn last_buy_size(&self, price: f64) -> Quantity {
        self.state.write().window.last_size(self.level(price), Side::Buyer)
    }

    /// New seller size at `price` since the last read; advances the baseline.
    pub fn last_sell_size(&self, price: f64) -> Quantity {
        self.state.write().window.last_size(self.level(price), Side::Seller)
    }

    /// Acknowledge a displayed buyer size at `price`.
    pub fn remove_last_buy(&self, price: f64) {
        self.state.write().window.remove_last(self.level(price), Side::Buyer);
    }

    /// Acknowledge a displayed seller size at `price`.
    pub fn remove_last_sell(&self, price: f64) {
        self.state.write().window.remove_last(self.level(price), Side::Seller);
    }

    /// Read the last buyer size and acknowledge it when positive.
    pub fn consume_last_buy(&self, price: f64) -> Option<Quantity> {
        self.consume_last(price, Side::Buyer)
    }

    /// Read the last seller size and acknowledge it when positive.
    pub fn consume_last_sell(&self, price: f64) -> Option<Quantity> {
        self.consume_last(price, Side::Seller)
    }

    fn consume_last(&self, price: f64, side: Side) -> Option<Quantity> {
        let level = self.level(price);
        let mut state = self.state.write();

        let size = state.window.last_size(level, side);
        if size > 0 {
            state.window.remove_last(level, side);
            Some(size)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> OrderFlowEngine {
        OrderFlowEngine::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::default();
        config.order_flow.imbalance_factor = 1.0;
        assert!(OrderFlowEngine::new(&config).is_err());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let engine = engine();

        engine.evict_stale(0, 60);
        assert_eq!(engine.classify_and_record(true, 100.25, 100.0, 100.25, 10, 0), Side::Buyer);
        engine.evict_stale(1_000, 60);
        assert_eq!(engine.classify_and_record(true, 100.25, 100.0, 100.0, 4, 1_000), Side::Seller);

        assert_eq!(engine.buy_volume_at_price(100.25), 10);
        assert_eq!(engine.sell_volume_at_price(100.0), 4);
        assert_eq!(engine.volume_at_price(100.25), 10);
        assert_eq!(engine.volume_at_price(100.0), 4);

        // 10 buys at 100.25 over 4 sells at 100.00 is a buy imbalance:
        // (10 + 10) / (10 + 4 + 10 + 0) on the buy side.
        assert_eq!(engine.imbalanced_buy_volume(100.0), 10);
        assert_eq!(engine.imbalanced_sell_volume(100.0), 0);

        let strength = engine.strength(100.0);
        assert_relative_eq!(strength.buy_strength, 20.0 / 24.0 * 100.0);
        assert_relative_eq!(strength.sell_strength, 4.0 / 24.0 * 100.8);
        assert!(strength.buy_strength > 50.0);
    }

    #[test]
    fn test_float_noise_lands_on_same_level() {
        let engine = engine();
        engine.classify_and_record(false, 100.25, 100.0, 100.25, 3, 0);
        engine.classify_and_record(false, 100.25, 100.0, 100.1 + 0.15, 2, 0);

        assert_eq!(engine.buy_volume_at_price(100.25), 5);
    }

    #[test]
    fn test_backfill_skips_window() {
        let engine = engine();
        engine.classify_and_record(false, 100.25, 100.0, 100.25, 10, 0);

        assert_eq!(engine.volume_at_price(100.25), 10);
        assert_eq!(engine.window_buy_total(), 0);
        assert!(engine.window_cell_at(100.25, Side::Buyer).is_none());
    }

    #[test]
    fn test_window_cell_snapshot() {
        let engine = engine();
        engine.classify_and_record(true, 100.25, 100.0, 100.25, 10, 0);
        engine.classify_and_record(true, 100.5, 100.25, 100.25, 2, 500);

        // Second trade printed at the bid: a sell at 100.25.
        let buy = engine.window_cell_at(100.25, Side::Buyer).unwrap();
        assert_eq!(buy.size, 10);
        assert_eq!(buy.quote_px, 100.25);

        let sell = engine.window_cell_at(100.25, Side::Seller).unwrap();
        assert_eq!(sell.size, 2);
        assert_eq!(sell.quote_px, 100.25);
        assert_eq!(sell.ts_ms, 500);
    }

    #[test]
    fn test_session_survives_window_reset() {
        let engine = engine();
        for size in [1, 2, 3] {
            engine.classify_and_record(true, 100.25, 100.0, 100.0, size, 0);
        }
        engine.depth_delta(100.0, 40, BookSide::Bid);

        engine.reset_window();

        assert_eq!(engine.sell_volume_at_price(100.0), 6);
        assert_eq!(engine.window_sell_total(), 0);
        assert_eq!(engine.depth_delta(100.0, 45, BookSide::Bid), 5);
    }

    #[test]
    fn test_reset_session_clears_everything() {
        let engine = engine();
        engine.classify_and_record(true, 100.25, 100.0, 100.25, 10, 0);
        engine.depth_delta(100.0, 40, BookSide::Bid);

        engine.reset_session();

        assert_eq!(engine.volume_at_price(100.25), 0);
        assert_eq!(engine.window_buy_total(), 0);
        assert_eq!(engine.max_volume(), 0);
        assert_eq!(engine.stats().total_trades, 0);
        assert_eq!(engine.depth_delta(100.0, 45, BookSide::Bid), 0);
    }

    #[test]
    fn test_eviction_window() {
        let engine = engine();
        let t = 5_000;
        engine.classify_and_record(true, 100.25, 100.0, 100.25, 7, t);
        assert_eq!(engine.last_buy_size(100.25), 7);

        engine.evict_stale(t + 59_999, 60);
        assert!(engine.window_cell_at(100.25, Side::Buyer).is_some());

        assert_eq!(engine.evict_stale(t + 60_001, 60), 1);
        assert!(engine.window_cell_at(100.25, Side::Buyer).is_none());
        assert_eq!(engine.window_buy_total(), 0);
        // Session volume is unaffected by eviction.
        assert_eq!(engine.volume_at_price(100.25), 7);
    }

    #[test]
    fn test_last_size_protocol() {
        let engine = engine();
        engine.classify_and_record(true, 100.25, 100.0, 100.25, 5, 0);

        assert_eq!(engine.last_buy_size(100.25), 5);
        assert_eq!(engine.last_buy_size(100.25), 0);

        engine.remove_last_buy(100.25);
        engine.classify_and_record(true, 100.25, 100.0, 100.25, 3, 100);
        assert_eq!(engine.last_buy_size(100.25), 3);
    }

    #[test]
    fn test_consume_last_sell() {
        let engine = engine();
        assert_eq!(engine.consume_last_sell(100.0), None);

        engine.classify_and_record(true, 100.25, 100.0, 100.0, 4, 0);
        assert_eq!(engine.consume_last_sell(100.0), Some(4));

        engine.classify_and_record(true, 100.25, 100.0, 100.0, 6, 10);
        assert_eq!(engine.consume_last_sell(100.0), Some(6));
        assert_eq!(engine.consume_last_sell(100.0), Some(10));
    }

    #[test]
    fn test_imbalance_through_engine() {
        let engine = engine();
        // Sell 5 at 99.75, buy 20 at 100.00.
        engine.classify_and_record(true, 100.0, 99.75, 99.75, 5, 0);
        engine.classify_and_record(true, 100.0, 99.75, 100.0, 20, 0);

        assert_eq!(engine.imbalanced_buy_volume(100.0), 20);
        assert_eq!(engine.imbalanced_buy_volume(97.5), 20);
        assert_eq!(engine.imbalanced_buy_volume(97.25), 0);
        assert_eq!(engine.imbalanced_buy_volume(150.0), 20);
        assert_eq!(engine.imbalanced_sell_volume(100.0), 0);

        assert!(engine.window_buy_imbalance(100.0));
        assert!(engine.session_buy_imbalance(100.0));
        assert!(!engine.session_sell_imbalance(99.75));
        assert!(!engine.window_sell_imbalance(99.75));
    }

    #[test]
    fn test_max_volume_and_stats() {
        let engine = engine();
        engine.classify_and_record(false, 100.25, 100.0, 100.25, 10, 0);
        engine.classify_and_record(false, 100.25, 100.0, 100.0, 4, 0);
        engine.classify_and_record(false, 100.25, 100.0, 100.0, 8, 0);

        assert_eq!(engine.max_volume(), 12);
        let stats = engine.stats();
        assert_eq!(stats.buyer_volume, 10);
        assert_eq!(stats.seller_volume, 12);
        assert_eq!(engine.session_levels().len(), 2);
    }

    struct AlwaysBuyer;

    impl TradeClassifier for AlwaysBuyer {
        fn classify(&self, _: f64, _: f64, _: f64, _: Quantity, _: TimestampMs) -> Side {
            Side::Buyer
        }
    }

    #[test]
    fn test_custom_classifier() {
        let engine =
            OrderFlowEngine::with_classifier(&Config::default(), Box::new(AlwaysBuyer)).unwrap();
        engine.classify_and_record(true, 100.25, 100.0, 100.0, 4, 0);

        assert_eq!(engine.buy_volume_at_price(100.0), 4);
        assert_eq!(engine.sell_volume_at_price(100.0), 0);
    }
}
