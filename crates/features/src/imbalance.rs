//! Diagonal imbalance detection and buy/sell strength.
//!
//! A buy imbalance compares buyer volume at a level with seller volume one
//! tick below it; a sell imbalance compares seller volume at a level with
//! buyer volume one tick above it.

use crate::session::SessionLedger;
use crate::window::SlidingWindowLedger;
use ladder_core::config::OrderFlowConfig;
use ladder_core::{OrderFlowStrength, PriceLevel, Quantity, Side};

/// Imbalance and strength calculator.
#[derive(Debug, Clone)]
pub struct ImbalanceCalculator {
    imbalance_factor: f64,
    invalidate_distance: i64,
    buy_strength_scale: f64,
    sell_strength_scale: f64,
}

impl ImbalanceCalculator {
    /// Create a calculator from configuration.
    pub fn new(config: &OrderFlowConfig) -> Self {
        Self {
            imbalance_factor: config.imbalance_factor,
            invalidate_distance: i64::from(config.imbalance_invalidate_distance),
            buy_strength_scale: config.buy_strength_scale,
            sell_strength_scale: config.sell_strength_scale,
        }
    }

    /// Configured imbalance factor.
    pub fn imbalance_factor(&self) -> f64 {
        self.imbalance_factor
    }

    fn dominates(&self, size: Quantity, against: Quantity) -> bool {
        size as f64 >= against as f64 * self.imbalance_factor
    }

    fn strictly_dominates(&self, size: Quantity, against: Quantity) -> bool {
        size as f64 > against as f64 * self.imbalance_factor
    }

    /// Window buyer volume sitting on buy imbalances.
    ///
    /// A level is ignored once `current` has fallen more than the invalidate
    /// distance below it. There is no matching cut-off above the level.
    pub fn imbalanced_buy_volume(&self, window: &SlidingWindowLedger, current: PriceLevel) -> Quantity {
        window
            .cells(Side::Buyer)
            .filter(|(level, _)| current >= level.offset(-self.invalidate_distance))
            .filter_map(|(level, buy)| {
                let sell = window.cell(level.offset(-1), Side::Seller)?;
                self.dominates(buy.size, sell.size).then_some(buy.size)
            })
            .sum()
    }

    /// Window seller volume sitting on sell imbalances.
    ///
    /// A level is ignored once `current` has risen more than the invalidate
    /// distance above it. There is no matching cut-off below the level.
    pub fn imbalanced_sell_volume(&self, window: &SlidingWindowLedger, current: PriceLevel) -> Quantity {
        window
            .cells(Side::Seller)
            .filter(|(level, _)| current <= level.offset(self.invalidate_distance))
            .filter_map(|(level, sell)| {
                let buy = window.cell(level.offset(1), Side::Buyer)?;
                self.dominates(sell.size, buy.size).then_some(sell.size)
            })
            .sum()
    }

    /// Buy/sell strength from window volume plus imbalanced volume.
    pub fn strength(&self, window: &SlidingWindowLedger, current: PriceLevel) -> OrderFlowStrength {
        let mut buy_imbalance = self.imbalanced_buy_volume(window, current);
        let mut sell_imbalance = self.imbalanced_sell_volume(window, current);
        if buy_imbalance + sell_imbalance == 0 {
            buy_imbalance = 1;
            sell_imbalance = 1;
        }

        let mut window_buys = window.total(Side::Buyer);
        let mut window_sells = window.total(Side::Seller);
        if window_buys + window_sells == 0 {
            window_buys = 1;
            window_sells = 1;
        }

        let total = (window_buys + window_sells + buy_imbalance + sell_imbalance) as f64;

        OrderFlowStrength {
            buy_strength: (window_buys + buy_imbalance) as f64 / total * self.buy_strength_scale,
            sell_strength: (window_sells + sell_imbalance) as f64 / total * self.sell_strength_scale,
        }
    }

    /// Session buys at `level` strictly dominate session sells one tick below.
    pub fn session_buy_imbalance(&self, session: &SessionLedger, level: PriceLevel) -> bool {
        let buys = session.volume(level, Side::Buyer);
        let sells = session.volume(level.offset(-1), Side::Seller);
        buys > 0 && sells > 0 && self.strictly_dominates(buys, sells)
    }

    /// Session sells at `level` strictly dominate session buys one tick above.
    pub fn session_sell_imbalance(&self, session: &SessionLedger, level: PriceLevel) -> bool {
        let sells = session.volume(level, Side::Seller);
        let buys = session.volume(level.offset(1), Side::Buyer);
        buys > 0 && sells > 0 && self.strictly_dominates(sells, buys)
    }

    /// Window buy cell at `level` strictly dominates the sell cell one tick below.
    pub fn window_buy_imbalance(&self, window: &SlidingWindowLedger, level: PriceLevel) -> bool {
        match (
            window.cell(level, Side::Buyer),
            window.cell(level.offset(-1), Side::Seller),
        ) {
            (Some(buy), Some(sell)) => self.strictly_dominates(buy.size, sell.size),
            _ => false,
        }
    }

    /// Window sell cell at `level` strictly dominates the buy cell one tick above.
    pub fn window_sell_imbalance(&self, window: &SlidingWindowLedger, level: PriceLevel) -> bool {
        match (
            window.cell(level, Side::Seller),
            window.cell(level.offset(1), Side::Buyer),
        ) {
            (Some(sell), Some(buy)) => self.strictly_dominates(sell.size, buy.size),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calculator(factor: f64) -> ImbalanceCalculator {
        ImbalanceCalculator::new(&OrderFlowConfig {
            imbalance_factor: factor,
            ..OrderFlowConfig::default()
        })
    }

    // Tick size 0.25, so P = 100.00 is level 400.
    const P: PriceLevel = PriceLevel(400);

    fn buy_over_sell(buy: Quantity, sell: Quantity) -> SlidingWindowLedger {
        let mut window = SlidingWindowLedger::new();
        window.record(P, Side::Buyer, buy, 100.0, 0);
        window.record(P.offset(-1), Side::Seller, sell, 99.75, 0);
        window
    }

    #[test]
    fn test_buy_imbalance_counts_dominant_level() {
        let calc = calculator(2.0);
        let window = buy_over_sell(20, 5);
        assert_eq!(calc.imbalanced_buy_volume(&window, P), 20);
    }

    #[test]
    fn test_buy_imbalance_threshold_is_inclusive() {
        let calc = calculator(2.0);
        assert_eq!(calc.imbalanced_buy_volume(&buy_over_sell(10, 5), P), 10);
        assert_eq!(calc.imbalanced_buy_volume(&buy_over_sell(9, 5), P), 0);
    }

    #[test]
    fn test_buy_imbalance_needs_opposite_cell() {
        let calc = calculator(2.0);
        let mut window = SlidingWindowLedger::new();
        window.record(P, Side::Buyer, 20, 100.0, 0);
        assert_eq!(calc.imbalanced_buy_volume(&window, P), 0);
    }

    #[test]
    fn test_buy_imbalance_one_sided_invalidation() {
        let calc = calculator(2.0);
        let window = buy_over_sell(20, 5);

        // P - 2.5 is still valid, one more tick below is not.
        assert_eq!(calc.imbalanced_buy_volume(&window, P.offset(-10)), 20);
        assert_eq!(calc.imbalanced_buy_volume(&window, P.offset(-11)), 0);

        // Far above the level it still counts.
        assert_eq!(calc.imbalanced_buy_volume(&window, P.offset(400)), 20);
    }

    #[test]
    fn test_sell_imbalance_mirror() {
        let calc = calculator(2.0);
        let mut window = SlidingWindowLedger::new();
        window.record(P, Side::Seller, 30, 100.0, 0);
        window.record(P.offset(1), Side::Buyer, 10, 100.25, 0);

        assert_eq!(calc.imbalanced_sell_volume(&window, P), 30);
        assert_eq!(calc.imbalanced_sell_volume(&window, P.offset(10)), 30);
        assert_eq!(calc.imbalanced_sell_volume(&window, P.offset(11)), 0);
        assert_eq!(calc.imbalanced_sell_volume(&window, P.offset(-400)), 30);
        assert_eq!(calc.imbalanced_buy_volume(&window, P), 0);
    }

    #[test]
    fn test_strength_empty_window() {
        let calc = calculator(2.0);
        let strength = calc.strength(&SlidingWindowLedger::new(), P);

        assert_relative_eq!(strength.buy_strength, 50.0);
        assert_relative_eq!(strength.sell_strength, 50.4);
    }

    #[test]
    fn test_strength_with_imbalance() {
        let calc = calculator(2.0);
        let window = buy_over_sell(20, 5);

        // buys 20 + imbalance 20, sells 5 + 0, total 45
        let strength = calc.strength(&window, P);
        assert_relative_eq!(strength.buy_strength, 40.0 / 45.0 * 100.0);
        assert_relative_eq!(strength.sell_strength, 5.0 / 45.0 * 100.8);
    }

    #[test]
    fn test_strength_symmetric_scale() {
        let calc = ImbalanceCalculator::new(&OrderFlowConfig {
            sell_strength_scale: 100.0,
            ..OrderFlowConfig::default()
        });
        let strength = calc.strength(&buy_over_sell(20, 5), P);
        assert_relative_eq!(strength.buy_strength + strength.sell_strength, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_session_imbalance_is_strict() {
        let calc = calculator(2.0);
        let mut session = SessionLedger::new();
        session.add(P, Side::Buyer, 10);
        session.add(P.offset(-1), Side::Seller, 5);

        assert!(!calc.session_buy_imbalance(&session, P));

        session.add(P, Side::Buyer, 1);
        assert!(calc.session_buy_imbalance(&session, P));
        assert!(!calc.session_sell_imbalance(&session, P.offset(-1)));
    }

    #[test]
    fn test_session_sell_imbalance() {
        let calc = calculator(1.5);
        let mut session = SessionLedger::new();
        session.add(P, Side::Seller, 16);
        session.add(P.offset(1), Side::Buyer, 10);

        assert!(calc.session_sell_imbalance(&session, P));
        assert!(!calc.session_sell_imbalance(&session, P.offset(5)));
    }

    #[test]
    fn test_window_imbalance_flags() {
        let calc = calculator(2.0);
        let window = buy_over_sell(20, 5);

        assert!(calc.window_buy_imbalance(&window, P));
        assert!(!calc.window_sell_imbalance(&window, P.offset(-1)));
        assert!(!calc.window_buy_imbalance(&buy_over_sell(10, 5), P));
    }
}
