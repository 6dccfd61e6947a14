//! Ladder snapshot for output.

use crate::feed::BackfillSummary;
use ladder_core::{Config, OrderFlowStrength, Quantity, Side, StrengthBar};
use ladder_features::OrderFlowEngine;
use ladder_ingestion::ClassificationStats;
use serde::Serialize;

/// One price row of the ladder.
#[derive(Debug, Clone, Serialize)]
pub struct LadderRow {
    pub price: f64,
    pub buy_volume: Quantity,
    pub sell_volume: Quantity,
    pub window_buys: Option<Quantity>,
    pub window_sells: Option<Quantity>,
    pub session_buy_imbalance: bool,
    pub session_sell_imbalance: bool,
}

/// Full ladder state at the end of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct LadderReport {
    pub symbol: String,
    pub last_price: Option<f64>,
    pub backfill: BackfillSummary,
    pub live_ticks: usize,
    pub max_volume: Quantity,
    pub window_buy_total: Quantity,
    pub window_sell_total: Quantity,
    pub strength: Option<OrderFlowStrength>,
    pub strength_bar: Option<StrengthBar>,
    pub stats: ClassificationStats,
    /// Rows from highest to lowest price.
    pub rows: Vec<LadderRow>,
}

/// Snapshot the engine.
///
/// Strength is only computed once a last traded price is known.
pub fn build_report(
    engine: &OrderFlowEngine,
    config: &Config,
    last_price: Option<f64>,
    backfill: BackfillSummary,
    live_ticks: usize,
    ladder_rows: u32,
) -> LadderReport {
    let tick_size = engine.tick_size();

    let rows = engine
        .session_levels()
        .into_iter()
        .rev()
        .map(|level| {
            let price = level.level.to_price(tick_size);
            LadderRow {
                price,
                buy_volume: level.buy_volume,
                sell_volume: level.sell_volume,
                window_buys: engine.window_cell_at(price, Side::Buyer).map(|c| c.size),
                window_sells: engine.window_cell_at(price, Side::Seller).map(|c| c.size),
                session_buy_imbalance: engine.session_buy_imbalance(price),
                session_sell_imbalance: engine.session_sell_imbalance(price),
            }
        })
        .collect();

    let strength = last_price.map(|price| engine.strength(price));
    let strength_bar = strength.map(|s| s.bar(ladder_rows, config.strength.threshold));

    LadderReport {
        symbol: config.instrument.symbol.clone(),
        last_price,
        backfill,
        live_ticks,
        max_volume: engine.max_volume(),
        window_buy_total: engine.window_buy_total(),
        window_sell_total: engine.window_sell_total(),
        strength,
        strength_bar,
        stats: engine.stats(),
        rows,
    }
}
