//! Tick feed driving the order-flow engine.
//!
//! Backfill seeds session totals from history without touching the sliding
//! window; live ticks advance the trade clock, evict stale window cells, and
//! then record the trade.

use ladder_core::{Side, Tick, TimestampMs};
use ladder_features::OrderFlowEngine;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Result of a historical backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    /// Ticks recorded into session totals.
    pub recorded: usize,
    /// Ticks dropped for predating the session.
    pub skipped: usize,
}

/// Producer side of the engine.
pub struct SessionFeed {
    engine: Arc<OrderFlowEngine>,
    window_seconds: u32,
}

impl SessionFeed {
    /// Create a feed with the given window length.
    pub fn new(engine: Arc<OrderFlowEngine>, window_seconds: u32) -> Self {
        Self {
            engine,
            window_seconds,
        }
    }

    /// Shared engine handle for readers.
    pub fn engine(&self) -> &Arc<OrderFlowEngine> {
        &self.engine
    }

    /// Sliding window length in seconds.
    pub fn window_seconds(&self) -> u32 {
        self.window_seconds
    }

    /// Rebuild session totals from historical ticks.
    ///
    /// Starts from a clean session and ignores ticks before `session_begin`.
    pub fn backfill<'a, I>(&self, ticks: I, session_begin: TimestampMs) -> BackfillSummary
    where
        I: IntoIterator<Item = &'a Tick>,
    {
        self.engine.reset_session();

        let mut summary = BackfillSummary::default();
        for tick in ticks {
            if tick.ts_ms < session_begin {
                summary.skipped += 1;
                continue;
            }
            self.engine.record_tick(tick, false);
            summary.recorded += 1;
        }

        info!(
            recorded = summary.recorded,
            skipped = summary.skipped,
            max_volume = self.engine.max_volume(),
            "Backfill complete"
        );
        summary
    }

    /// Process one live tick.
    pub fn on_tick(&self, tick: &Tick) -> Side {
        if tick.first_of_session {
            info!(ts_ms = tick.ts_ms, "New session, clearing order flow");
            self.engine.reset_session();
        }

        self.engine.evict_stale(tick.ts_ms, self.window_seconds);
        self.engine.record_tick(tick, true)
    }

    /// Process a batch of live ticks in order.
    pub fn on_ticks<'a, I>(&self, ticks: I)
    where
        I: IntoIterator<Item = &'a Tick>,
    {
        for tick in ticks {
            self.on_tick(tick);
        }
    }

    /// User-triggered window clear; session totals are kept.
    pub fn clear_window(&self) {
        self.engine.reset_window();
    }
}
