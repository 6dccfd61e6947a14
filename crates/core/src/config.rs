//! Configuration structures for the order-flow ladder.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest imbalance factor the product accepts.
pub const MIN_IMBALANCE_FACTOR: f64 = 1.5;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument configuration.
    pub instrument: InstrumentConfig,
    /// Imbalance and strength configuration.
    pub order_flow: OrderFlowConfig,
    /// Sliding window configuration.
    pub window: WindowConfig,
    /// Strength bar configuration.
    pub strength: StrengthConfig,
}

impl Config {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every value against its accepted range.
    pub fn validate(&self) -> Result<()> {
        let tick_size = self.instrument.tick_size;
        if !tick_size.is_finite() || tick_size <= 0.0 {
            return Err(Error::config(format!(
                "tick_size must be positive, got {tick_size}"
            )));
        }

        if !(self.order_flow.imbalance_factor >= MIN_IMBALANCE_FACTOR) {
            return Err(Error::config(format!(
                "imbalance_factor must be >= {MIN_IMBALANCE_FACTOR}, got {}",
                self.order_flow.imbalance_factor
            )));
        }

        if self.window.trade_sliding_window_seconds < 1 {
            return Err(Error::config("trade_sliding_window_seconds must be >= 1"));
        }

        if !(51..=100).contains(&self.strength.threshold) {
            return Err(Error::config(format!(
                "strength threshold must be within 51..=100, got {}",
                self.strength.threshold
            )));
        }

        Ok(())
    }
}

/// Instrument-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Trading symbol (e.g., "ES").
    pub symbol: String,
    /// Tick size (minimum price increment).
    pub tick_size: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "ES".to_string(),
            tick_size: 0.25,
        }
    }
}

/// Imbalance and strength configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderFlowConfig {
    /// Ratio one side must reach over the diagonal level to count as imbalanced.
    pub imbalance_factor: f64,
    /// Ticks price may travel through an imbalance before it is ignored.
    pub imbalance_invalidate_distance: u32,
    /// Multiplier applied to the buy strength ratio.
    pub buy_strength_scale: f64,
    /// Multiplier applied to the sell strength ratio.
    ///
    /// Defaults to 100.8, not 100.0. Existing ladders display this value, so
    /// the asymmetry is kept; set it to 100.0 for a strength pair summing to 100.
    pub sell_strength_scale: f64,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            imbalance_factor: 2.0,
            imbalance_invalidate_distance: 10,
            buy_strength_scale: 100.0,
            sell_strength_scale: 100.8,
        }
    }
}

/// Sliding window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window length in seconds of trade-clock time.
    pub trade_sliding_window_seconds: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            trade_sliding_window_seconds: 60,
        }
    }
}

/// Strength bar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthConfig {
    /// Strength (percent) at which a side is highlighted.
    pub threshold: u32,
}

impl Default for StrengthConfig {
    fn default() -> Self {
        Self { threshold: 65 }
    }
}
