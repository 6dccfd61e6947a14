//! Order-flow statistics for the ladder.
//!
//! This crate handles:
//! - Session volume-at-price totals
//! - Sliding-window trade cells and "last size" consumption
//! - Resting depth change tracking
//! - Diagonal imbalance detection and buy/sell strength
//! - The shared order-flow engine tying them together

pub mod session;
pub mod window;
pub mod depth;
pub mod imbalance;
pub mod engine;

pub use session::{LevelVolume, SessionLedger};
pub use window::SlidingWindowLedger;
pub use depth::DepthDeltaTracker;
pub use imbalance::ImbalanceCalculator;
pub use engine::OrderFlowEngine;
