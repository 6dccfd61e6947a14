//! Trade ingestion for the order-flow ladder.
//!
//! This crate handles:
//! - Trade side inference (pluggable classifier strategy)
//! - Classification statistics

pub mod classifier;

pub use classifier::{ClassificationStats, MidpointClassifier, TradeClassifier};
