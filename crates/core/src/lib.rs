//! Core types and configuration for the order-flow ladder.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (ticks, sides, price levels)
//! - Sliding-window trade cells and strength output
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
