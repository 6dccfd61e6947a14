//! Replay driver for the order-flow ladder.
//!
//! This crate provides:
//! - Historical backfill and live tick processing with session resets
//! - A JSON-lines tick reader
//! - End-of-replay ladder snapshots

pub mod feed;
pub mod source;
pub mod report;

pub use feed::{BackfillSummary, SessionFeed};
pub use source::TickSource;
pub use report::{build_report, LadderReport};
