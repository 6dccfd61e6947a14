//! Order-flow ladder replay.
//!
//! Reads a JSON-lines tick file, backfills session totals from the first
//! ticks, streams the rest through the live path, and prints the resulting
//! ladder as JSON.
//!
//! Usage:
//!   ladder-replay <TICKS> [OPTIONS]
//!
//! Example:
//!   RUST_LOG=debug ladder-replay es_ticks.jsonl --backfill 5000 --config es.json

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use ladder_core::{ts_from_datetime, Config, Tick, TimestampMs};
use ladder_features::OrderFlowEngine;
use ladder_replay::{build_report, SessionFeed, TickSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ladder-replay")]
#[command(version, about = "Replay ticks through the order-flow engine")]
struct Cli {
    /// JSON-lines tick file
    ticks: PathBuf,

    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of leading ticks replayed as historical backfill
    #[arg(short, long, default_value = "0")]
    backfill: usize,

    /// Ignore backfill ticks before this RFC 3339 time
    #[arg(long)]
    session_begin: Option<DateTime<Utc>>,

    /// Ladder rows used to size the strength bar
    #[arg(long, default_value = "40")]
    rows: u32,

    /// Skip malformed lines instead of aborting
    #[arg(long)]
    lenient: bool,
}

fn load_ticks(cli: &Cli) -> Result<Vec<Tick>> {
    let source = TickSource::open(&cli.ticks)
        .with_context(|| format!("Failed to open tick file: {}", cli.ticks.display()))?;

    let mut ticks = Vec::new();
    for tick in source {
        match tick {
            Ok(tick) => ticks.push(tick),
            Err(e) if cli.lenient => warn!(error = %e, "Skipping malformed tick"),
            Err(e) => return Err(e).context("Failed to read ticks"),
        }
    }
    Ok(ticks)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    let ticks = load_ticks(&cli)?;
    info!(
        ticks = ticks.len(),
        symbol = %config.instrument.symbol,
        tick_size = config.instrument.tick_size,
        "Loaded ticks"
    );

    let engine = Arc::new(OrderFlowEngine::new(&config)?);
    let feed = SessionFeed::new(
        Arc::clone(&engine),
        config.window.trade_sliding_window_seconds,
    );

    let split = cli.backfill.min(ticks.len());
    let (history, live) = ticks.split_at(split);

    let session_begin: TimestampMs = cli
        .session_begin
        .map(ts_from_datetime)
        .unwrap_or(TimestampMs::MIN);
    let backfill = feed.backfill(history, session_begin);

    feed.on_ticks(live);

    let last_price = ticks.last().map(|t| t.price);
    let report = build_report(&engine, &config, last_price, backfill, live.len(), cli.rows);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
