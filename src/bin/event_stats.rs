//! Event Statistics Binary - collision dashboard aggregation
//!
//! Reads collision events from the configured store and prints the
//! statistics report (overview, object detection, accidents, trend) as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin event_stats -- --backend sqlite --range week
//! cargo run --release --bin event_stats -- --backend jsonl --import seed.jsonl
//! ```
//!
//! ## Environment Variables
//!
//! - EVENT_STORE_BACKEND - memory, jsonl or sqlite (default: sqlite)
//! - EVENTS_DB_PATH - SQLite database path (default: data/events.db)
//! - EVENTS_JSONL_PATH - JSONL event file (default: data/events.jsonl)
//! - STATS_TIME_RANGE - day, week, month or year (default: month)
//! - TREND_DAYS - Length of the daily trend series (default: 10)
//! - REFRESH_INTERVAL_SECS - Recompute periodically instead of once (optional)
//! - RUST_LOG - Logging level (optional, default: info)

use chrono::Local;
use collision_stats::config::{BackendType, StatsConfig};
use collision_stats::stats_core::{CollisionEvent, StatsEngine, TimeRange};
use collision_stats::store::{
    EventRepository, JsonlEventStore, MemoryEventStore, SqliteEventStore,
};
use std::env;
use std::fs;
use tokio::time::{interval, Duration};

fn open_store(config: &StatsConfig) -> Result<Box<dyn EventRepository>, Box<dyn std::error::Error>> {
    let store: Box<dyn EventRepository> = match config.backend {
        BackendType::Memory => Box::new(MemoryEventStore::new()),
        BackendType::Jsonl => Box::new(JsonlEventStore::new(&config.jsonl_path)?),
        BackendType::Sqlite => Box::new(SqliteEventStore::new(&config.db_path)?),
    };
    Ok(store)
}

async fn import_events<R: EventRepository>(
    engine: &StatsEngine<R>,
    path: &str,
) -> Result<usize, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let mut imported = 0;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match CollisionEvent::from_json(line) {
            Ok(event) => {
                engine.add_event(event).await?;
                imported += 1;
            }
            Err(e) => log::warn!("Failed to parse event on line {} of {}: {}", index + 1, path, e),
        }
    }

    Ok(imported)
}

async fn emit_report<R: EventRepository>(
    engine: &StatsEngine<R>,
    range: TimeRange,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = engine.report(range, &Local::now()).await?;

    if report.statistics.total == 0 {
        log::info!("📭 No events in range '{}'", range);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let mut config = StatsConfig::from_env()?;
    let args: Vec<String> = env::args().collect();
    config.apply_args(&args)?;

    log::info!("🚀 Starting Event Statistics");
    log::info!("   Backend: {:?}", config.backend);
    log::info!("   Range: {}", config.range);
    log::info!("   Trend days: {}", config.trend_days);

    let store = open_store(&config)?;
    log::info!("📊 Store: {}", store.backend_type());

    let engine = StatsEngine::with_trend_days(store, config.trend_days);

    if let Some(path) = config.import_path.as_deref() {
        let imported = import_events(&engine, path).await?;
        log::info!("📥 Imported {} events from {}", imported, path);
    }

    let Some(secs) = config.refresh_interval_secs else {
        return emit_report(&engine, config.range).await;
    };

    log::info!("⏱️  Refreshing every {}s", secs);
    let mut ticker = interval(Duration::from_secs(secs));

    loop {
        ticker.tick().await;

        // Store failures are reported and retried on the next tick
        if let Err(e) = emit_report(&engine, config.range).await {
            log::error!("Failed to compute statistics: {}", e);
        }
    }
}
