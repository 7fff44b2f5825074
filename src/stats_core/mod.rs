//! Stats Core - Collision Event Aggregation Engine
//!
//! Turns a snapshot of collision events into the summaries the dashboard
//! panels render. All aggregators are pure functions of their input (and of
//! `now` where a window is involved).
//!
//! # Architecture
//!
//! ```text
//! EventRepository (Memory / JSONL / SQLite) → get_all()
//!     ↓
//! filter_by_range (day | week | month | year, newest first)
//!     ↓
//! ├─ aggregate_overview  → severity + time-of-day buckets
//! ├─ aggregate_accidents → time-of-day buckets over critical/high only
//! ├─ aggregate_objects   → type + confidence-tier buckets
//! └─ generate_trend      → fixed-length daily counts
//!     ↓
//! StatsEngine::report → StatsReport (JSON)
//! ```

pub mod engine;
pub mod event;
pub mod objects;
pub mod overview;
pub mod trend;
pub mod window;

pub use engine::{EventStatistics, StatsEngine, StatsReport};
pub use event::{
    CollisionEvent, DetectedObject, DistanceMeasurement, DistanceStatus, Location, Severity,
};
pub use objects::{aggregate_objects, ConfidenceCounts, ConfidenceTier, ObjectStats};
pub use overview::{
    aggregate_accidents, aggregate_overview, AccidentStats, Overview, SeverityCounts, TimeOfDay,
    TimeOfDayCounts,
};
pub use trend::{generate_trend, TrendPoint, DEFAULT_TREND_DAYS, MAX_TREND_DAYS};
pub use window::{filter_by_range, TimeRange};
