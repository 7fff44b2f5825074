//! Event repository abstraction and backends
//!
//! The statistics engine only ever calls `get_all` and `append`; ordering,
//! filtering and bucketing all happen on the snapshot it receives.

pub mod jsonl_store;
pub mod memory_store;
pub mod sqlite_store;

pub use jsonl_store::JsonlEventStore;
pub use memory_store::MemoryEventStore;
pub use sqlite_store::SqliteEventStore;

use crate::stats_core::event::CollisionEvent;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Database(String),
    NotFound(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::NotFound(id) => write!(f, "Event not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// Source of collision events
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Snapshot of every stored event, in backend order
    async fn get_all(&self) -> Result<Vec<CollisionEvent>, StoreError>;

    /// Store one event, filling in `id` and `timestamp` when absent
    async fn append(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl<R: EventRepository + ?Sized> EventRepository for Box<R> {
    async fn get_all(&self) -> Result<Vec<CollisionEvent>, StoreError> {
        (**self).get_all().await
    }

    async fn append(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError> {
        (**self).append(event).await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}

/// Millisecond-clock ids that never repeat within one process
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never hands out a value at or below `floor`
    pub fn starting_after(floor: i64) -> Self {
        Self {
            last: AtomicI64::new(floor),
        }
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Fill the creation-time fields; values already present win
pub fn assign_defaults(mut event: CollisionEvent, ids: &IdGenerator) -> CollisionEvent {
    if event.id.as_deref().map_or(true, str::is_empty) {
        event.id = Some(ids.next_id());
    }
    if event.timestamp.as_deref().map_or(true, str::is_empty) {
        event.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    event
}
