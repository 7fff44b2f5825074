//! SQLite-backed event store
//!
//! Each event is kept as its JSON payload; `timestamp` and `severity` are
//! mirrored into columns for ad-hoc queries only.

use super::{assign_defaults, EventRepository, IdGenerator, StoreError};
use crate::sqlite_pragma::apply_optimized_pragmas;
use crate::stats_core::event::CollisionEvent;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteEventStore {
    conn: Mutex<Connection>,
    ids: IdGenerator,
}

impl SqliteEventStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path.as_ref())?;
        apply_optimized_pragmas(&conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id TEXT UNIQUE NOT NULL,
                timestamp TEXT,
                severity TEXT,
                payload TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp DESC)",
            [],
        )?;

        // Keep generated ids above anything already stored
        let floor: i64 = conn.query_row(
            "SELECT COALESCE(MAX(CAST(event_id AS INTEGER)), 0) FROM events",
            [],
            |row| row.get(0),
        )?;

        log::info!(
            "✅ SQLite event store initialized at {} (id floor {})",
            db_path.as_ref().display(),
            floor
        );

        Ok(Self {
            conn: Mutex::new(conn),
            ids: IdGenerator::starting_after(floor),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl EventRepository for SqliteEventStore {
    async fn get_all(&self) -> Result<Vec<CollisionEvent>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT event_id, payload FROM events ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, payload) = row?;
            match CollisionEvent::from_json(&payload) {
                Ok(event) => events.push(event),
                Err(e) => log::warn!("Skipping event {} with unreadable payload: {}", event_id, e),
            }
        }

        log::debug!("📥 Loaded {} events from SQLite", events.len());
        Ok(events)
    }

    async fn append(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError> {
        let stored = assign_defaults(event, &self.ids);
        let payload = stored.to_json()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO events (event_id, timestamp, severity, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![stored.id, stored.timestamp, stored.severity, payload],
        )?;

        log::debug!("✅ Event written: {:?}", stored.id);
        Ok(stored)
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
