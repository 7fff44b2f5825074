//! JSONL file store - one event per line, append-only

use super::{assign_defaults, EventRepository, IdGenerator, StoreError};
use crate::stats_core::event::CollisionEvent;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct JsonlEventStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    ids: IdGenerator,
}

impl JsonlEventStore {
    /// Open (or lazily create) the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut store = Self {
            path,
            write_lock: Mutex::new(()),
            ids: IdGenerator::new(),
        };

        // Keep generated ids above anything already in the file
        let floor = store
            .read_events()?
            .iter()
            .filter_map(|e| e.id()?.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        store.ids = IdGenerator::starting_after(floor);

        log::info!(
            "📝 JSONL event store at: {} (id floor {})",
            store.path.display(),
            floor
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_events(&self) -> Result<Vec<CollisionEvent>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match CollisionEvent::from_json(&line) {
                Ok(event) => events.push(event),
                Err(e) => log::warn!(
                    "Skipping unreadable line {} in {}: {}",
                    index + 1,
                    self.path.display(),
                    e
                ),
            }
        }

        Ok(events)
    }

    fn write_event(&self, event: &CollisionEvent) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Io(std::io::Error::new(ErrorKind::Other, "write lock poisoned")))?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", event.to_json()?)?;
        writer.flush()?;

        Ok(())
    }
}

#[async_trait]
impl EventRepository for JsonlEventStore {
    async fn get_all(&self) -> Result<Vec<CollisionEvent>, StoreError> {
        self.read_events()
    }

    async fn append(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError> {
        let stored = assign_defaults(event, &self.ids);
        self.write_event(&stored)?;
        log::debug!("Appended event {:?} to {}", stored.id, self.path.display());
        Ok(stored)
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
