//! In-memory event store for fixtures and single-session use

use super::{assign_defaults, EventRepository, IdGenerator, StoreError};
use crate::stats_core::event::CollisionEvent;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Newest events first, like the dashboard's local store
pub struct MemoryEventStore {
    events: RwLock<Vec<CollisionEvent>>,
    ids: IdGenerator,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::with_events(Vec::new())
    }

    /// Seed the store with existing events, kept as given
    pub fn with_events(events: Vec<CollisionEvent>) -> Self {
        Self {
            events: RwLock::new(events),
            ids: IdGenerator::new(),
        }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventRepository for MemoryEventStore {
    async fn get_all(&self) -> Result<Vec<CollisionEvent>, StoreError> {
        Ok(self.events.read().await.clone())
    }

    async fn append(&self, event: CollisionEvent) -> Result<CollisionEvent, StoreError> {
        let stored = assign_defaults(event, &self.ids);
        self.events.write().await.insert(0, stored.clone());
        log::debug!("Stored event {:?} in memory", stored.id);
        Ok(stored)
    }

    fn backend_type(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_prepends() {
        let store = MemoryEventStore::new();
        assert!(store.is_empty().await);

        let first = store
            .append(CollisionEvent {
                severity: Some("low".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = store.append(CollisionEvent::default()).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
        assert_eq!(all[1].severity.as_deref(), Some("low"));
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let store = MemoryEventStore::with_events(vec![CollisionEvent::default()]);
        let snapshot = store.get_all().await.unwrap();
        store.append(CollisionEvent::default()).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len().await, 2);
    }
}
