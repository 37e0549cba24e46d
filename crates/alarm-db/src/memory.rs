use alarm_schemas::{SensorEvent, StoredEvent};
use anyhow::Result;
use tokio::sync::Mutex;

use crate::{EventRange, EventStore};

/// In-process event store. Ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<StoredEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, event: &SensorEvent) -> Result<StoredEvent> {
        let mut events = self.events.lock().await;
        let stored = StoredEvent {
            id: events.len() as i64 + 1,
            event: event.clone(),
        };
        events.push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, range: EventRange) -> Result<Vec<StoredEvent>> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .filter(|s| range.contains(s.event.timestamp))
            .cloned()
            .collect())
    }
}
