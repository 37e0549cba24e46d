//! alarm-db
//!
//! Event store gateway: append confirmed sensor transitions and query them by
//! timestamp range.
//!
//! - [`PgEventStore`]: Postgres via sqlx, schema in `./migrations`.
//! - [`MemoryEventStore`]: process-local store, used when no database URL is
//!   configured and in tests.
//!
//! Both assign ids in insertion order and return query results in that order.

mod memory;
mod pg;

pub use memory::MemoryEventStore;
pub use pg::{connect, migrate, PgEventStore};

use alarm_schemas::{SensorEvent, StoredEvent};
use anyhow::Result;

/// Inclusive timestamp bounds (unix seconds). `None` leaves a side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl EventRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Append-only sensor event log.
///
/// Implementations must be `Send + Sync` so the daemon can share one behind
/// an `Arc<dyn EventStore>`.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Short backend name for logs (e.g. `"postgres"`).
    fn backend_name(&self) -> &'static str;

    /// Persist one event and return it with its assigned id.
    async fn append(&self, event: &SensorEvent) -> Result<StoredEvent>;

    /// Events whose timestamp falls in `range`, in insertion order.
    async fn query(&self, range: EventRange) -> Result<Vec<StoredEvent>>;
}
