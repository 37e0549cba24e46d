use alarm_schemas::{SensorEvent, SensorStatus, StoredEvent, SystemStatus};
use anyhow::{Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::{EventRange, EventStore};

/// Connect to Postgres at `url`.
///
/// The URL is never included in errors or logs.
pub async fn connect(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Postgres-backed [`EventStore`] over the `sensor_events` table.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and migrate in one step.
    pub async fn connect_and_migrate(url: &str) -> Result<Self> {
        let pool = connect(url).await?;
        migrate(&pool).await?;
        info!("event store ready (postgres)");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl EventStore for PgEventStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, event: &SensorEvent) -> Result<StoredEvent> {
        let (id,): (i64,) = sqlx::query_as::<_, (i64,)>(
            r#"
            insert into sensor_events (
              action, event_ts, location, sensor_status, system_status
            ) values (
              $1, $2, $3, $4, $5
            )
            returning id
            "#,
        )
        .bind(&event.action)
        .bind(event.timestamp)
        .bind(&event.location)
        .bind(event.sensor_status.as_str())
        .bind(event.system_status.as_str())
        .fetch_one(&self.pool)
        .await
        .context("insert sensor_event failed")?;

        Ok(StoredEvent {
            id,
            event: event.clone(),
        })
    }

    async fn query(&self, range: EventRange) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            r#"
            select id, action, event_ts, location, sensor_status, system_status
            from sensor_events
            where ($1::bigint is null or event_ts >= $1)
              and ($2::bigint is null or event_ts <= $2)
            order by id asc
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .context("query sensor_events failed")?;

        rows.iter().map(row_to_stored).collect()
    }
}

fn row_to_stored(row: &PgRow) -> Result<StoredEvent> {
    let sensor_status: String = row.try_get("sensor_status")?;
    let system_status: String = row.try_get("system_status")?;

    Ok(StoredEvent {
        id: row.try_get("id")?,
        event: SensorEvent {
            action: row.try_get("action")?,
            timestamp: row.try_get("event_ts")?,
            location: row.try_get("location")?,
            sensor_status: SensorStatus::parse(&sensor_status)
                .context("sensor_events.sensor_status")?,
            system_status: SystemStatus::parse(&system_status)
                .context("sensor_events.system_status")?,
        },
    })
}
