//! Request and response types for the alarm-daemon HTTP endpoints.
//!
//! No business logic lives here.

use alarm_schemas::{SensorStatus, StoredEvent, SystemStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// /{token}/v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorView {
    pub location: String,
    pub state: SensorStatus,
    /// Server time of the last accepted report (unix seconds).
    pub last_seen: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub system_status: SystemStatus,
    pub armed: bool,
    pub daemon_uptime_secs: u64,
    /// Connected sensors, ordered by location.
    pub sensors: Vec<SensorView>,
}

// ---------------------------------------------------------------------------
// /{token}/v1/events
// ---------------------------------------------------------------------------

/// Inclusive unix-second bounds; both optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub backend: String,
    pub events: Vec<StoredEvent>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
