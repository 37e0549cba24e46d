//! alarm-schemas
//!
//! Shared data types for the alarm service.
//!
//! - [`SensorReport`]: one validated report from a contact sensor, built at the
//!   webhook boundary with a server-assigned timestamp.
//! - [`SensorEvent`] / [`StoredEvent`]: the record persisted once per accepted
//!   open/closed transition.
//! - [`inbound`]: classification and validation of raw webhook payloads.
//!
//! No business logic lives here.

pub mod inbound;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `action` value carried by sensor reports and by every persisted event.
pub const SENSOR_EVENT_ACTION: &str = "sensor_event";

/// `action` value of the keep-alive message.
pub const PING_ACTION: &str = "ping";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an inbound sensor report was rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' has the wrong type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("invalid sensor status '{0}'; expected OPEN | CLOSED")]
    InvalidSensorStatus(String),
    #[error("invalid system status '{0}'; expected ARMED | DISARMED")]
    InvalidSystemStatus(String),
}

// ---------------------------------------------------------------------------
// SensorStatus
// ---------------------------------------------------------------------------

/// Physical state reported by a contact sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorStatus {
    Open,
    Closed,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Open => "OPEN",
            SensorStatus::Closed => "CLOSED",
        }
    }

    /// Case-insensitive, whitespace tolerant.
    pub fn parse(s: &str) -> Result<Self, ReportError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(SensorStatus::Open),
            "CLOSED" => Ok(SensorStatus::Closed),
            _ => Err(ReportError::InvalidSensorStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SystemStatus
// ---------------------------------------------------------------------------

/// Snapshot of the process-wide arm flag, as stamped onto persisted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    Armed,
    Disarmed,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Armed => "ARMED",
            SystemStatus::Disarmed => "DISARMED",
        }
    }

    /// Title-case label used in chat replies ("Armed" / "Disarmed").
    pub fn label(&self) -> &'static str {
        match self {
            SystemStatus::Armed => "Armed",
            SystemStatus::Disarmed => "Disarmed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ReportError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARMED" => Ok(SystemStatus::Armed),
            "DISARMED" => Ok(SystemStatus::Disarmed),
            _ => Err(ReportError::InvalidSystemStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SensorReport
// ---------------------------------------------------------------------------

/// One validated sensor report.
///
/// `timestamp` is unix seconds assigned by the server when the report was
/// accepted; device clocks are never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReport {
    pub location: String,
    pub status: SensorStatus,
    pub timestamp: i64,
}

impl SensorReport {
    /// Build a report, rejecting blank locations. The location is trimmed.
    pub fn new(
        location: impl AsRef<str>,
        status: SensorStatus,
        timestamp: i64,
    ) -> Result<Self, ReportError> {
        let location = location.as_ref().trim();
        if location.is_empty() {
            return Err(ReportError::EmptyLocation);
        }
        Ok(Self {
            location: location.to_string(),
            status,
            timestamp,
        })
    }
}

// ---------------------------------------------------------------------------
// SensorEvent / StoredEvent
// ---------------------------------------------------------------------------

/// A confirmed open/closed transition, ready to be appended to the event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorEvent {
    /// Always [`SENSOR_EVENT_ACTION`].
    pub action: String,
    pub timestamp: i64,
    pub location: String,
    pub sensor_status: SensorStatus,
    pub system_status: SystemStatus,
}

impl SensorEvent {
    pub fn from_report(report: &SensorReport, system_status: SystemStatus) -> Self {
        Self {
            action: SENSOR_EVENT_ACTION.to_string(),
            timestamp: report.timestamp,
            location: report.location.clone(),
            sensor_status: report.status,
            system_status,
        }
    }
}

/// A [`SensorEvent`] after the store assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: i64,
    #[serde(flatten)]
    pub event: SensorEvent,
}
