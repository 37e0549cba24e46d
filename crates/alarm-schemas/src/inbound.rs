//! Webhook payload classification.
//!
//! A single webhook endpoint receives three kinds of JSON bodies:
//!
//! | `action`         | Meaning                                        |
//! |------------------|------------------------------------------------|
//! | `"ping"`         | keep-alive from an uptime monitor              |
//! | `"sensor_event"` | report from the M5Stick contact sensor         |
//! | anything else    | a chat platform update (handled by the caller) |
//!
//! Sensor payloads are validated here into a typed [`SensorReport`]. The
//! device-supplied `timestamp` is ignored and replaced with `now`.

use serde_json::Value;
use thiserror::Error;

use crate::{ReportError, SensorReport, SensorStatus, PING_ACTION, SENSOR_EVENT_ACTION};

/// A classified webhook body.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Ping,
    Sensor(SensorReport),
    /// Not addressed to the alarm core; carried through untouched.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InboundError {
    #[error("request body is not valid JSON: {0}")]
    Json(String),
    #[error("malformed sensor report: {0}")]
    Report(#[from] ReportError),
}

/// Classify a raw webhook body, stamping sensor reports with `now`
/// (unix seconds).
pub fn parse_inbound(body: &[u8], now: i64) -> Result<Inbound, InboundError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| InboundError::Json(e.to_string()))?;

    match value.get("action").and_then(Value::as_str) {
        Some(PING_ACTION) => Ok(Inbound::Ping),
        Some(SENSOR_EVENT_ACTION) => Ok(Inbound::Sensor(sensor_report_from_value(&value, now)?)),
        _ => Ok(Inbound::Other(value)),
    }
}

/// Validate a `sensor_event` payload.
///
/// Accepts `sensor_status` or `sensorStatus` for the status field.
pub fn sensor_report_from_value(value: &Value, now: i64) -> Result<SensorReport, ReportError> {
    let location = match value.get("location") {
        None | Some(Value::Null) => return Err(ReportError::MissingField("location")),
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(ReportError::WrongType {
                field: "location",
                expected: "string",
            })
        }
    };

    let status = match value.get("sensor_status").or_else(|| value.get("sensorStatus")) {
        None | Some(Value::Null) => return Err(ReportError::MissingField("sensor_status")),
        Some(Value::String(s)) => SensorStatus::parse(s)?,
        Some(_) => {
            return Err(ReportError::WrongType {
                field: "sensor_status",
                expected: "string",
            })
        }
    };

    SensorReport::new(location, status, now)
}
