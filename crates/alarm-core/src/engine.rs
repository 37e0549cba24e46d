use alarm_schemas::{SensorEvent, SensorReport, SensorStatus, SystemStatus};

use crate::{SensorRecord, SensorRegistry};

/// How one report relates to the registry's current view of its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// No record for this location (never seen, or evicted as disconnected).
    Connected,
    /// Same state as the stored record; liveness refresh only.
    Unchanged,
    /// State differs from the stored record.
    Transition { from: SensorStatus, to: SensorStatus },
    /// Older than the stored `last_seen`; ignored entirely.
    Stale { last_seen: i64 },
}

/// Side effects the caller must perform for one reconciled report.
///
/// The registry has already been updated when a plan is returned; executing
/// (or failing to execute) the plan never changes the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub classification: Classification,
    /// Send a "device connected" notification for `location`.
    pub announce_connected: bool,
    /// Event to append to the event store.
    pub persist: Option<SensorEvent>,
    /// Send an alert for `persist` to every recipient.
    pub alert: bool,
}

/// Classify `report` against the existing record for its location.
pub fn classify(existing: Option<&SensorRecord>, report: &SensorReport) -> Classification {
    let Some(rec) = existing else {
        return Classification::Connected;
    };

    // Equal timestamps are accepted: server time has one-second resolution
    // and the device reports several times per second.
    if report.timestamp < rec.last_seen {
        return Classification::Stale {
            last_seen: rec.last_seen,
        };
    }

    if report.status == rec.state {
        Classification::Unchanged
    } else {
        Classification::Transition {
            from: rec.state,
            to: report.status,
        }
    }
}

/// Commit a classification to the registry.
pub fn apply(reg: &mut SensorRegistry, report: &SensorReport, classification: &Classification) {
    match classification {
        Classification::Connected
        | Classification::Unchanged
        | Classification::Transition { .. } => {
            reg.upsert(&report.location, report.status, report.timestamp);
        }
        Classification::Stale { .. } => {}
    }
}

/// Derive the side effects for a classification.
pub fn plan(
    classification: Classification,
    report: &SensorReport,
    system: SystemStatus,
) -> ReconcilePlan {
    match classification {
        Classification::Connected => ReconcilePlan {
            classification,
            announce_connected: true,
            persist: None,
            alert: false,
        },
        Classification::Transition { .. } => ReconcilePlan {
            classification,
            announce_connected: false,
            persist: Some(SensorEvent::from_report(report, system)),
            alert: system == SystemStatus::Armed,
        },
        Classification::Unchanged | Classification::Stale { .. } => ReconcilePlan {
            classification,
            announce_connected: false,
            persist: None,
            alert: false,
        },
    }
}

/// Classify, commit and plan in one step.
///
/// Callers hold the registry lock for the duration of this call only.
pub fn reconcile(
    reg: &mut SensorRegistry,
    report: &SensorReport,
    system: SystemStatus,
) -> ReconcilePlan {
    let classification = classify(reg.get(&report.location), report);
    apply(reg, report, &classification);
    plan(classification, report, system)
}
