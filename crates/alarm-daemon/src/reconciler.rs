//! Report handling: the async shell around `alarm_core::reconcile`.
//!
//! Order of work for one report:
//! 1. take the location's FIFO gate (held until the report is fully handled),
//! 2. commit the registry update under the registry lock and release it,
//! 3. perform the planned side effects: connected notice, store append, alert,
//! 4. hand the gate back so idle locations leave no entry behind.
//!
//! Side-effect failures are logged and recorded in the [`HandleOutcome`];
//! the registry is never rolled back.

use alarm_core::Classification;
use alarm_notify::{notify_all, templates, Delivery};
use alarm_schemas::{SensorReport, StoredEvent};
use tracing::{debug, error, info, warn};

use crate::state::{now_unix, AppState};

/// What happened to one report.
#[derive(Debug, Clone)]
pub struct HandleOutcome {
    pub classification: Classification,
    /// Set when a transition was persisted.
    pub stored: Option<StoredEvent>,
    /// Set when a transition could not be persisted.
    pub persist_error: Option<String>,
    /// Every notification attempt made for this report, in order.
    pub deliveries: Vec<Delivery>,
}

impl HandleOutcome {
    pub fn failed_deliveries(&self) -> usize {
        self.deliveries.iter().filter(|d| !d.is_ok()).count()
    }
}

/// Handle a report carrying its own timestamp.
pub async fn handle_report(st: &AppState, report: SensorReport) -> HandleOutcome {
    handle_gated(st, report, false).await
}

/// Handle a report just accepted from the webhook. The server timestamp is
/// taken once the location's gate is held, so stamps follow gate order.
pub async fn handle_received(st: &AppState, report: SensorReport) -> HandleOutcome {
    handle_gated(st, report, true).await
}

async fn handle_gated(st: &AppState, mut report: SensorReport, stamp: bool) -> HandleOutcome {
    let location = report.location.clone();
    let gate = st.gates.gate(&location).await;

    let outcome = {
        let _ordered = gate.lock().await;
        if stamp {
            report.timestamp = now_unix();
        }
        handle_ordered(st, report).await
    };

    st.gates.release(&location, gate).await;
    outcome
}

async fn handle_ordered(st: &AppState, report: SensorReport) -> HandleOutcome {
    let system = st.system_status().await;
    let plan = {
        let mut reg = st.registry.lock().await;
        alarm_core::reconcile(&mut reg, &report, system)
    };

    let mut outcome = HandleOutcome {
        classification: plan.classification.clone(),
        stored: None,
        persist_error: None,
        deliveries: Vec::new(),
    };

    match &plan.classification {
        Classification::Connected => {
            info!(location = %report.location, state = %report.status, "sensor connected");
        }
        Classification::Unchanged => {
            debug!(location = %report.location, "sensor heartbeat");
        }
        Classification::Transition { from, to } => {
            info!(location = %report.location, %from, %to, system = %system, "sensor transition");
        }
        Classification::Stale { last_seen } => {
            debug!(location = %report.location, ts = report.timestamp, last_seen, "stale report ignored");
        }
    }

    if plan.announce_connected {
        let text = templates::device_connected(&report.location);
        outcome
            .deliveries
            .extend(notify_all(st.notifier.as_ref(), &st.recipients, &text, st.io_timeout).await);
    }

    let Some(event) = plan.persist else {
        return outcome;
    };

    match tokio::time::timeout(st.io_timeout, st.store.append(&event)).await {
        Ok(Ok(stored)) => {
            debug!(id = stored.id, backend = st.store.backend_name(), "event persisted");
            outcome.stored = Some(stored);
        }
        Ok(Err(e)) => {
            error!(location = %event.location, error = %format!("{e:#}"), "event persist failed");
            outcome.persist_error = Some(format!("{e:#}"));
        }
        Err(_) => {
            error!(location = %event.location, timeout = ?st.io_timeout, "event persist timed out");
            outcome.persist_error = Some(format!("timed out after {:?}", st.io_timeout));
        }
    }

    if plan.alert {
        let text = templates::alert(event.sensor_status, event.timestamp, st.timezone, &event.location);
        let deliveries = notify_all(st.notifier.as_ref(), &st.recipients, &text, st.io_timeout).await;
        let failed = deliveries.iter().filter(|d| !d.is_ok()).count();
        if failed > 0 {
            warn!(location = %event.location, failed, total = deliveries.len(), "alert not delivered to every recipient");
        }
        outcome.deliveries.extend(deliveries);
    }

    outcome
}
