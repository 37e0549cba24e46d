//! Scenario: one door through its whole life, with every side effect checked.
//!
//! t=0    CLOSED  disarmed  -> connected notice, nothing stored
//! t=5    CLOSED            -> heartbeat only
//! (operator arms)
//! t=10   OPEN    armed     -> stored (ARMED) and alerted
//! t=15   OPEN              -> heartbeat only
//! t=76   sweep             -> disconnected notice, record gone
//! t=80   OPEN              -> connected again, nothing stored, no alert

use std::sync::Arc;

use alarm_config::AlarmConfig;
use alarm_core::Classification;
use alarm_daemon::commands::handle_update;
use alarm_daemon::monitor::run_sweep;
use alarm_daemon::reconciler::handle_report;
use alarm_daemon::state::AppState;
use alarm_db::{EventRange, EventStore, MemoryEventStore};
use alarm_notify::templates;
use alarm_notify::testkit::RecordingNotifier;
use alarm_schemas::{SensorReport, SensorStatus, SystemStatus};

const BASE: i64 = 1_700_000_000;

fn config() -> AlarmConfig {
    AlarmConfig::from_lookup(|name: &str| match name {
        "TG_BOT_TOKEN" => Some("123:secret".to_string()),
        "TG_USERS" => Some("111".to_string()),
        "ALARM_IO_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .expect("test config")
}

fn door(status: SensorStatus, dt: i64) -> SensorReport {
    SensorReport::new("Front Door", status, BASE + dt).unwrap()
}

#[tokio::test]
async fn door_lifecycle() {
    let store = Arc::new(MemoryEventStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let st = AppState::new(&config(), store.clone(), notifier.clone());

    let out = handle_report(&st, door(SensorStatus::Closed, 0)).await;
    assert_eq!(out.classification, Classification::Connected);
    assert_eq!(notifier.recipients_of(&templates::device_connected("Front Door")), vec!["111"]);
    assert!(store.is_empty().await);

    let out = handle_report(&st, door(SensorStatus::Closed, 5)).await;
    assert_eq!(out.classification, Classification::Unchanged);

    let arm: alarm_notify::telegram::Update = serde_json::from_value(serde_json::json!({
        "update_id": 1,
        "message": { "message_id": 1, "chat": { "id": 111 }, "text": "/arm" }
    }))
    .unwrap();
    handle_update(&st, arm).await;
    assert!(st.current_state().await.is_armed());

    let out = handle_report(&st, door(SensorStatus::Open, 10)).await;
    assert!(matches!(out.classification, Classification::Transition { .. }));
    let stored = store.query(EventRange::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event.sensor_status, SensorStatus::Open);
    assert_eq!(stored[0].event.system_status, SystemStatus::Armed);
    assert_eq!(stored[0].event.timestamp, BASE + 10);
    assert_eq!(notifier.containing("ALERT").len(), 1);

    handle_report(&st, door(SensorStatus::Open, 15)).await;

    let evicted = run_sweep(&st, BASE + 76).await;
    assert_eq!(evicted.len(), 1);
    assert!(st.registry.lock().await.is_empty());
    assert_eq!(notifier.recipients_of(&templates::device_disconnected("Front Door")), vec!["111"]);

    let out = handle_report(&st, door(SensorStatus::Open, 80)).await;
    assert_eq!(out.classification, Classification::Connected);
    assert_eq!(store.len().await, 1);
    assert_eq!(notifier.containing("ALERT").len(), 1);
    assert_eq!(notifier.recipients_of(&templates::device_connected("Front Door")).len(), 2);
}
