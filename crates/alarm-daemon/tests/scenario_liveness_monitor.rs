//! Scenario: silent sensors are evicted and announced exactly once.

use std::sync::Arc;
use std::time::Duration;

use alarm_config::AlarmConfig;
use alarm_core::Classification;
use alarm_daemon::monitor::{run_sweep, spawn_liveness_monitor};
use alarm_daemon::reconciler::handle_report;
use alarm_daemon::state::{now_unix, AppState};
use alarm_db::MemoryEventStore;
use alarm_notify::templates;
use alarm_notify::testkit::RecordingNotifier;
use alarm_schemas::{SensorReport, SensorStatus};

fn config(extra: &'static [(&'static str, &'static str)]) -> AlarmConfig {
    AlarmConfig::from_lookup(move |name: &str| match name {
        "TG_BOT_TOKEN" => Some("123:secret".to_string()),
        "TG_USERS" => Some("111".to_string()),
        "ALARM_IO_TIMEOUT_SECS" => Some("1".to_string()),
        _ => extra
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string()),
    })
    .expect("test config")
}

fn report(location: &str, status: SensorStatus, ts: i64) -> SensorReport {
    SensorReport::new(location, status, ts).unwrap()
}

#[tokio::test]
async fn sweep_evicts_silent_sensor_once_and_reconnects_on_next_report() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = AppState::new(&config(&[]), Arc::new(MemoryEventStore::new()), notifier.clone());

    handle_report(&st, report("Garage", SensorStatus::Closed, 1_000)).await;
    handle_report(&st, report("Door", SensorStatus::Closed, 1_050)).await;
    notifier.clear();

    // Default threshold is 60s: Garage (silent 61s) goes, Door (11s) stays.
    let evicted = run_sweep(&st, 1_061).await;
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].location, "Garage");
    assert_eq!(notifier.recipients_of(&templates::device_disconnected("Garage")), vec!["111"]);

    // Second sweep at the same instant finds nothing new.
    assert!(run_sweep(&st, 1_061).await.is_empty());
    assert_eq!(notifier.containing("Disconnected").len(), 1);

    // Next report for the evicted location is a fresh connection.
    let out = handle_report(&st, report("Garage", SensorStatus::Closed, 1_070)).await;
    assert_eq!(out.classification, Classification::Connected);
    assert_eq!(notifier.recipients_of(&templates::device_connected("Garage")), vec!["111"]);
}

#[tokio::test]
async fn silence_exactly_at_threshold_is_not_a_disconnect() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = AppState::new(&config(&[]), Arc::new(MemoryEventStore::new()), notifier.clone());

    handle_report(&st, report("Door", SensorStatus::Open, 1_000)).await;

    assert!(run_sweep(&st, 1_060).await.is_empty());
    assert_eq!(run_sweep(&st, 1_061).await.len(), 1);
}

#[tokio::test]
async fn spawned_monitor_evicts_in_background() {
    let notifier = Arc::new(RecordingNotifier::new());
    let cfg = config(&[
        ("ALARM_DISCONNECT_THRESHOLD_SECS", "1"),
        ("ALARM_SWEEP_INTERVAL_SECS", "1"),
        ("ALARM_SWEEP_INITIAL_DELAY_SECS", "0"),
    ]);
    let st = Arc::new(AppState::new(&cfg, Arc::new(MemoryEventStore::new()), notifier.clone()));

    // Last seen well in the past.
    handle_report(&st, report("Shed", SensorStatus::Closed, now_unix() - 30)).await;

    let handle = spawn_liveness_monitor(Arc::clone(&st));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(st.registry.lock().await.is_empty());
    assert_eq!(notifier.containing("Device Disconnected").len(), 1);

    handle.abort();
}
