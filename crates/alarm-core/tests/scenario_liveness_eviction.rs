use alarm_core::*;
use alarm_schemas::{SensorReport, SensorStatus, SystemStatus};

const THRESHOLD: i64 = 60;

#[test]
fn scenario_sweep_before_threshold_does_nothing() {
    let mut reg = SensorRegistry::new();
    reg.upsert("Door", SensorStatus::Open, 1000);

    let gone = sweep(&mut reg, 1000 + THRESHOLD - 1, THRESHOLD);

    assert!(gone.is_empty());
    assert!(reg.get("Door").is_some());
}

#[test]
fn scenario_sweep_after_threshold_evicts_once() {
    let mut reg = SensorRegistry::new();
    reg.upsert("Door", SensorStatus::Open, 1000);

    let gone = sweep(&mut reg, 1000 + THRESHOLD + 1, THRESHOLD);
    assert_eq!(gone.len(), 1);
    assert_eq!(gone[0].location, "Door");
    assert!(reg.is_empty());

    // A second sweep has nothing left to report.
    assert!(sweep(&mut reg, 1000 + THRESHOLD + 2, THRESHOLD).is_empty());
}

#[test]
fn scenario_report_after_eviction_reconnects() {
    let mut reg = SensorRegistry::new();
    let first = SensorReport::new("Door", SensorStatus::Open, 1000).unwrap();
    reconcile(&mut reg, &first, SystemStatus::Armed);

    sweep(&mut reg, 1000 + THRESHOLD + 1, THRESHOLD);

    // Different state than before eviction: still a connection, not a transition.
    let back = SensorReport::new("Door", SensorStatus::Closed, 1100).unwrap();
    let p = reconcile(&mut reg, &back, SystemStatus::Armed);

    assert_eq!(p.classification, Classification::Connected);
    assert!(p.announce_connected);
    assert!(p.persist.is_none());
    assert!(!p.alert);
}

#[test]
fn scenario_refreshed_sensor_survives_sweep() {
    let mut reg = SensorRegistry::new();
    reconcile(
        &mut reg,
        &SensorReport::new("Door", SensorStatus::Open, 1000).unwrap(),
        SystemStatus::Disarmed,
    );
    reconcile(
        &mut reg,
        &SensorReport::new("Door", SensorStatus::Open, 1050).unwrap(),
        SystemStatus::Disarmed,
    );

    assert!(sweep(&mut reg, 1000 + THRESHOLD + 1, THRESHOLD).is_empty());
}
