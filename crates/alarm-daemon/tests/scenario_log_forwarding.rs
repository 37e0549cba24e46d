//! Scenario: WARN and ERROR records reach the operators through the notifier.
//!
//! The layer never blocks the caller. Records from the notification crate
//! itself stay local so a failing chat API cannot feed on its own warnings.

use std::sync::Arc;
use std::time::Duration;

use alarm_daemon::log_forward::{channel, spawn_log_forwarder};
use alarm_notify::testkit::RecordingNotifier;
use alarm_notify::Notifier;
use tracing_subscriber::prelude::*;

#[test]
fn only_warn_and_error_are_forwarded() {
    let (layer, mut rx) = channel(16);

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::debug!("cache refreshed");
        tracing::info!("sensor connected");
        tracing::warn!(location = "Door", "store append failed");
        tracing::error!(error = %"connection refused", "webhook registration failed");
    });

    let first = rx.try_recv().expect("warn forwarded");
    assert_eq!(first, "⚠️ *WARN*\nstore append failed location=Door");

    let second = rx.try_recv().expect("error forwarded");
    assert!(second.starts_with("❌ *ERROR*\n"));
    assert!(second.contains("webhook registration failed"));
    assert!(second.contains("error=connection refused"));

    assert!(rx.try_recv().is_err());
}

#[test]
fn notifier_records_stay_local() {
    let (layer, mut rx) = channel(16);

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::warn!(target: "alarm_notify::fanout", recipient = "111", "delivery failed");
        tracing::warn!(target: "alarm_daemon::monitor", "sensor disconnected");
    });

    let only = rx.try_recv().expect("daemon warning forwarded");
    assert!(only.contains("sensor disconnected"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn full_channel_drops_records_instead_of_blocking() {
    let (layer, mut rx) = channel(1);

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        for i in 0..10 {
            tracing::warn!(attempt = i, "retrying");
        }
    });

    let kept = rx.try_recv().expect("first record kept");
    assert!(kept.contains("attempt=0"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn forwarder_delivers_to_every_recipient() {
    let notifier = Arc::new(RecordingNotifier::new().failing_for("222"));
    let recipients = Arc::new(vec!["111".to_string(), "222".to_string(), "333".to_string()]);
    let (layer, rx) = channel(16);

    let as_notifier: Arc<dyn Notifier> = notifier.clone();
    let task = spawn_log_forwarder(rx, as_notifier, recipients, Duration::from_secs(1));

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::warn!("event store unreachable");
    });

    // The layer was dropped with the subscriber, so the task drains and ends.
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("forwarder finished")
        .expect("forwarder task panicked");

    let delivered: Vec<String> = notifier
        .containing("event store unreachable")
        .into_iter()
        .map(|(r, _)| r)
        .collect();
    assert_eq!(delivered, vec!["111", "333"]);
}
