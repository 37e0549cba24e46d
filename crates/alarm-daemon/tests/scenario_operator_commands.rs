//! Scenario: operator chat commands drive the arm state and report status.

use std::sync::Arc;

use alarm_config::AlarmConfig;
use alarm_daemon::commands::{handle_update, Command, CommandOutcome};
use alarm_daemon::reconciler::handle_report;
use alarm_daemon::state::AppState;
use alarm_db::MemoryEventStore;
use alarm_notify::telegram::Update;
use alarm_notify::templates;
use alarm_notify::testkit::RecordingNotifier;
use alarm_schemas::{SensorReport, SensorStatus};
use serde_json::json;

fn config() -> AlarmConfig {
    AlarmConfig::from_lookup(|name: &str| match name {
        "TG_BOT_TOKEN" => Some("123:secret".to_string()),
        "TG_USERS" => Some("111,222".to_string()),
        "ALARM_IO_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .expect("test config")
}

fn update(chat_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id },
            "from": { "id": chat_id, "first_name": "Sam" },
            "text": text,
        }
    }))
    .unwrap()
}

fn make_state(notifier: Arc<RecordingNotifier>) -> AppState {
    AppState::new(&config(), Arc::new(MemoryEventStore::new()), notifier).with_bot_name("DoorBot")
}

#[tokio::test]
async fn arm_then_disarm_round_trip() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = make_state(notifier.clone());
    assert!(st.current_state().await.is_disarmed());

    let out = handle_update(&st, update(111, "/arm")).await;
    assert_eq!(out, CommandOutcome::Executed { command: Command::Arm, replied: true });
    assert!(st.current_state().await.is_armed());

    let out = handle_update(&st, update(222, "/disarm")).await;
    assert_eq!(out, CommandOutcome::Executed { command: Command::Disarm, replied: true });
    assert!(st.current_state().await.is_disarmed());

    assert_eq!(notifier.recipients_of(templates::arm_reply()), vec!["111"]);
    assert_eq!(notifier.recipients_of(templates::disarm_reply()), vec!["222"]);
    // Replies are threaded to the command message.
    assert_eq!(notifier.replied_to(), vec![10, 10]);
}

#[tokio::test]
async fn status_lists_arm_state_and_connected_sensors() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = make_state(notifier.clone());
    handle_report(&st, SensorReport::new("Door", SensorStatus::Open, 100).unwrap()).await;
    notifier.clear();

    handle_update(&st, update(111, "/status")).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "111");
    assert!(sent[0].1.contains("Disarmed"));
    assert!(sent[0].1.contains("Door: 🔓 OPEN"));
}

#[tokio::test]
async fn help_greets_sender_and_names_bot() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = make_state(notifier.clone());

    handle_update(&st, update(111, "/help")).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Hi Sam"));
    assert!(sent[0].1.contains("DoorBot"));
    assert!(sent[0].1.contains("/disarm - "));
}

#[tokio::test]
async fn unauthorized_chat_cannot_change_state() {
    let notifier = Arc::new(RecordingNotifier::new());
    let st = make_state(notifier.clone());

    let out = handle_update(&st, update(999, "/arm")).await;

    assert_eq!(out, CommandOutcome::Unauthorized { chat_id: "999".to_string() });
    assert!(st.current_state().await.is_disarmed());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn failed_reply_does_not_undo_the_command() {
    let notifier = Arc::new(RecordingNotifier::new().failing_for("111"));
    let st = make_state(notifier.clone());

    let out = handle_update(&st, update(111, "/arm")).await;

    assert_eq!(out, CommandOutcome::Executed { command: Command::Arm, replied: false });
    assert!(st.current_state().await.is_armed());
}
