//! Chat message templates (Telegram Markdown).
//!
//! User-supplied text (locations, names) is passed through
//! [`escape_markdown`] before substitution.

use alarm_schemas::{SensorStatus, SystemStatus};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

/// Bot command list as `(command, description)`, used for `/help` and
/// `setMyCommands`.
pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "Show what this bot can do"),
    ("status", "Show whether the system is armed and which sensors are connected"),
    ("arm", "Arm the system and receive alerts for new events"),
    ("disarm", "Disarm the system and stop receiving alerts"),
];

/// `%Y-%m-%d %I:%M %p %Z`, e.g. `2023-11-16 08:42 PM CST`.
const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p %Z";

/// Strip characters that would break Telegram's legacy Markdown parser.
pub fn escape_markdown(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\\' | '`' | '*' | '_')).collect()
}

/// Render unix seconds in `tz`. Out-of-range timestamps fall back to the
/// raw number.
pub fn format_local_time(ts: i64, tz: Tz) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.with_timezone(&tz).format(ALERT_TIME_FORMAT).to_string(),
        None => ts.to_string(),
    }
}

pub fn system_glyph(status: SystemStatus) -> &'static str {
    match status {
        SystemStatus::Armed => "🛑🔒",
        SystemStatus::Disarmed => "🟢🔓",
    }
}

pub fn sensor_glyph(status: SensorStatus) -> &'static str {
    match status {
        SensorStatus::Open => "🔓",
        SensorStatus::Closed => "🔒",
    }
}

pub fn device_connected(location: &str) -> String {
    format!("📶 *Device Connected:* {}", escape_markdown(location))
}

pub fn device_disconnected(location: &str) -> String {
    format!("🚫 *Device Disconnected:* {}", escape_markdown(location))
}

/// Armed alert for one transition.
pub fn alert(status: SensorStatus, ts: i64, tz: Tz, location: &str) -> String {
    format!(
        "🚨 *ALERT: {glyph} {status}* 🚨\n\n*Time:* {time}\n*Location:* {location}",
        glyph = sensor_glyph(status),
        status = status.as_str(),
        time = format_local_time(ts, tz),
        location = escape_markdown(location),
    )
}

/// `/status` reply. `sensors` is `(location, state)` in display order.
pub fn status_reply(system: SystemStatus, sensors: &[(String, SensorStatus)]) -> String {
    let mut out = format!(
        "*Current System Status:*\n\n{} {}",
        system_glyph(system),
        system.label()
    );

    if sensors.is_empty() {
        out.push_str("\n\nNo sensors connected.");
    } else {
        out.push_str("\n\n*Sensors:*");
        for (location, state) in sensors {
            out.push_str(&format!(
                "\n📶 {}: {} {}",
                escape_markdown(location),
                sensor_glyph(*state),
                state.as_str()
            ));
        }
    }
    out
}

/// Forwarded log record. `level` is `WARN` or `ERROR`.
pub fn log_record(level: &str, text: &str) -> String {
    let glyph = if level.eq_ignore_ascii_case("ERROR") { "❌" } else { "⚠️" };
    format!("{glyph} *{}*\n{}", level.to_ascii_uppercase(), escape_markdown(text))
}

pub fn arm_reply() -> &'static str {
    "🛑🔒 System is now *armed*. You will be alerted for any new events."
}

pub fn disarm_reply() -> &'static str {
    "🟢🔓 System is now *disarmed*. You will no longer be alerted for new events."
}

pub fn help_reply(bot_name: &str, user_name: &str) -> String {
    let mut out = format!(
        "👋 Hi {}! I'm *{}*.\n\nI watch your door sensors and message you when one opens or closes while the system is armed.\n\n*Commands:*",
        escape_markdown(user_name),
        escape_markdown(bot_name),
    );
    for (command, description) in COMMANDS {
        out.push_str(&format!("\n/{command} - {description}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_time_uses_zone_abbreviation_and_dst() {
        // 2023-11-17T02:42:22Z, after DST ended.
        assert_eq!(
            format_local_time(1_700_188_942, chrono_tz::US::Central),
            "2023-11-16 08:42 PM CST"
        );
        // 2023-07-01T00:00:00Z, daylight time.
        assert_eq!(
            format_local_time(1_688_169_600, chrono_tz::US::Central),
            "2023-06-30 07:00 PM CDT"
        );
    }

    #[test]
    fn alert_contains_state_time_and_location() {
        let text = alert(SensorStatus::Closed, 1_700_188_942, chrono_tz::US::Central, "Bedroom_Door");
        assert!(text.contains("CLOSED"));
        assert!(text.contains("2023-11-16 08:42 PM CST"));
        assert!(text.contains("*Location:* BedroomDoor"));
    }

    #[test]
    fn connection_messages_match_expected_wording() {
        assert_eq!(device_connected("Door"), "📶 *Device Connected:* Door");
        assert_eq!(device_disconnected("Door"), "🚫 *Device Disconnected:* Door");
    }

    #[test]
    fn status_reply_lists_sensors() {
        let empty = status_reply(SystemStatus::Disarmed, &[]);
        assert!(empty.starts_with("*Current System Status:*\n\n🟢🔓 Disarmed"));
        assert!(empty.contains("No sensors connected."));

        let one = status_reply(
            SystemStatus::Armed,
            &[("Door".to_string(), SensorStatus::Open)],
        );
        assert!(one.contains("🛑🔒 Armed"));
        assert!(one.contains("Door: 🔓 OPEN"));
    }

    #[test]
    fn log_record_is_escaped_and_tagged() {
        assert_eq!(log_record("WARN", "store_down *now*"), "⚠️ *WARN*\nstoredown now");
        assert!(log_record("error", "x").starts_with("❌ *ERROR*"));
    }

    #[test]
    fn help_lists_every_command() {
        let text = help_reply("AlarmBot", "Sam");
        for (command, _) in COMMANDS {
            assert!(text.contains(&format!("/{command} - ")));
        }
        assert!(text.contains("Hi Sam"));
    }
}
