//! alarm-config
//!
//! Single source of truth for runtime configuration.
//!
//! # Contract
//! - All settings come from environment variables (optionally seeded from a
//!   `.env` file by the binary via `dotenvy`).
//! - [`AlarmConfig::from_env`] is called once at startup; the result is passed
//!   into constructors. Never scatter `std::env::var` calls across the code.
//! - `Debug` output **redacts** the bot token and database URL.
//! - Error messages reference the env var **NAME**, never the value.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;

pub const ENV_BOT_TOKEN: &str = "TG_BOT_TOKEN";
pub const ENV_USERS: &str = "TG_USERS";
pub const ENV_DATABASE_URL: &str = "ALARM_DATABASE_URL";
pub const ENV_DAEMON_ADDR: &str = "ALARM_DAEMON_ADDR";
pub const ENV_WEBHOOK_HOST: &str = "WEBHOOK_HOST";
pub const ENV_WEBHOOK_PORT: &str = "WEBHOOK_PORT";
pub const ENV_DISCONNECT_THRESHOLD_SECS: &str = "ALARM_DISCONNECT_THRESHOLD_SECS";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "ALARM_SWEEP_INTERVAL_SECS";
pub const ENV_SWEEP_INITIAL_DELAY_SECS: &str = "ALARM_SWEEP_INITIAL_DELAY_SECS";
pub const ENV_IO_TIMEOUT_SECS: &str = "ALARM_IO_TIMEOUT_SECS";
pub const ENV_TIMEZONE: &str = "ALARM_TIMEZONE";
pub const ENV_LOG_FILE: &str = "ALARM_LOG_FILE";

const DEFAULT_DAEMON_ADDR: &str = "0.0.0.0:8443";
const DEFAULT_DISCONNECT_THRESHOLD_SECS: u64 = 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;
const DEFAULT_SWEEP_INITIAL_DELAY_SECS: u64 = 5;
const DEFAULT_IO_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEZONE: Tz = chrono_tz::US::Central;

/// Upper bound for every `*_SECS` variable (one year).
pub const MAX_SECS: u64 = 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Liveness monitor cadence and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// A sensor silent for longer than this is declared disconnected.
    pub disconnect_threshold: Duration,
    pub sweep_interval: Duration,
    pub initial_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            disconnect_threshold: Duration::from_secs(DEFAULT_DISCONNECT_THRESHOLD_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            initial_delay: Duration::from_secs(DEFAULT_SWEEP_INITIAL_DELAY_SECS),
        }
    }
}

/// Everything the daemon needs, resolved once at startup.
#[derive(Clone)]
pub struct AlarmConfig {
    /// Telegram bot token. Also the secret path segment of the webhook.
    pub bot_token: String,
    /// Chat ids that receive notifications and may issue commands.
    pub recipients: Vec<String>,
    /// Postgres URL. `None` selects the in-memory event store.
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
    /// Public `https://host:port/{token}/` registered with Telegram, if any.
    pub webhook_url: Option<String>,
    pub monitor: MonitorConfig,
    /// Upper bound for every outbound call (store, chat API).
    pub io_timeout: Duration,
    /// Zone used to render alert timestamps.
    pub timezone: Tz,
    /// Optional plain-text log file, written in addition to stdout.
    pub log_file: Option<PathBuf>,
}

impl std::fmt::Debug for AlarmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmConfig")
            .field("bot_token", &"<REDACTED>")
            .field("recipients", &self.recipients)
            .field("database_url", &self.database_url.as_ref().map(|_| "<REDACTED>"))
            .field("listen_addr", &self.listen_addr)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<REDACTED>"))
            .field("monitor", &self.monitor)
            .field("io_timeout", &self.io_timeout)
            .field("timezone", &self.timezone)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl AlarmConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` instead of the process environment.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Option<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(bot_token) = get(ENV_BOT_TOKEN) else {
            bail!("CONFIG_MISSING: required env var '{}' is not set or empty", ENV_BOT_TOKEN);
        };

        let Some(users) = get(ENV_USERS) else {
            bail!("CONFIG_MISSING: required env var '{}' is not set or empty", ENV_USERS);
        };
        let recipients = parse_recipients(&users);
        if recipients.is_empty() {
            bail!("CONFIG_INVALID: env var '{}' lists no chat ids", ENV_USERS);
        }

        let listen_addr: SocketAddr = get(ENV_DAEMON_ADDR)
            .unwrap_or_else(|| DEFAULT_DAEMON_ADDR.to_string())
            .parse()
            .with_context(|| format!("CONFIG_INVALID: env var '{}' is not a socket address", ENV_DAEMON_ADDR))?;

        let webhook_url = match (get(ENV_WEBHOOK_HOST), get(ENV_WEBHOOK_PORT)) {
            (Some(host), Some(port)) => Some(format!("https://{host}:{port}/{bot_token}/")),
            _ => None,
        };

        let monitor = MonitorConfig {
            disconnect_threshold: secs_or(&get, ENV_DISCONNECT_THRESHOLD_SECS, DEFAULT_DISCONNECT_THRESHOLD_SECS)?,
            sweep_interval: secs_or(&get, ENV_SWEEP_INTERVAL_SECS, DEFAULT_SWEEP_INTERVAL_SECS)?,
            initial_delay: secs_or(&get, ENV_SWEEP_INITIAL_DELAY_SECS, DEFAULT_SWEEP_INITIAL_DELAY_SECS)?,
        };
        if monitor.sweep_interval.is_zero() {
            bail!("CONFIG_INVALID: env var '{}' must be greater than zero", ENV_SWEEP_INTERVAL_SECS);
        }

        let io_timeout = secs_or(&get, ENV_IO_TIMEOUT_SECS, DEFAULT_IO_TIMEOUT_SECS)?;
        if io_timeout.is_zero() {
            bail!("CONFIG_INVALID: env var '{}' must be greater than zero", ENV_IO_TIMEOUT_SECS);
        }

        let timezone = match get(ENV_TIMEZONE) {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("CONFIG_INVALID: env var '{}': {}", ENV_TIMEZONE, e))?,
            None => DEFAULT_TIMEZONE,
        };

        Ok(Self {
            bot_token,
            recipients,
            database_url: get(ENV_DATABASE_URL),
            listen_addr,
            webhook_url,
            monitor,
            io_timeout,
            timezone,
            log_file: get(ENV_LOG_FILE).map(PathBuf::from),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Split a comma-separated chat id list, dropping blanks and duplicates while
/// keeping first-seen order.
fn parse_recipients(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

fn secs_or<G>(get: &G, name: &str, default: u64) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(v) = get(name) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = v
        .parse::<u64>()
        .with_context(|| format!("CONFIG_INVALID: env var '{}' is not a whole number of seconds", name))?;
    if secs > MAX_SECS {
        bail!("CONFIG_INVALID: env var '{}' exceeds {} seconds", name, MAX_SECS);
    }
    Ok(Duration::from_secs(secs))
}
