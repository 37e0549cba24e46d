//! Shared runtime state for alarm-daemon.
//!
//! `AppState` is built once by `main` and shared as `Arc<AppState>` with the
//! Axum handlers and the liveness monitor task. There is no ambient global
//! state: everything the reconciler, monitor and command handlers touch hangs
//! off this struct.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alarm_config::{AlarmConfig, MonitorConfig};
use alarm_core::{ArmState, SensorRegistry};
use alarm_db::EventStore;
use alarm_notify::Notifier;
use alarm_schemas::SystemStatus;
use chrono_tz::Tz;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// LocationGates
// ---------------------------------------------------------------------------

/// One FIFO gate per location.
///
/// A report holds its location's gate for the whole reconcile call, I/O
/// included, so reports for the same location run strictly in arrival order
/// while different locations never wait on each other. Tokio mutexes are
/// fair, which gives the FIFO property.
///
/// Entries live only while some caller holds the gate: every [`gate`] must
/// be paired with a [`release`], and the last release removes the entry.
///
/// [`gate`]: LocationGates::gate
/// [`release`]: LocationGates::release
#[derive(Default)]
pub struct LocationGates {
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LocationGates {
    pub async fn gate(&self, location: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        Arc::clone(gates.entry(location.to_string()).or_default())
    }

    /// Hand back a gate obtained from [`gate`](Self::gate).
    ///
    /// Clones are only created under the map lock, so a strong count of two
    /// (map + `gate`) seen under that lock means nobody else is queued.
    pub async fn release(&self, location: &str, gate: Arc<Mutex<()>>) {
        let mut gates = self.gates.lock().await;
        let idle = gates
            .get(location)
            .is_some_and(|g| Arc::ptr_eq(g, &gate) && Arc::strong_count(&gate) == 2);
        drop(gate);
        if idle {
            gates.remove(location);
        }
    }

    /// Number of locations with a live gate.
    pub async fn len(&self) -> usize {
        self.gates.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.gates.lock().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    /// Static build metadata.
    pub build: BuildInfo,
    /// Authoritative sensor registry. Never held across I/O.
    pub registry: Arc<Mutex<SensorRegistry>>,
    /// Process-wide arm flag. Boots DISARMED.
    pub arm: Arc<RwLock<ArmState>>,
    /// Per-location ordering gates for the reconciler.
    pub gates: Arc<LocationGates>,
    pub store: Arc<dyn EventStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Notification recipients; also the only chats allowed to send commands.
    pub recipients: Arc<Vec<String>>,
    /// Webhook path secret for chat updates.
    pub bot_token: Arc<String>,
    /// Display name used in `/help` replies.
    pub bot_name: Arc<String>,
    pub monitor: MonitorConfig,
    /// Upper bound for each store call and each notification.
    pub io_timeout: Duration,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(cfg: &AlarmConfig, store: Arc<dyn EventStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            build: BuildInfo {
                service: "alarm-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            registry: Arc::new(Mutex::new(SensorRegistry::new())),
            arm: Arc::new(RwLock::new(ArmState::boot())),
            gates: Arc::new(LocationGates::default()),
            store,
            notifier,
            recipients: Arc::new(cfg.recipients.clone()),
            bot_token: Arc::new(cfg.bot_token.clone()),
            bot_name: Arc::new("AlarmBot".to_string()),
            monitor: cfg.monitor,
            io_timeout: cfg.io_timeout,
            timezone: cfg.timezone,
        }
    }

    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Arc::new(name.into());
        self
    }

    // -----------------------------------------------------------------------
    // Arm / disarm controller
    // -----------------------------------------------------------------------

    pub async fn arm(&self) {
        *self.arm.write().await = ArmState::arm();
        info!("system armed");
    }

    pub async fn disarm(&self) {
        *self.arm.write().await = ArmState::manual_disarm();
        info!("system disarmed");
    }

    pub async fn current_state(&self) -> ArmState {
        *self.arm.read().await
    }

    pub async fn system_status(&self) -> SystemStatus {
        self.arm.read().await.system_status()
    }

    pub fn is_recipient(&self, chat_id: &str) -> bool {
        self.recipients.iter().any(|r| r == chat_id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Server time in unix seconds. The only clock used for report timestamps
/// and liveness sweeps.
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
