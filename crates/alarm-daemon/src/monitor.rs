//! Liveness monitor: periodic eviction of silent sensors.

use std::sync::Arc;

use alarm_core::Disconnected;
use alarm_notify::{notify_all, templates};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::{now_unix, AppState};

/// Evict every sensor silent for longer than the configured threshold as of
/// `now`, then notify each disconnection.
///
/// Snapshot and removal happen under one registry lock; notifications are
/// sent after it is released.
pub async fn run_sweep(st: &AppState, now: i64) -> Vec<Disconnected> {
    let threshold = i64::try_from(st.monitor.disconnect_threshold.as_secs()).unwrap_or(i64::MAX);
    let evicted = {
        let mut reg = st.registry.lock().await;
        alarm_core::sweep(&mut reg, now, threshold)
    };

    for d in &evicted {
        info!(location = %d.location, silent_for_secs = d.silent_for_secs, "sensor disconnected");
        let text = templates::device_disconnected(&d.location);
        notify_all(st.notifier.as_ref(), &st.recipients, &text, st.io_timeout).await;
    }

    evicted
}

/// Spawn the background sweep: first tick after `initial_delay`, then every
/// `sweep_interval`. Runs for the lifetime of the process.
pub fn spawn_liveness_monitor(st: Arc<AppState>) -> JoinHandle<()> {
    let cfg = st.monitor;
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + cfg.initial_delay, cfg.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            threshold = ?cfg.disconnect_threshold,
            interval = ?cfg.sweep_interval,
            "liveness monitor started"
        );

        loop {
            ticker.tick().await;
            let evicted = run_sweep(&st, now_unix()).await;
            debug!(evicted = evicted.len(), "liveness sweep");
        }
    })
}
