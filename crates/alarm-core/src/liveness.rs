use crate::SensorRegistry;

/// A sensor evicted by [`sweep`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disconnected {
    pub location: String,
    pub last_seen: i64,
    /// `now - last_seen` at the time of the sweep.
    pub silent_for_secs: i64,
}

/// Evict every sensor silent for more than `threshold_secs`.
///
/// Scans a snapshot first, then removes; the registry is never mutated while
/// its live contents are being iterated. A record is evictable only when
/// `now - last_seen > threshold_secs`, so a freshly connected sensor always
/// survives at least one full threshold.
///
/// Returned in location order.
pub fn sweep(reg: &mut SensorRegistry, now: i64, threshold_secs: i64) -> Vec<Disconnected> {
    let gone: Vec<Disconnected> = reg
        .all_entries()
        .into_iter()
        .filter_map(|rec| {
            let silent = now.saturating_sub(rec.last_seen);
            (silent > threshold_secs).then(|| Disconnected {
                location: rec.location,
                last_seen: rec.last_seen,
                silent_for_secs: silent,
            })
        })
        .collect();

    for d in &gone {
        reg.remove(&d.location);
    }

    gone
}
