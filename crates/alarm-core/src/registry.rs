use std::collections::BTreeMap;

use alarm_schemas::SensorStatus;

/// Last confirmed state of one sensor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorRecord {
    pub location: String,
    pub state: SensorStatus,
    /// Server timestamp (unix seconds) of the last accepted report.
    pub last_seen: i64,
}

/// Authoritative map of location -> [`SensorRecord`].
///
/// Holds at most one record per location. Ordered by location so snapshots
/// and status listings are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorRegistry {
    records: BTreeMap<String, SensorRecord>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &str) -> Option<&SensorRecord> {
        self.records.get(location)
    }

    /// Create or overwrite the record for `location`.
    pub fn upsert(&mut self, location: &str, state: SensorStatus, last_seen: i64) {
        self.records.insert(
            location.to_string(),
            SensorRecord {
                location: location.to_string(),
                state,
                last_seen,
            },
        );
    }

    pub fn remove(&mut self, location: &str) -> Option<SensorRecord> {
        self.records.remove(location)
    }

    /// Owned snapshot of every record, ordered by location.
    ///
    /// Callers may mutate the registry while holding the snapshot.
    pub fn all_entries(&self) -> Vec<SensorRecord> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
