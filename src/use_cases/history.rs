use glam::Vec3;
use std::collections::{BTreeMap, VecDeque};

/// One retained position sample for rollback queries.
#[derive(Debug, Clone, Copy)]
pub struct HistoryEntry {
    pub position: Vec3,
    pub recorded_at: u64,
}

/// Per-entity sliding window of past positions for lag-compensation queries
/// ("where was entity X at time T").
///
/// Absence is a normal result, not a failure: queries for unknown entities or
/// for times older than the retained window return `None`. Entities are keyed
/// in a `BTreeMap` so iteration order is deterministic.
pub struct HistoryStore {
    entries: BTreeMap<String, VecDeque<HistoryEntry>>,
    retention_millis: u64,
}

impl HistoryStore {
    pub fn new(retention_millis: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            retention_millis,
        }
    }

    /// Append a sample, then prune that entity's window relative to its
    /// newest entry. Timestamps come from a monotonic clock, so appends
    /// arrive in order.
    pub fn record(&mut self, entity_id: &str, position: Vec3, timestamp: u64) {
        let entries = self.entries.entry(entity_id.to_string()).or_default();
        entries.push_back(HistoryEntry {
            position,
            recorded_at: timestamp,
        });

        let newest = entries
            .back()
            .map(|e| e.recorded_at)
            .unwrap_or(timestamp);
        let cutoff = newest.saturating_sub(self.retention_millis);
        while entries.front().is_some_and(|e| e.recorded_at < cutoff) {
            entries.pop_front();
        }
    }

    /// Position of the latest sample at or before `target_time`.
    pub fn query(&self, entity_id: &str, target_time: u64) -> Option<Vec3> {
        let entries = self.entries.get(entity_id)?;
        entries
            .iter()
            .rev()
            .find(|e| e.recorded_at <= target_time)
            .map(|e| e.position)
    }

    /// Drop samples strictly older than `now - retention` across all
    /// entities, and forget entities with nothing left.
    pub fn cleanup(&mut self, now: u64) {
        let cutoff = now.saturating_sub(self.retention_millis);
        self.entries.retain(|_, entries| {
            while entries.front().is_some_and(|e| e.recorded_at < cutoff) {
                entries.pop_front();
            }
            !entries.is_empty()
        });
    }

    pub fn tracked_entities(&self) -> usize {
        self.entries.len()
    }

    /// Forget everything; used when a session ends.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETENTION: u64 = 5_000;

    fn pos(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn query_returns_the_closest_sample_at_or_before_the_target() {
        let mut store = HistoryStore::new(RETENTION);
        store.record("e1", pos(1.0), 1_000);
        store.record("e1", pos(2.0), 2_000);

        assert_eq!(store.query("e1", 1_500), Some(pos(1.0)));
        assert_eq!(store.query("e1", 2_500), Some(pos(2.0)));
        assert_eq!(store.query("e1", 2_000), Some(pos(2.0)));
    }

    #[test]
    fn query_misses_are_a_normal_result() {
        let mut store = HistoryStore::new(RETENTION);
        store.record("e1", pos(1.0), 1_000);

        // Before the first sample, and for an unknown entity.
        assert_eq!(store.query("e1", 500), None);
        assert_eq!(store.query("ghost", 1_500), None);
    }

    #[test]
    fn recording_prunes_samples_outside_the_window_of_the_newest() {
        let mut store = HistoryStore::new(RETENTION);
        store.record("e1", pos(1.0), 1_000);
        store.record("e1", pos(2.0), 7_000);

        // The 1_000 sample is more than the window behind 7_000.
        assert_eq!(store.query("e1", 1_500), None);
        assert_eq!(store.query("e1", 7_500), Some(pos(2.0)));
    }

    #[test]
    fn cleanup_drops_old_samples_and_empty_entities() {
        let mut store = HistoryStore::new(RETENTION);
        store.record("e1", pos(1.0), 1_000);
        store.record("e2", pos(2.0), 9_000);
        assert_eq!(store.tracked_entities(), 2);

        store.cleanup(10_000);

        assert_eq!(store.tracked_entities(), 1);
        assert_eq!(store.query("e1", 2_000), None);
        assert_eq!(store.query("e2", 9_500), Some(pos(2.0)));
    }

    #[test]
    fn clear_forgets_all_entities() {
        let mut store = HistoryStore::new(RETENTION);
        store.record("e1", pos(1.0), 1_000);
        store.clear();

        assert_eq!(store.query("e1", 1_500), None);
        assert_eq!(store.tracked_entities(), 0);
    }
}
