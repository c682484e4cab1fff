//! Time-bucketed frame retention.

use std::collections::BTreeMap;

use crate::models::Frame;

/// Frames keyed by timestamp, bounded by a retention horizon.
///
/// Keys are unique: a second `put` at the same timestamp replaces the
/// first frame instead of accumulating flights.
#[derive(Debug, Clone)]
pub struct WindowStore {
    retention_secs: i64,
    frames: BTreeMap<i64, Frame>,
}

impl WindowStore {
    pub fn new(retention_secs: u64) -> Self {
        Self {
            retention_secs: i64::try_from(retention_secs).unwrap_or(i64::MAX),
            frames: BTreeMap::new(),
        }
    }

    pub fn retention_secs(&self) -> i64 {
        self.retention_secs
    }

    /// Insert or overwrite the frame at `timestamp`.
    pub fn put(&mut self, timestamp: i64, mut frame: Frame) {
        frame.timestamp = timestamp;
        self.frames.insert(timestamp, frame);
    }

    /// Drop every frame older than `now - retention`. Returns how many went.
    pub fn prune(&mut self, now: i64) -> usize {
        let cutoff = now.saturating_sub(self.retention_secs);
        let before = self.frames.len();
        self.frames = self.frames.split_off(&cutoff);
        before - self.frames.len()
    }

    /// All retained frames, oldest first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.values().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.frames.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total flight positions across all retained frames.
    pub fn flight_count(&self) -> usize {
        self.frames.values().map(|f| f.flights.len()).sum()
    }
}
