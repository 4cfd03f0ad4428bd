//! The snapshot sink seam.
//!
//! Committed snapshots leave the core through [`SnapshotSink`].
//! Persistence (time-series database, files) is an external concern;
//! the in-memory sink enforces the same append-only, monotonic
//! discipline a real store would.

use crate::error::SinkError;
use parking_lot::Mutex;
use types::{IndexSnapshot, Timestamp};

/// Abstract destination for committed index snapshots.
///
/// Commits must arrive in strictly increasing timestamp order: the
/// engine serializes chaining writes, and the sink is entitled to
/// reject anything that violates that discipline.
pub trait SnapshotSink: Send + Sync {
    /// Persist one finalized snapshot.
    fn commit(&self, snapshot: &IndexSnapshot) -> Result<(), SinkError>;
}

/// Append-only in-memory snapshot log, keyed by cycle timestamp.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<IndexSnapshot>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.snapshots.lock().is_empty()
    }

    /// The most recently committed snapshot.
    pub fn latest(&self) -> Option<IndexSnapshot> {
        self.snapshots.lock().last().cloned()
    }

    /// Snapshot committed at an exact timestamp.
    pub fn get(&self, timestamp: Timestamp) -> Option<IndexSnapshot> {
        self.snapshots
            .lock()
            .iter()
            .find(|s| s.timestamp == timestamp)
            .cloned()
    }

    /// Full committed history in commit order.
    pub fn history(&self) -> Vec<IndexSnapshot> {
        self.snapshots.lock().clone()
    }
}

impl SnapshotSink for MemorySink {
    fn commit(&self, snapshot: &IndexSnapshot) -> Result<(), SinkError> {
        let mut log = self.snapshots.lock();
        if let Some(last) = log.last() {
            if snapshot.timestamp <= last.timestamp {
                return Err(SinkError::NonMonotonic {
                    timestamp: snapshot.timestamp,
                    last: last.timestamp,
                });
            }
        }
        log.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: Timestamp) -> IndexSnapshot {
        IndexSnapshot {
            timestamp,
            value: 1000.0,
            constituents: Vec::new(),
            base: None,
            notes: Vec::new(),
        }
    }

    #[test]
    fn appends_in_order() {
        let sink = MemorySink::new();
        sink.commit(&snapshot(100)).unwrap();
        sink.commit(&snapshot(200)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.latest().unwrap().timestamp, 200);
        assert_eq!(sink.get(100).unwrap().timestamp, 100);
    }

    #[test]
    fn rejects_non_monotonic_commits() {
        let sink = MemorySink::new();
        sink.commit(&snapshot(200)).unwrap();
        let err = sink.commit(&snapshot(200)).unwrap_err();
        assert_eq!(
            err,
            SinkError::NonMonotonic {
                timestamp: 200,
                last: 200
            }
        );
        assert!(sink.commit(&snapshot(100)).is_err());
        // Failed commits leave the log untouched
        assert_eq!(sink.len(), 1);
    }
}
