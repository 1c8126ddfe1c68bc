//! Bounded, ordered record log mirrored to a JSON snapshot file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::AisResult;
use crate::types::PositionReport;

/// The capped history of position reports for one vessel.
///
/// Insertion order is arrival order and is trusted as chronological; records
/// are never reordered by timestamp. After every mutation the length is at
/// most `max_records`, oldest dropped first.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    max_records: usize,
    records: Vec<PositionReport>,
}

impl HistoryStore {
    /// Load the history from its snapshot file.
    ///
    /// A missing file is a normal first run and a malformed one is treated as
    /// corruption; both yield an empty history so the process always starts.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, max_records: usize) -> Self {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Err(_) => {
                info!(path = %path.display(), "No snapshot found, starting with empty history");
                Vec::new()
            }
            Ok(raw) => match serde_json::from_str::<Vec<PositionReport>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Snapshot is malformed, starting with empty history"
                    );
                    Vec::new()
                }
            },
        };

        let mut store = Self {
            path,
            max_records,
            records,
        };
        store.enforce_cap();
        store
    }

    /// Append a record to the tail, dropping from the head past the cap.
    pub fn append(&mut self, record: PositionReport) {
        self.records.push(record);
        self.enforce_cap();
    }

    /// Serialize the full history and overwrite the snapshot file.
    ///
    /// Synchronous by design: the caller waits for the write before handling
    /// the next frame, which throttles ingestion against slow storage.
    ///
    /// # Errors
    /// Returns the underlying serialization or I/O error; in-memory state is
    /// untouched either way.
    pub fn persist(&self) -> AisResult<()> {
        let body = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    fn enforce_cap(&mut self) {
        if self.records.len() > self.max_records {
            let excess = self.records.len() - self.max_records;
            self.records.drain(..excess);
        }
    }

    /// The retained records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[PositionReport] {
        &self.records
    }

    /// Snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn report(lat: f64) -> PositionReport {
        PositionReport {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            lat: Some(lat),
            lon: None,
            speed: None,
            course: None,
        }
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(dir.path().join("data.json"), 100);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let store = HistoryStore::load(&path, 100);
        assert!(store.is_empty());
    }

    #[test]
    fn append_keeps_only_the_newest_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::load(dir.path().join("data.json"), 3);

        for lat in [1.0, 2.0, 3.0, 4.0] {
            store.append(report(lat));
        }

        assert_eq!(store.len(), 3);
        let lats: Vec<_> = store.records().iter().map(|r| r.lat).collect();
        assert_eq!(lats, vec![Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn append_below_cap_keeps_everything_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::load(dir.path().join("data.json"), 100);

        store.append(report(1.0));
        store.append(report(2.0));

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].lat, Some(1.0));
        assert_eq!(store.records()[1].lat, Some(2.0));
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut store = HistoryStore::load(&path, 100);
        store.append(report(1.0));
        store.append(report(2.0));
        store.persist().unwrap();

        let reloaded = HistoryStore::load(&path, 100);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn persist_writes_a_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut store = HistoryStore::load(&path, 100);
        store.append(report(1.0));
        store.persist().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        let parsed: Vec<PositionReport> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn persist_overwrites_the_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut store = HistoryStore::load(&path, 100);
        store.append(report(1.0));
        store.persist().unwrap();
        store.append(report(2.0));
        store.persist().unwrap();

        let parsed: Vec<PositionReport> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn oversized_snapshot_is_capped_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut store = HistoryStore::load(&path, 100);
        for lat in [1.0, 2.0, 3.0, 4.0, 5.0] {
            store.append(report(lat));
        }
        store.persist().unwrap();

        let reloaded = HistoryStore::load(&path, 2);
        let lats: Vec<_> = reloaded.records().iter().map(|r| r.lat).collect();
        assert_eq!(lats, vec![Some(4.0), Some(5.0)]);
    }

    #[test]
    fn persist_failure_leaves_memory_intact() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path cannot be overwritten as a file.
        let mut store = HistoryStore::load(dir.path(), 100);
        store.append(report(1.0));

        assert!(store.persist().is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].lat, Some(1.0));
    }
}
