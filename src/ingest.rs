//! Frame filtering and mapping: the single side-effecting path.
//!
//! Every inbound frame lands here. Frames for other vessels are discarded;
//! frames for the target are mapped to a [`PositionReport`], appended to the
//! history, written to the snapshot, and committed through the sink. No error
//! on this path may escape and kill the receive loop.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::history::HistoryStore;
use crate::sink::PersistenceSink;
use crate::types::{PositionReport, mmsi_matches};

/// Decides, maps, and persists one frame at a time.
pub struct Ingestor {
    target_mmsi: String,
    store: HistoryStore,
    sink: Box<dyn PersistenceSink>,
}

impl Ingestor {
    #[must_use]
    pub fn new(
        target_mmsi: impl Into<String>,
        store: HistoryStore,
        sink: Box<dyn PersistenceSink>,
    ) -> Self {
        Self {
            target_mmsi: target_mmsi.into(),
            store,
            sink,
        }
    }

    /// Handle one raw frame from the feed.
    ///
    /// Infallible by contract: parse failures, write failures, and commit
    /// failures are logged and swallowed so the receive loop keeps running.
    pub async fn handle_frame(&mut self, raw: &str) {
        let frame: Value = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Discarding unparseable frame");
                return;
            }
        };

        if !mmsi_matches(&frame, &self.target_mmsi) {
            debug!("Frame is for another vessel, discarding");
            return;
        }

        let record = PositionReport::from_frame(&frame);
        info!(
            mmsi = %self.target_mmsi,
            lat = ?record.lat,
            lon = ?record.lon,
            "Matched position report"
        );

        self.store.append(record);

        if let Err(e) = self.store.persist() {
            error!(error = %e, "Failed to write snapshot; will retry on next report");
            return;
        }
        if let Err(e) = self.sink.commit(self.store.path()).await {
            error!(error = %e, "Snapshot commit failed; will retry on next report");
        }
    }

    /// The history this ingestor feeds.
    #[must_use]
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }
}
