//! aistrail — single-vessel AIS track recorder.
//!
//! Subscribes to the aisstream.io websocket feed, filters the multiplexed
//! stream down to one MMSI, keeps a bounded history of position reports
//! mirrored to a JSON snapshot, and commits every snapshot through a
//! pluggable persistence sink (git by default). A supervisor restarts the
//! subscription forever with a two-tier backoff.
//!
//! Pipeline, leaves first:
//! - [`stream::FeedSubscriber`] — one live connection, subscription on open
//! - [`ingest::Ingestor`] — filter, map, append, commit
//! - [`history::HistoryStore`] — capped record log with snapshot persistence
//! - [`sink::PersistenceSink`] — durable-storage collaborator
//! - [`supervisor::Supervisor`] — lifecycle, backoff, retry forever

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod sink;
pub mod stream;
pub mod supervisor;
pub mod types;

pub use config::Config;
pub use error::{AisError, AisResult};
pub use types::PositionReport;
