//! Environment-driven configuration.
//!
//! All knobs come from the process environment; the resulting [`Config`] is
//! immutable and passed by value into the supervisor at startup. Business
//! logic never reads ambient process state.

use std::path::PathBuf;

use url::Url;

use crate::error::{AisError, AisResult};

/// Default aisstream.io streaming endpoint.
pub const DEFAULT_FEED_URL: &str = "wss://stream.aisstream.io/v0/stream";

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Default bound on the retained history.
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Immutable runtime configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// aisstream.io API key (`AISSTREAM_API_KEY`).
    pub api_key: String,
    /// MMSI of the tracked vessel (`TARGET_MMSI`).
    pub target_mmsi: String,
    /// Streaming endpoint (`AIS_FEED_URL`).
    pub feed_url: String,
    /// Snapshot file path (`DATA_FILE`).
    pub data_file: PathBuf,
    /// History cap (`MAX_RECORDS`).
    pub max_records: usize,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `AisError::Config` if a required variable is missing or an
    /// optional one fails to parse.
    pub fn from_env() -> AisResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `AisError::Config` if a required variable is missing or an
    /// optional one fails to parse.
    pub fn from_lookup<F>(lookup: F) -> AisResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = require(&lookup, "AISSTREAM_API_KEY")?;
        let target_mmsi = require(&lookup, "TARGET_MMSI")?;

        let feed_url = lookup("AIS_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let data_file = lookup("DATA_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from);

        let max_records = match lookup("MAX_RECORDS") {
            None => DEFAULT_MAX_RECORDS,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                AisError::Config(format!("MAX_RECORDS must be a positive integer, got {raw:?}"))
            })?,
        };

        let config = Self {
            api_key,
            target_mmsi,
            feed_url,
            data_file,
            max_records,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the assembled configuration.
    ///
    /// # Errors
    /// Returns `AisError::Config` if any field is out of range.
    pub fn validate(&self) -> AisResult<()> {
        if self.api_key.is_empty() {
            return Err(AisError::Config("AISSTREAM_API_KEY must not be empty".into()));
        }
        if self.target_mmsi.is_empty() {
            return Err(AisError::Config("TARGET_MMSI must not be empty".into()));
        }
        if self.max_records == 0 {
            return Err(AisError::Config("MAX_RECORDS must be at least 1".into()));
        }

        let url = Url::parse(&self.feed_url)
            .map_err(|e| AisError::Config(format!("invalid feed URL {:?}: {e}", self.feed_url)))?;
        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(AisError::Config(format!(
                "feed URL must use ws:// or wss://, got {:?}",
                self.feed_url
            )));
        }

        Ok(())
    }
}

fn require<F>(lookup: &F, key: &str) -> AisResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AisError::Config(format!("{key} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn from_map(map: &HashMap<String, String>) -> AisResult<Config> {
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let map = env(&[("AISSTREAM_API_KEY", "key"), ("TARGET_MMSI", "244812000")]);
        let config = from_map(&map).unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.target_mmsi, "244812000");
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.data_file, PathBuf::from("data.json"));
        assert_eq!(config.max_records, 100);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let map = env(&[("TARGET_MMSI", "244812000")]);
        let err = from_map(&map).unwrap_err();
        assert!(matches!(err, AisError::Config(msg) if msg.contains("AISSTREAM_API_KEY")));
    }

    #[test]
    fn missing_target_mmsi_is_fatal() {
        let map = env(&[("AISSTREAM_API_KEY", "key")]);
        let err = from_map(&map).unwrap_err();
        assert!(matches!(err, AisError::Config(msg) if msg.contains("TARGET_MMSI")));
    }

    #[test]
    fn blank_api_key_is_fatal() {
        let map = env(&[("AISSTREAM_API_KEY", "  "), ("TARGET_MMSI", "244812000")]);
        assert!(from_map(&map).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let map = env(&[
            ("AISSTREAM_API_KEY", "key"),
            ("TARGET_MMSI", "244812000"),
            ("AIS_FEED_URL", "ws://127.0.0.1:9000/stream"),
            ("DATA_FILE", "/var/lib/aistrail/track.json"),
            ("MAX_RECORDS", "3"),
        ]);
        let config = from_map(&map).unwrap();

        assert_eq!(config.feed_url, "ws://127.0.0.1:9000/stream");
        assert_eq!(config.data_file, PathBuf::from("/var/lib/aistrail/track.json"));
        assert_eq!(config.max_records, 3);
    }

    #[test]
    fn non_numeric_max_records_is_rejected() {
        let map = env(&[
            ("AISSTREAM_API_KEY", "key"),
            ("TARGET_MMSI", "244812000"),
            ("MAX_RECORDS", "plenty"),
        ]);
        let err = from_map(&map).unwrap_err();
        assert!(matches!(err, AisError::Config(msg) if msg.contains("MAX_RECORDS")));
    }

    #[test]
    fn zero_max_records_is_rejected() {
        let map = env(&[
            ("AISSTREAM_API_KEY", "key"),
            ("TARGET_MMSI", "244812000"),
            ("MAX_RECORDS", "0"),
        ]);
        assert!(from_map(&map).is_err());
    }

    #[test]
    fn non_websocket_feed_url_is_rejected() {
        let map = env(&[
            ("AISSTREAM_API_KEY", "key"),
            ("TARGET_MMSI", "244812000"),
            ("AIS_FEED_URL", "https://stream.aisstream.io/v0/stream"),
        ]);
        let err = from_map(&map).unwrap_err();
        assert!(matches!(err, AisError::Config(msg) if msg.contains("ws://")));
    }
}
