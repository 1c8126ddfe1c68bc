//! Wire and storage types for the AIS feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single decoded position report for the tracked vessel.
///
/// Immutable once created; produced exclusively by the filter/mapper. Fields
/// absent from the inbound frame stay `None` and serialize as `null` — a
/// missing speed is unknown, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    /// Arrival instant, UTC.
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Speed over ground in knots.
    pub speed: Option<f64>,
    /// Course over ground in degrees.
    pub course: Option<f64>,
}

impl PositionReport {
    /// Map a raw feed frame into a report, stamped with the current instant.
    ///
    /// Only numeric fields are taken; anything absent or of the wrong type
    /// maps to `None`.
    #[must_use]
    pub fn from_frame(frame: &Value) -> Self {
        Self {
            timestamp: Utc::now(),
            lat: numeric_field(frame, "LAT"),
            lon: numeric_field(frame, "LON"),
            speed: numeric_field(frame, "SPEED"),
            course: numeric_field(frame, "COURSE"),
        }
    }
}

fn numeric_field(frame: &Value, key: &str) -> Option<f64> {
    frame.get(key).and_then(Value::as_f64)
}

/// Does a frame's `MMSI` field match the target identifier?
///
/// The feed is free to send the MMSI as a number or a string; both are
/// compared by value against the configured target.
#[must_use]
pub fn mmsi_matches(frame: &Value, target: &str) -> bool {
    match frame.get("MMSI") {
        Some(Value::String(s)) => s.as_str() == target,
        Some(Value::Number(n)) => n.to_string() == target,
        _ => false,
    }
}

/// The control message sent once per connection, immediately after open.
///
/// Field names follow the aisstream.io subscription schema. The bounding box
/// covers the full coordinate space; filtering is by MMSI, not geography.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionFilter {
    #[serde(rename = "APIKey")]
    pub api_key: String,
    #[serde(rename = "BoundingBoxes")]
    pub bounding_boxes: Vec<Vec<[f64; 2]>>,
    #[serde(rename = "FiltersShipMMSI")]
    pub ship_mmsi: Vec<String>,
    #[serde(rename = "FilterMessageTypes")]
    pub message_types: Vec<String>,
}

impl SubscriptionFilter {
    /// Build the filter for one vessel: whole-world bounding box, position
    /// reports only.
    #[must_use]
    pub fn for_vessel(api_key: impl Into<String>, mmsi: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            bounding_boxes: vec![vec![[-90.0, -180.0], [90.0, 180.0]]],
            ship_mmsi: vec![mmsi.into()],
            message_types: vec!["PositionReport".into()],
        }
    }
}
