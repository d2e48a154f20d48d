//! Upstream response parsing.
//!
//! The traffic API returns a GeoJSON-style `FeatureCollection`: a `features`
//! array of observation features plus a WFS-style `totalFeatures` match
//! count. Each feature carries its measurements under `properties` and an
//! optional point `geometry`.
//!
//! Parsing is deliberately forgiving at the record level: a malformed feature
//! is skipped with a warning and counted, so one bad entry cannot discard a
//! whole page of legitimate data. Only when a non-empty batch yields zero
//! records does the batch as a whole fail. Structural problems (non-JSON
//! body, missing `features` array) always fail.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::warn;

use super::model::TrafficRecord;
use super::params::TimeWindow;
use crate::domains::tools::error::ToolError;

/// Timestamp formats the upstream has been observed to emit.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Property keys that can serve as the location reference, in preference
/// order.
const LOCATION_KEYS: [&str; 3] = ["location_id", "road_code", "mesh_code"];

/// One parsed upstream page.
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    /// Records in upstream return order.
    pub records: Vec<TrafficRecord>,
    /// Malformed features that were dropped.
    pub skipped: usize,
    /// Upstream's total match count, when it reported one. May exceed the
    /// number of features the response actually carried.
    pub total_features: Option<u64>,
}

/// Parse a raw upstream body into traffic records.
pub fn parse_features(body: &str) -> Result<ParsedBatch, ToolError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ToolError::upstream_format(format!("response body is not valid JSON: {e}")))?;

    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::upstream_format("response carries no 'features' array"))?;

    let total_features = root.get("totalFeatures").and_then(Value::as_u64);

    let mut records = Vec::with_capacity(features.len());
    let mut skipped = 0;
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(feature) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("Skipping malformed feature {}: {}", index, reason);
                skipped += 1;
            }
        }
    }

    if records.is_empty() && !features.is_empty() {
        return Err(ToolError::upstream_format(format!(
            "none of the {} features parsed as traffic observations",
            features.len()
        )));
    }

    Ok(ParsedBatch {
        records,
        skipped,
        total_features,
    })
}

/// Narrow records to a time-of-day window (bounds inclusive), preserving
/// order. The upstream only filters at day granularity, so this runs
/// client-side.
pub fn apply_time_window(records: Vec<TrafficRecord>, window: &TimeWindow) -> Vec<TrafficRecord> {
    records
        .into_iter()
        .filter(|record| window.contains(record.observed_at.time()))
        .collect()
}

fn parse_feature(feature: &Value) -> Result<TrafficRecord, String> {
    let properties = feature
        .get("properties")
        .filter(|p| p.is_object())
        .ok_or("feature carries no properties object")?;

    let location = LOCATION_KEYS
        .iter()
        .find_map(|key| string_property(properties, key))
        .ok_or("feature carries no location reference")?;

    let observed_raw = properties
        .get("observed_at")
        .and_then(Value::as_str)
        .ok_or("feature carries no observed_at timestamp")?;
    let observed_at = parse_timestamp(observed_raw)
        .ok_or_else(|| format!("unparseable observed_at '{observed_raw}'"))?;

    let volume = properties
        .get("volume")
        .and_then(Value::as_u64)
        .ok_or("feature carries no numeric volume")?;

    // Optional measurements degrade to None instead of failing the record.
    let avg_speed = properties.get("avg_speed").and_then(Value::as_f64);
    let congestion = properties
        .get("congestion")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let (longitude, latitude) = feature
        .get("geometry")
        .map(point_coordinates)
        .unwrap_or((None, None));

    Ok(TrafficRecord {
        location,
        observed_at,
        volume,
        avg_speed,
        congestion,
        longitude,
        latitude,
    })
}

/// Read a property as a string, tolerating upstream records that encode
/// identifiers as JSON numbers.
fn string_property(properties: &Value, key: &str) -> Option<String> {
    match properties.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim_end_matches('Z');
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn point_coordinates(geometry: &Value) -> (Option<f64>, Option<f64>) {
    let is_point = geometry.get("type").and_then(Value::as_str) == Some("Point");
    let coordinates = geometry.get("coordinates").and_then(Value::as_array);
    match (is_point, coordinates) {
        (true, Some(coordinates)) if coordinates.len() >= 2 => {
            (coordinates[0].as_f64(), coordinates[1].as_f64())
        }
        _ => (None, None),
    }
}
