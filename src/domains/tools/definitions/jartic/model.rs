//! Output types for the traffic flow tool.
//!
//! These are the shapes serialized into the MCP structured content of a
//! successful `get_traffic_flow` call.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One normalized traffic observation.
///
/// `location` is the upstream location reference: whichever of observation
/// point id, road code, or grid mesh code the upstream record carried.
/// Coordinates are present when the upstream feature had a point geometry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrafficRecord {
    /// Point/road/mesh identifier of the observation site.
    pub location: String,

    /// Observation timestamp (local time of the upstream service).
    pub observed_at: NaiveDateTime,

    /// Number of vehicles counted in the observation interval.
    pub volume: u64,

    /// Average speed in km/h, when the sensor reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,

    /// Congestion indicator, when the sensor reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub congestion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
}

/// The complete result of one tool invocation.
///
/// `records` preserves upstream return order. `truncated` is set when the
/// record cap cut results or the upstream reported more matches than it
/// returned. `skipped` counts malformed upstream entries that were dropped
/// during parsing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrafficFlowResult {
    pub records: Vec<TrafficRecord>,
    pub count: usize,
    pub truncated: bool,
    pub skipped: usize,
}
