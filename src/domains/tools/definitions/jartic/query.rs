//! Upstream query construction.
//!
//! Maps a validated [`QueryFilter`] onto the request the JARTIC API expects.
//! The mapping is pure and infallible: validation has already rejected every
//! bad input, so a failure in here is a programming defect, not a runtime
//! error. Fields that were absent from the filter produce no query parameter
//! at all (the upstream treats a missing key and an empty value differently).

use super::params::{BoundingBox, QueryFilter};

/// Path of the traffic-volume endpoint, relative to the API base URL.
pub const ENDPOINT: &str = "traffic/flow";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A fully-formed upstream request descriptor: endpoint plus ordered query
/// parameters, ready to be rendered into a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamQuery {
    params: Vec<(&'static str, String)>,
}

impl UpstreamQuery {
    /// Build the upstream query for a validated filter.
    ///
    /// Key order is deterministic: location filters first, then `date`, then
    /// `limit`. `date` and `limit` are always present; everything else only
    /// when the filter carries it.
    pub fn from_filter(filter: &QueryFilter) -> Self {
        debug_assert!(
            filter.has_location_filter(),
            "validated filters always carry at least one location filter"
        );

        let mut params = Vec::new();
        if let Some(id) = &filter.location_id {
            params.push(("location_id", id.clone()));
        }
        if let Some(code) = &filter.road_code {
            params.push(("road_code", code.clone()));
        }
        if let Some(code) = &filter.mesh_code {
            params.push(("mesh_code", code.clone()));
        }
        if let Some(bbox) = &filter.region {
            params.push(("bbox", format_bbox(bbox)));
        }
        params.push(("date", filter.date.format(DATE_FORMAT).to_string()));
        params.push(("limit", filter.limit.to_string()));

        Self { params }
    }

    /// The query parameters, in the order they will be rendered.
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Render the parameters as a form-encoded query string.
    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(&self.params)
            .expect("string key/value pairs always form-encode")
    }

    /// Render the complete request URL against an API base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}?{}",
            base_url.trim_end_matches('/'),
            ENDPOINT,
            self.query_string()
        )
    }
}

/// Upstream bounding-box convention: `minLon,minLat,maxLon,maxLat`, x before y.
fn format_bbox(bbox: &BoundingBox) -> String {
    format!(
        "{},{},{},{}",
        bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
    )
}
