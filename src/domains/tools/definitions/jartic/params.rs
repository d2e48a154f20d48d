//! Tool parameters and validation.
//!
//! The raw argument surface (`GetTrafficFlowParams`) keeps every field
//! optional at the serde level; semantic validation owns all rejections and
//! turns the raw arguments into an immutable [`QueryFilter`]. A filter is
//! built once per invocation and never mutated afterwards.

use chrono::{NaiveDate, NaiveTime};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::error::ToolError;

/// Records returned per invocation when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 100;

/// Upper bound on `limit`, keeping a single invocation from requesting an
/// unbounded upstream fetch.
pub const MAX_LIMIT: usize = 1000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw arguments of the `get_traffic_flow` tool, exactly as the MCP client
/// sent them.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetTrafficFlowParams {
    /// Observation point identifier.
    #[schemars(description = "Observation point identifier")]
    pub location_id: Option<String>,

    /// Road code of the section to query.
    #[schemars(description = "Road code of the section to query")]
    pub road_code: Option<String>,

    /// Grid square (area mesh) code.
    #[schemars(description = "Grid square (area mesh) code, 4-11 digits")]
    pub mesh_code: Option<String>,

    /// Geographic bounding box to query.
    #[schemars(description = "Bounding box {minLat, minLon, maxLat, maxLon} in decimal degrees")]
    pub region: Option<RegionParams>,

    /// Observation date. Required; the tool rejects invocations without it.
    #[schemars(description = "Observation date, YYYY-MM-DD (required)")]
    pub date: Option<String>,

    /// Inclusive start of the time-of-day window.
    #[schemars(description = "Start of the time-of-day window, HH:MM (inclusive)")]
    pub time_start: Option<String>,

    /// Inclusive end of the time-of-day window.
    #[schemars(description = "End of the time-of-day window, HH:MM (inclusive)")]
    pub time_end: Option<String>,

    /// Maximum number of records to return.
    #[schemars(description = "Maximum number of records to return (default 100, max 1000)")]
    pub limit: Option<u32>,
}

/// Bounding box as supplied by the caller (camelCase keys on the wire).
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionParams {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// A validated bounding rectangle (`min <= max` on both axes, coordinates in
/// range).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn from_params(region: RegionParams) -> Result<Self, ToolError> {
        let lat_range = -90.0..=90.0;
        let lon_range = -180.0..=180.0;
        if !lat_range.contains(&region.min_lat) || !lat_range.contains(&region.max_lat) {
            return Err(ToolError::validation(
                "region latitudes must lie within -90..=90",
            ));
        }
        if !lon_range.contains(&region.min_lon) || !lon_range.contains(&region.max_lon) {
            return Err(ToolError::validation(
                "region longitudes must lie within -180..=180",
            ));
        }
        if region.min_lat > region.max_lat {
            return Err(ToolError::validation("region must satisfy minLat <= maxLat"));
        }
        if region.min_lon > region.max_lon {
            return Err(ToolError::validation("region must satisfy minLon <= maxLon"));
        }
        Ok(Self {
            min_lat: region.min_lat,
            min_lon: region.min_lon,
            max_lat: region.max_lat,
            max_lon: region.max_lon,
        })
    }
}

/// Time-of-day window with inclusive bounds. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeWindow {
    /// Whether a timestamp's time-of-day falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start.is_none_or(|start| time >= start) && self.end.is_none_or(|end| time <= end)
    }
}

/// The validated request. Immutable after construction; one per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub location_id: Option<String>,
    pub road_code: Option<String>,
    pub mesh_code: Option<String>,
    pub region: Option<BoundingBox>,
    pub date: NaiveDate,
    pub time_window: Option<TimeWindow>,
    pub limit: usize,
}

impl QueryFilter {
    /// Validate raw tool arguments into a filter.
    ///
    /// Every rejection is a [`ToolError::Validation`] carrying a reason that
    /// is returned to the caller verbatim.
    pub fn from_params(params: &GetTrafficFlowParams) -> Result<Self, ToolError> {
        let date_raw = normalize(params.date.as_deref())
            .ok_or_else(|| ToolError::validation("date is required (format YYYY-MM-DD)"))?;
        let date = NaiveDate::parse_from_str(&date_raw, DATE_FORMAT).map_err(|_| {
            ToolError::validation(format!(
                "date '{date_raw}' is not a valid YYYY-MM-DD calendar date"
            ))
        })?;

        let time_window =
            parse_time_window(params.time_start.as_deref(), params.time_end.as_deref())?;

        let mesh_code = normalize(params.mesh_code.as_deref());
        if let Some(code) = &mesh_code {
            validate_mesh_code(code)?;
        }

        let region = params.region.map(BoundingBox::from_params).transpose()?;

        let limit = match params.limit {
            None => DEFAULT_LIMIT,
            Some(0) => return Err(ToolError::validation("limit must be a positive integer")),
            Some(n) if n as usize > MAX_LIMIT => {
                return Err(ToolError::validation(format!(
                    "limit must not exceed {MAX_LIMIT}"
                )));
            }
            Some(n) => n as usize,
        };

        let filter = Self {
            location_id: normalize(params.location_id.as_deref()),
            road_code: normalize(params.road_code.as_deref()),
            mesh_code,
            region,
            date,
            time_window,
            limit,
        };

        if !filter.has_location_filter() {
            return Err(ToolError::validation(
                "at least one location filter is required \
                 (location_id, road_code, mesh_code, or region)",
            ));
        }

        Ok(filter)
    }

    /// Whether the filter narrows the query to a location at all. An
    /// unrestricted query would be ambiguous and is rejected.
    pub fn has_location_filter(&self) -> bool {
        self.location_id.is_some()
            || self.road_code.is_some()
            || self.mesh_code.is_some()
            || self.region.is_some()
    }
}

/// Treat whitespace-only strings the same as absent arguments.
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_time_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<TimeWindow>, ToolError> {
    let start = normalize(start)
        .map(|raw| parse_time(&raw, "time_start"))
        .transpose()?;
    let end = normalize(end)
        .map(|raw| parse_time(&raw, "time_end"))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(ToolError::validation(
                "time_start must be strictly before time_end",
            ));
        }
    }

    Ok(match (start, end) {
        (None, None) => None,
        (start, end) => Some(TimeWindow { start, end }),
    })
}

fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, ToolError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ToolError::validation(format!("{field} '{raw}' must be formatted as HH:MM")))
}

fn validate_mesh_code(code: &str) -> Result<(), ToolError> {
    let digits_only = code.chars().all(|c| c.is_ascii_digit());
    if !digits_only || !(4..=11).contains(&code.len()) {
        return Err(ToolError::validation(format!(
            "mesh_code '{code}' must be a 4-11 digit grid square code"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> RegionParams {
        RegionParams {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    fn minimal_params() -> GetTrafficFlowParams {
        GetTrafficFlowParams {
            road_code: Some("R246".to_string()),
            date: Some("2024-04-01".to_string()),
            ..Default::default()
        }
    }

    fn expect_validation(params: &GetTrafficFlowParams) -> String {
        match QueryFilter::from_params(params) {
            Err(ToolError::Validation(reason)) => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_valid_request() {
        let filter = QueryFilter::from_params(&minimal_params()).unwrap();
        assert_eq!(filter.road_code.as_deref(), Some("R246"));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(filter.limit, DEFAULT_LIMIT);
        assert!(filter.time_window.is_none());
    }

    #[test]
    fn test_missing_date_is_rejected() {
        let params = GetTrafficFlowParams {
            road_code: Some("R246".to_string()),
            ..Default::default()
        };
        let reason = expect_validation(&params);
        assert!(reason.contains("date is required"), "got: {reason}");
    }

    #[test]
    fn test_unparseable_date_is_rejected() {
        let mut params = minimal_params();
        params.date = Some("01/04/2024".to_string());
        let reason = expect_validation(&params);
        assert!(reason.contains("YYYY-MM-DD"), "got: {reason}");
    }

    #[test]
    fn test_impossible_calendar_date_is_rejected() {
        let mut params = minimal_params();
        params.date = Some("2024-02-30".to_string());
        expect_validation(&params);
    }

    #[test]
    fn test_missing_all_location_filters_is_rejected() {
        let params = GetTrafficFlowParams {
            date: Some("2024-04-01".to_string()),
            ..Default::default()
        };
        let reason = expect_validation(&params);
        assert!(reason.contains("location filter"), "got: {reason}");
    }

    #[test]
    fn test_whitespace_only_filters_count_as_absent() {
        let params = GetTrafficFlowParams {
            location_id: Some("   ".to_string()),
            road_code: Some(String::new()),
            date: Some("2024-04-01".to_string()),
            ..Default::default()
        };
        expect_validation(&params);
    }

    #[test]
    fn test_region_alone_satisfies_location_requirement() {
        let params = GetTrafficFlowParams {
            region: Some(region(35.0, 139.0, 35.1, 139.1)),
            date: Some("2024-04-01".to_string()),
            ..Default::default()
        };
        let filter = QueryFilter::from_params(&params).unwrap();
        let bbox = filter.region.unwrap();
        assert_eq!(bbox.min_lat, 35.0);
        assert_eq!(bbox.max_lon, 139.1);
    }

    #[test]
    fn test_inverted_region_is_rejected() {
        let mut params = minimal_params();
        params.region = Some(region(35.2, 139.0, 35.1, 139.1));
        let reason = expect_validation(&params);
        assert!(reason.contains("minLat <= maxLat"), "got: {reason}");

        params.region = Some(region(35.0, 139.5, 35.1, 139.1));
        let reason = expect_validation(&params);
        assert!(reason.contains("minLon <= maxLon"), "got: {reason}");
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let mut params = minimal_params();
        params.region = Some(region(-91.0, 139.0, 35.1, 139.1));
        expect_validation(&params);

        params.region = Some(region(35.0, 139.0, 35.1, 181.0));
        expect_validation(&params);
    }

    #[test]
    fn test_degenerate_region_is_allowed() {
        // A single point is a valid (zero-area) rectangle.
        let mut params = minimal_params();
        params.region = Some(region(35.0, 139.0, 35.0, 139.0));
        assert!(QueryFilter::from_params(&params).is_ok());
    }

    #[test]
    fn test_time_window_start_after_end_is_rejected() {
        let mut params = minimal_params();
        params.time_start = Some("12:00".to_string());
        params.time_end = Some("09:00".to_string());
        let reason = expect_validation(&params);
        assert!(reason.contains("before time_end"), "got: {reason}");
    }

    #[test]
    fn test_time_window_start_equal_end_is_rejected() {
        let mut params = minimal_params();
        params.time_start = Some("09:00".to_string());
        params.time_end = Some("09:00".to_string());
        expect_validation(&params);
    }

    #[test]
    fn test_half_open_time_window_is_allowed() {
        let mut params = minimal_params();
        params.time_start = Some("07:30".to_string());
        let filter = QueryFilter::from_params(&params).unwrap();
        let window = filter.time_window.unwrap();
        assert_eq!(window.start, NaiveTime::from_hms_opt(7, 30, 0));
        assert!(window.end.is_none());
    }

    #[test]
    fn test_time_accepts_seconds() {
        let mut params = minimal_params();
        params.time_start = Some("07:30:15".to_string());
        params.time_end = Some("08:00".to_string());
        let window = QueryFilter::from_params(&params).unwrap().time_window.unwrap();
        assert_eq!(window.start, NaiveTime::from_hms_opt(7, 30, 15));
    }

    #[test]
    fn test_garbled_time_is_rejected() {
        let mut params = minimal_params();
        params.time_end = Some("quarter past nine".to_string());
        let reason = expect_validation(&params);
        assert!(reason.contains("time_end"), "got: {reason}");
    }

    #[test]
    fn test_limit_bounds() {
        let mut params = minimal_params();
        params.limit = Some(0);
        expect_validation(&params);

        params.limit = Some(1001);
        let reason = expect_validation(&params);
        assert!(reason.contains("1000"), "got: {reason}");

        params.limit = Some(1000);
        assert_eq!(QueryFilter::from_params(&params).unwrap().limit, 1000);
    }

    #[test]
    fn test_mesh_code_format() {
        let mut params = minimal_params();
        params.mesh_code = Some("5339".to_string());
        assert!(QueryFilter::from_params(&params).is_ok());

        params.mesh_code = Some("53393599".to_string());
        assert!(QueryFilter::from_params(&params).is_ok());

        params.mesh_code = Some("53x9".to_string());
        expect_validation(&params);

        params.mesh_code = Some("533".to_string());
        expect_validation(&params);
    }

    #[test]
    fn test_time_window_contains_is_inclusive() {
        let window = TimeWindow {
            start: NaiveTime::from_hms_opt(8, 0, 0),
            end: NaiveTime::from_hms_opt(9, 0, 0),
        };
        assert!(window.contains(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(8, 30, 0).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(7, 59, 59).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(9, 0, 1).unwrap()));
    }

    #[test]
    fn test_region_params_deserialize_camel_case() {
        let json = r#"{"minLat":35.0,"minLon":139.0,"maxLat":35.1,"maxLon":139.1}"#;
        let region: RegionParams = serde_json::from_str(json).unwrap();
        assert_eq!(region.min_lat, 35.0);
        assert_eq!(region.max_lon, 139.1);
    }
}
