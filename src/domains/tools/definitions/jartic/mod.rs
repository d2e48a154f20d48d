//! JARTIC traffic tool module.
//!
//! Implements the `get_traffic_flow` pipeline against the JARTIC (Japan Road
//! Traffic Information Center) open traffic-volume API, one stage per file:
//! - `params`: raw tool arguments, validated into an immutable `QueryFilter`
//! - `query`: pure mapping from a filter to the upstream request
//! - `client`: async HTTP client with a bounded timeout and no retries
//! - `parse`: upstream FeatureCollection into normalized traffic records
//! - `model`: the structured output types
//! - `flow`: the tool itself, wiring the stages together
//! - `common`: shared result rendering

pub mod client;
pub mod common;
pub mod flow;
pub mod model;
pub mod params;
pub mod parse;
pub mod query;

pub use client::JarticClient;
pub use flow::GetTrafficFlowTool;
pub use model::{TrafficFlowResult, TrafficRecord};
pub use params::{GetTrafficFlowParams, QueryFilter};
