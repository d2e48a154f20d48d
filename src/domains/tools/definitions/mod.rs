//! Tool definitions module.
//!
//! This module exports all available tool definitions. Each tool area lives
//! in its own directory; this server exposes exactly one tool.

pub mod jartic;

pub use jartic::{GetTrafficFlowParams, GetTrafficFlowTool, TrafficFlowResult, TrafficRecord};
