//! JARTIC Traffic MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server exposing road
//! traffic volume data from the JARTIC (Japan Road Traffic Information
//! Center) open traffic API as a single tool, `get_traffic_flow`.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, the main server
//!   handler, and transport layer abstractions
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: the `get_traffic_flow` pipeline (validation, upstream query
//!     construction, HTTP retrieval, response normalization, error surfacing)
//!
//! # Example
//!
//! ```rust,no_run
//! use jartic_traffic_mcp::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, McpServer, UpstreamConfig};
