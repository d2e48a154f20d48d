//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to perform
//! specific actions or computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one area per directory)
//! - `router.rs` - Dynamic ToolRouter builder for STDIO/TCP transport
//! - `error.rs` - Tool-specific error taxonomy
//!
//! ## Adding a New Tool
//!
//! 1. Create a new area under `definitions/` with params, `execute()`, and
//!    `create_route()`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its route in `router.rs` using `with_route()`
//!
//! **No need to modify `server.rs`!** The router is built dynamically.

pub mod definitions;
mod error;
pub mod router;

pub use error::ToolError;
pub use router::build_tool_router;
