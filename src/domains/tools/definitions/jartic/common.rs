//! Result rendering helpers for the traffic tool.
//!
//! Successful invocations carry a short text summary plus the full structured
//! payload; failures render as `<stable_code>: <message>` so clients can
//! match on the code without parsing prose.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::warn;

use crate::domains::tools::error::ToolError;

/// Render a tool failure as an MCP error result.
pub fn error_result(error: &ToolError) -> CallToolResult {
    warn!("Tool invocation failed: {}", error);
    CallToolResult::error(vec![Content::text(format!("{}: {}", error.code(), error))])
}

/// Render a success as a text summary plus structured content.
pub fn structured_result<T: Serialize>(summary: String, data: T) -> CallToolResult {
    match serde_json::to_value(&data) {
        Ok(structured) => CallToolResult {
            content: vec![Content::text(summary)],
            structured_content: Some(structured),
            is_error: Some(false),
            meta: None,
        },
        Err(e) => {
            warn!("Failed to serialize structured content: {}", e);
            // Fall back to text-only rather than failing the invocation.
            CallToolResult::success(vec![Content::text(summary)])
        }
    }
}
