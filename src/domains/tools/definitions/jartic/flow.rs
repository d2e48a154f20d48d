//! The `get_traffic_flow` tool.
//!
//! One invocation is one pass through the pipeline: validate the arguments,
//! build the upstream query, fetch (the only suspension point), parse, apply
//! the client-side time window, and assemble the result. Any stage failure
//! short-circuits into an MCP error result; nothing is retried and no
//! transport-level panic ever escapes. Invocations perform no writes, so the
//! whole pass is idempotent with respect to upstream state.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use tracing::{debug, info, instrument};

use crate::core::config::UpstreamConfig;
use crate::domains::tools::error::ToolError;

use super::client::JarticClient;
use super::common::{error_result, structured_result};
use super::model::TrafficFlowResult;
use super::params::{GetTrafficFlowParams, QueryFilter};
use super::parse::{apply_time_window, parse_features};
use super::query::UpstreamQuery;

/// Traffic flow query tool implementation.
#[derive(Debug, Clone)]
pub struct GetTrafficFlowTool;

impl GetTrafficFlowTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_traffic_flow";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get road traffic volume data from the JARTIC open traffic service for one \
         calendar date. Filter by observation point id, road code, grid square (mesh) \
         code, or a geographic bounding box, optionally narrowed to a time-of-day \
         window. Returns structured records (location, timestamp, vehicle count, \
         optional average speed and congestion level) plus a summary count and a \
         truncation flag.";

    /// Run the whole pipeline for one invocation.
    pub async fn run(
        client: &JarticClient,
        params: &GetTrafficFlowParams,
    ) -> Result<TrafficFlowResult, ToolError> {
        let filter = QueryFilter::from_params(params)?;
        debug!("Validated traffic query for {}", filter.date);

        let query = UpstreamQuery::from_filter(&filter);
        let body = client.fetch_flow(&query).await?;
        let batch = parse_features(&body)?;

        // The upstream match count can exceed what one response carries.
        let carried = batch.records.len() + batch.skipped;
        let upstream_truncated = batch
            .total_features
            .is_some_and(|total| total > carried as u64);

        let mut records = batch.records;
        if let Some(window) = &filter.time_window {
            records = apply_time_window(records, window);
        }

        let matched = records.len();
        records.truncate(filter.limit);
        let truncated = records.len() < matched || upstream_truncated;

        Ok(TrafficFlowResult {
            count: records.len(),
            records,
            truncated,
            skipped: batch.skipped,
        })
    }

    /// Execute the tool and render the outcome as an MCP result.
    #[instrument(skip_all, fields(date = ?params.date))]
    pub async fn execute(client: &JarticClient, params: &GetTrafficFlowParams) -> CallToolResult {
        match Self::run(client, params).await {
            Ok(result) => {
                let summary = summarize(&result);
                info!("{}", summary);
                structured_result(summary, result)
            }
            Err(error) => error_result(&error),
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTrafficFlowParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    ///
    /// One client (and its connection pool) is built per route and shared by
    /// every invocation dispatched through it.
    pub fn create_route<S>(upstream: &UpstreamConfig) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        let client = JarticClient::new(upstream);
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let client = client.clone();
            async move {
                let params: GetTrafficFlowParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&client, &params).await)
            }
            .boxed()
        })
    }
}

fn summarize(result: &TrafficFlowResult) -> String {
    let mut summary = format!("Found {} traffic record(s)", result.count);
    if result.truncated {
        summary.push_str(" (result truncated)");
    }
    if result.skipped > 0 {
        summary.push_str(&format!(
            ", skipped {} malformed upstream entr{}",
            result.skipped,
            if result.skipped == 1 { "y" } else { "ies" }
        ));
    }
    summary
}
