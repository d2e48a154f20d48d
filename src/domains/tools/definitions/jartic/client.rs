//! HTTP client for the JARTIC open traffic API.
//!
//! One [`JarticClient`] wraps a shared [`reqwest::Client`] (a connection pool
//! that is safe for concurrent use) together with the configured base URL,
//! request timeout, and User-Agent. Instances are cheap to clone and carry no
//! process-global state, so independent configurations (for example under
//! test) can coexist.
//!
//! The client never retries. Every failure is mapped onto the
//! [`ToolError`] taxonomy and surfaced to the caller, which owns the retry
//! decision.

use std::time::Duration;

use reqwest::header;
use tracing::debug;

use super::query::UpstreamQuery;
use crate::core::config::UpstreamConfig;
use crate::domains::tools::error::ToolError;

/// Longest slice of an upstream error body quoted in an error message.
const ERROR_SNIPPET_LEN: usize = 200;

/// Client for the upstream traffic-volume service.
#[derive(Debug, Clone)]
pub struct JarticClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl JarticClient {
    /// Create a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Issue one GET against the traffic-flow endpoint and return the raw
    /// response body.
    ///
    /// The request carries a per-request timeout; on expiry the pending call
    /// is cancelled and the invocation fails with
    /// [`ToolError::UpstreamUnavailable`]. A non-success status maps to
    /// [`ToolError::UpstreamRequest`] with the status code and a snippet of
    /// the upstream body.
    pub async fn fetch_flow(&self, query: &UpstreamQuery) -> Result<String, ToolError> {
        let url = query.url(&self.base_url);
        debug!("Requesting upstream traffic data: GET {}", url);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Upstream answered HTTP {}", status);
            return Err(ToolError::upstream_request(status.as_u16(), snippet(&body)));
        }

        // A body that cannot be read means the exchange never completed.
        response.text().await.map_err(ToolError::from)
    }
}

/// Trim an upstream body down to something that fits in an error message.
fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }
    let mut snippet: String = trimmed.chars().take(ERROR_SNIPPET_LEN).collect();
    if trimmed.chars().count() > ERROR_SNIPPET_LEN {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::jartic::params::{GetTrafficFlowParams, QueryFilter};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config(base_url: String) -> UpstreamConfig {
        UpstreamConfig {
            base_url,
            timeout_secs: 1,
            user_agent: "test-agent/0.0".to_string(),
        }
    }

    fn sample_query() -> UpstreamQuery {
        let params = GetTrafficFlowParams {
            road_code: Some("R246".to_string()),
            date: Some("2024-04-01".to_string()),
            ..Default::default()
        };
        UpstreamQuery::from_filter(&QueryFilter::from_params(&params).unwrap())
    }

    /// Serve one canned HTTP response per connection, after an optional delay.
    async fn stub_upstream(
        status_line: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    read_request_head(&mut stream).await;
                    tokio::time::sleep(delay).await;
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });
        format!("http://{addr}")
    }

    async fn read_request_head(stream: &mut tokio::net::TcpStream) -> String {
        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&head).to_string()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_success() {
        let base = stub_upstream("200 OK", r#"{"features":[]}"#, Duration::ZERO).await;
        let client = JarticClient::new(&test_config(base));
        let body = client.fetch_flow(&sample_query()).await.unwrap();
        assert_eq!(body, r#"{"features":[]}"#);
    }

    #[tokio::test]
    async fn test_request_targets_flow_endpoint_with_query() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let head = read_request_head(&mut stream).await;
            let _ = tx.send(head);
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                .await;
        });

        let client = JarticClient::new(&test_config(format!("http://{addr}")));
        client.fetch_flow(&sample_query()).await.unwrap();

        let head = rx.await.unwrap();
        assert!(
            head.starts_with("GET /traffic/flow?road_code=R246&date=2024-04-01&limit=100"),
            "got request head: {head}"
        );
        assert!(head.contains("user-agent: test-agent/0.0"), "got: {head}");
        assert!(head.contains("accept: application/json"), "got: {head}");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_upstream_request() {
        let base = stub_upstream("404 Not Found", r#"{"error":"no such layer"}"#, Duration::ZERO)
            .await;
        let client = JarticClient::new(&test_config(base));
        match client.fetch_flow(&sample_query()).await {
            Err(ToolError::UpstreamRequest { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("no such layer"), "got: {message}");
            }
            other => panic!("expected UpstreamRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_unavailable() {
        let base = stub_upstream("200 OK", "{}", Duration::from_secs(5)).await;
        let client = JarticClient::new(&test_config(base));

        let started = std::time::Instant::now();
        let result = client.fetch_flow(&sample_query()).await;
        let elapsed = started.elapsed();

        assert!(
            matches!(result, Err(ToolError::UpstreamUnavailable(_))),
            "expected UpstreamUnavailable, got {result:?}"
        );
        // Configured timeout is 1 s; generous slack for CI schedulers.
        assert!(elapsed < Duration::from_secs(4), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = JarticClient::new(&test_config(format!("http://{addr}")));
        let result = client.fetch_flow(&sample_query()).await;
        assert!(matches!(result, Err(ToolError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let long = "x".repeat(ERROR_SNIPPET_LEN + 50);
        let short = snippet(&long);
        assert_eq!(short.chars().count(), ERROR_SNIPPET_LEN + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_snippet_truncates_multibyte_bodies() {
        // Truncation counts characters, so a multibyte body must never be
        // cut mid-codepoint.
        let long = "混雑".repeat(ERROR_SNIPPET_LEN);
        let short = snippet(&long);
        assert_eq!(short.chars().count(), ERROR_SNIPPET_LEN + 3);
        assert!(short.ends_with("..."));
        assert!(short.starts_with("混雑"));
    }

    #[test]
    fn test_snippet_of_empty_body() {
        assert_eq!(snippet("   \n"), "(empty response body)");
    }
}
