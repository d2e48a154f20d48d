//! Tool-specific error types.
//!
//! Every failure a tool invocation can hit is mapped onto one of the
//! variants below before it reaches the MCP client, so callers always see
//! a stable error code plus a human-readable message instead of a broken
//! connection or a transport-level exception.

use thiserror::Error;

/// Errors that can occur while executing a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The caller-supplied arguments failed validation. The reason is
    /// returned to the caller verbatim. Never worth retrying unchanged.
    #[error("{0}")]
    Validation(String),

    /// The upstream service could not be reached (connect failure, DNS,
    /// or the bounded request timeout expired). The caller may retry.
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream service answered with a non-success HTTP status.
    #[error("upstream rejected the request (HTTP {status}): {message}")]
    UpstreamRequest { status: u16, message: String },

    /// The upstream response body did not match the expected schema.
    /// Retrying will not fix a format mismatch.
    #[error("upstream response violates the expected format: {0}")]
    UpstreamFormat(String),

    /// A failure that should not occur under normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new upstream-unavailable error.
    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Create a new upstream-request error from an HTTP status.
    pub fn upstream_request(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamRequest {
            status,
            message: message.into(),
        }
    }

    /// Create a new upstream-format error.
    pub fn upstream_format(msg: impl Into<String>) -> Self {
        Self::UpstreamFormat(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for this error kind. Clients can match
    /// on these without parsing the message text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::UpstreamRequest { .. } => "upstream_request_failed",
            Self::UpstreamFormat(_) => "upstream_format_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the *caller* may reasonably retry the invocation. Nothing is
    /// ever retried inside the server; this is guidance only.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable(_) => true,
            Self::UpstreamRequest { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::UpstreamUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::UpstreamFormat(err.to_string())
        } else {
            // Remaining reqwest failures (request build, redirect loops,
            // body streaming) all mean the exchange never completed.
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}
