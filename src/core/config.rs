//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.
//! There are no process-wide mutable settings: everything a component needs
//! is handed to it at construction, so independent instances (for example
//! under test) can run with independent configurations concurrently.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default base URL of the JARTIC open traffic API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://www.jartic-open-traffic.org/api/v1";

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Upstream traffic-data service configuration.
    pub upstream: UpstreamConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration of the upstream JARTIC API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the API, without a trailing endpoint path.
    pub base_url: String,

    /// Per-request timeout in seconds. A pending request is cancelled when
    /// it expires.
    pub timeout_secs: u64,

    /// User-Agent header sent with every upstream request.
    pub user_agent: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            user_agent: "JARTIC-MCP-Client/1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "JARTIC-TRAFFIC-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_JARTIC_BASE_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(base_url) = std::env::var("MCP_JARTIC_BASE_URL") {
            info!("Upstream base URL overridden: {}", base_url);
            config.upstream.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("MCP_JARTIC_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => config.upstream.timeout_secs = secs,
                _ => warn!(
                    "Ignoring MCP_JARTIC_TIMEOUT_SECS='{}' (expected a positive integer), \
                     keeping {} s",
                    timeout, config.upstream.timeout_secs
                ),
            }
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }
}
