use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::EnrichError;

/// Intake server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Server bind address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Inbound request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Enable permissive CORS for the webhook endpoint.
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log filter (tracing `EnvFilter` syntax).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl IntakeConfig {
    /// Load configuration from environment variables (`BIND_ADDR`, `PORT`,
    /// `TIMEOUT_SECS`, `ENABLE_CORS`, `LOG_LEVEL`).
    pub fn load() -> Result<Self, EnrichError> {
        config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|err| EnrichError::Config(err.to_string()))
    }

    /// The socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr, EnrichError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|err| EnrichError::Config(format!("invalid bind address: {err}")))
    }

    /// Inbound request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
