//! gRPC listener configuration.

use crate::{env_flag, env_or_default, env_parse, ConfigError, FromEnv};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_PORT: u16 = 50051;
const DEFAULT_MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration for the gRPC server.
#[derive(Clone, Debug)]
pub struct GrpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Zstd accept/send on every service
    pub enable_compression: bool,
    pub max_message_size: usize,
    /// Server-side deadline; the client's `grpc-timeout` still applies when shorter
    pub request_timeout: Duration,
}

impl GrpcServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::ParseError {
                key: "GRPC_HOST".to_string(),
                details: format!("{} ({})", e, self.address()),
            })
    }
}

impl FromEnv for GrpcServerConfig {
    /// Reads:
    /// - `GRPC_HOST` (default: 0.0.0.0)
    /// - `GRPC_PORT` (default: 50051)
    /// - `GRPC_COMPRESSION` (default: true)
    /// - `GRPC_MAX_MESSAGE_SIZE` (default: 8MB)
    /// - `GRPC_REQUEST_TIMEOUT_SECS` (default: 60)
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("GRPC_HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse("GRPC_PORT", DEFAULT_PORT)?;
        let enable_compression = env_flag("GRPC_COMPRESSION", true);
        let max_message_size = env_parse("GRPC_MAX_MESSAGE_SIZE", DEFAULT_MAX_MESSAGE_SIZE)?;
        let timeout_secs = env_parse("GRPC_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            host,
            port,
            enable_compression,
            max_message_size,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: DEFAULT_PORT,
            enable_compression: true,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
