use serde::Deserialize;

use crate::Error;
use crate::Result;

/// Endpoint parameters applied to every peer gRPC connection.
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_ms: u64,

    /// TCP keepalive in seconds
    #[serde(default = "default_tcp_keepalive")]
    pub tcp_keepalive_in_secs: u64,

    /// HTTP2 keepalive ping interval in seconds
    #[serde(default = "default_h2_keepalive_interval")]
    pub http2_keep_alive_interval_in_secs: u64,

    /// HTTP2 keepalive ping timeout in seconds
    #[serde(default = "default_h2_keepalive_timeout")]
    pub http2_keep_alive_timeout_in_secs: u64,

    /// Initial HTTP2 connection-level flow control window in bytes
    #[serde(default = "default_connection_window_size")]
    pub initial_connection_window_size: u32,

    /// Initial HTTP2 stream-level flow control window in bytes
    #[serde(default = "default_stream_window_size")]
    pub initial_stream_window_size: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_in_ms: default_connect_timeout(),
            request_timeout_in_ms: default_request_timeout(),
            tcp_keepalive_in_secs: default_tcp_keepalive(),
            http2_keep_alive_interval_in_secs: default_h2_keepalive_interval(),
            http2_keep_alive_timeout_in_secs: default_h2_keepalive_timeout(),
            initial_connection_window_size: default_connection_window_size(),
            initial_stream_window_size: default_stream_window_size(),
        }
    }
}

impl NetworkConfig {
    /// Validates network configuration consistency
    /// # Errors
    /// Returns `Error::InvalidConfig` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_in_ms == 0 {
            return Err(Error::InvalidConfig("connect_timeout_in_ms cannot be 0".into()));
        }
        if self.request_timeout_in_ms == 0 {
            return Err(Error::InvalidConfig("request_timeout_in_ms cannot be 0".into()));
        }
        if self.http2_keep_alive_timeout_in_secs >= self.http2_keep_alive_interval_in_secs {
            return Err(Error::InvalidConfig(format!(
                "http2 keepalive timeout {}s must be < interval {}s",
                self.http2_keep_alive_timeout_in_secs, self.http2_keep_alive_interval_in_secs
            )));
        }
        if self.initial_stream_window_size > self.initial_connection_window_size {
            return Err(Error::InvalidConfig(format!(
                "stream window {} must not exceed connection window {}",
                self.initial_stream_window_size, self.initial_connection_window_size
            )));
        }
        Ok(())
    }
}

fn default_connect_timeout() -> u64 {
    200
}
fn default_request_timeout() -> u64 {
    1000
}
fn default_tcp_keepalive() -> u64 {
    3600
}
fn default_h2_keepalive_interval() -> u64 {
    300
}
fn default_h2_keepalive_timeout() -> u64 {
    20
}
fn default_connection_window_size() -> u32 {
    5 * 1024 * 1024
}
fn default_stream_window_size() -> u32 {
    2 * 1024 * 1024
}
