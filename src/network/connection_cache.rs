use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tracing::debug;
use tracing::trace;

use crate::NetworkConfig;
use crate::NetworkError;
use crate::Result;

/// Cached gRPC channel with metadata
#[derive(Clone)]
pub(crate) struct CachedChannel {
    pub(crate) channel: Channel,
    pub(crate) address: String,
    pub(crate) last_used: Instant,
}

/// Thread-safe connection cache manager
pub(crate) struct ConnectionCache {
    // node_id -> CachedChannel
    pub(crate) cache: DashMap<u32, CachedChannel>,
    config: NetworkConfig,
}

impl ConnectionCache {
    pub(crate) fn new(config: NetworkConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get or create a channel with caching and reconnection logic
    pub(crate) async fn get_channel(
        &self,
        node_id: u32,
        current_address: String,
    ) -> Result<Channel> {
        trace!("Current address: {}", current_address);

        // Fast path: check if valid channel exists
        if let Some(mut entry) = self.cache.get_mut(&node_id) {
            let cached = entry.value_mut();

            // Validate channel state and address
            if cached.address == current_address {
                // Update last used timestamp
                cached.last_used = Instant::now();
                return Ok(cached.channel.clone());
            }
        }

        // Slow path: create new channel and update cache
        debug!(node_id, "Establishing new gRPC connection");
        let channel = self.create_channel(current_address.clone()).await?;

        trace!(node_id, "Cache updated: address: {}", current_address);
        self.cache.insert(
            node_id,
            CachedChannel {
                channel: channel.clone(),
                address: current_address,
                last_used: Instant::now(),
            },
        );

        Ok(channel)
    }

    /// Create pre-configured endpoint
    async fn create_channel(
        &self,
        address: String,
    ) -> Result<Channel> {
        Endpoint::try_from(address)?
            .connect_timeout(Duration::from_millis(self.config.connect_timeout_in_ms))
            .timeout(Duration::from_millis(self.config.request_timeout_in_ms))
            .tcp_keepalive(Some(Duration::from_secs(self.config.tcp_keepalive_in_secs)))
            .http2_keep_alive_interval(Duration::from_secs(self.config.http2_keep_alive_interval_in_secs))
            .keep_alive_timeout(Duration::from_secs(self.config.http2_keep_alive_timeout_in_secs))
            .initial_connection_window_size(self.config.initial_connection_window_size)
            .initial_stream_window_size(self.config.initial_stream_window_size)
            .connect()
            .await
            .map_err(|e| NetworkError::ConnectError(e.to_string()).into())
    }

    /// Remove the cached connection for a node
    pub(crate) fn remove_node(
        &self,
        node_id: u32,
    ) {
        self.cache.retain(|id, _| *id != node_id);
    }
}
