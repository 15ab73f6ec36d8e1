//! A builder pattern implementation for constructing a [`Node`] instance.
//!
//! The [`NodeBuilder`] provides a fluent interface to configure and assemble
//! the components of the dissemination engine: metadata cache, membership,
//! consensus bridge, gRPC transport and the shard pool.
//!
//! ## Lifecycle Management
//! - `build()`: assembles the [`Node`] and starts the dissemination shard pool
//!   (bootstrap pull plus push timers).
//! - `start_metrics_server()`/`start_rpc_server()`: launches auxiliary servers.
//! - `ready()`: finalizes construction and returns the initialized [`Node`].
//!
//! ## Example
//! ```ignore
//! let (shutdown_tx, shutdown_rx) = watch::channel(());
//! let node = NodeBuilder::new(None, shutdown_rx)
//!     .build()
//!     .start_metrics_server(shutdown_tx.subscribe())
//!     .start_rpc_server()
//!     .ready()
//!     .unwrap();
//! node.run().await?;
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::watch;
use tonic::transport::Server;
use tracing::error;
use tracing::info;

use crate::grpc::MetadataService;
use crate::metrics;
use crate::proto::metadata::metadata_dissemination_server::MetadataDisseminationServer;
use crate::ClusterMembership;
use crate::DisseminationShardPool;
use crate::Error;
use crate::GrpcTransport;
use crate::LeadershipMonitor;
use crate::MetadataCache;
use crate::Node;
use crate::Result;
use crate::Settings;
use crate::SystemError;

pub struct NodeBuilder {
    pub(super) node_config: Settings,
    pub(super) shutdown_signal: watch::Receiver<()>,
    pub(super) cache: Option<Arc<MetadataCache>>,
    pub(super) membership: Option<Arc<ClusterMembership>>,
    pub(super) monitor: Option<Arc<LeadershipMonitor>>,

    pub(super) node: Option<Arc<Node<GrpcTransport>>>,
}

impl NodeBuilder {
    /// Creates a new NodeBuilder with configuration loaded from file
    ///
    /// # Arguments
    /// * `cluster_path` - Optional path to node-specific cluster configuration
    /// * `shutdown_signal` - Watch channel for graceful shutdown signaling
    ///
    /// # Panics
    /// Will panic if configuration loading fails
    pub fn new(
        cluster_path: Option<&str>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let node_config = Settings::load(cluster_path).expect("Load node_config successfully");
        Self::init(node_config, shutdown_signal)
    }

    /// Creates a NodeBuilder from an already loaded configuration
    pub fn init(
        node_config: Settings,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            node_config,
            shutdown_signal,
            cache: None,
            membership: None,
            monitor: None,
            node: None,
        }
    }

    /// Overrides the default metadata cache (shared with an embedding process)
    pub fn cache(
        mut self,
        cache: Arc<MetadataCache>,
    ) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Overrides the default membership registry
    pub fn membership(
        mut self,
        membership: Arc<ClusterMembership>,
    ) -> Self {
        self.membership = Some(membership);
        self
    }

    /// Overrides the default leadership monitor
    pub fn monitor(
        mut self,
        monitor: Arc<LeadershipMonitor>,
    ) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Assembles the node and starts the dissemination shard pool. Must run
    /// inside a tokio runtime.
    pub fn build(mut self) -> Self {
        let settings = Arc::new(self.node_config.clone());
        let node_id = settings.cluster.node_id;

        let cache = self.cache.take().unwrap_or_else(|| Arc::new(MetadataCache::new()));
        let membership = self
            .membership
            .take()
            .unwrap_or_else(|| Arc::new(ClusterMembership::new(node_id, settings.cluster.initial_cluster.clone())));
        let monitor = self.monitor.take().unwrap_or_else(|| Arc::new(LeadershipMonitor::new()));
        let transport = Arc::new(GrpcTransport::new(Arc::clone(&membership), settings.network.clone()));

        let shards = DisseminationShardPool::start(
            node_id,
            &settings.dissemination,
            settings.cluster.seed_nodes.clone(),
            Arc::clone(&cache),
            Arc::clone(&membership),
            Arc::clone(&transport),
            Arc::clone(&monitor),
        );

        self.node = Some(Arc::new(Node {
            node_id,
            settings,
            cache,
            membership,
            monitor,
            transport,
            shards,
            ready: Arc::new(AtomicBool::new(false)),
            shutdown_signal: self.shutdown_signal.clone(),
        }));
        self
    }

    /// Starts the prometheus metrics endpoint if monitoring is enabled
    pub fn start_metrics_server(
        self,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let monitoring = &self.node_config.monitoring;
        if monitoring.prometheus_enabled {
            let port = monitoring.prometheus_port;
            info!("Starting metrics server on port {}", port);
            tokio::spawn(metrics::start_server(port, shutdown_signal));
        } else {
            info!("Prometheus metrics server is disabled");
        }
        self
    }

    /// Starts the metadata dissemination gRPC server
    pub fn start_rpc_server(self) -> Self {
        let node = self.node.clone().expect("Node must be built before starting the RPC server");
        let addr = node.settings.cluster.listen_address;
        let service = MetadataService::new(node.node_id, Arc::clone(&node.cache), Arc::clone(&node.ready));
        let mut shutdown = self.shutdown_signal.clone();

        info!("Starting metadata RPC server at {}", addr);
        tokio::spawn(async move {
            if let Err(e) = Server::builder()
                .add_service(MetadataDisseminationServer::new(service))
                .serve_with_shutdown(addr, async move {
                    let _ = shutdown.changed().await;
                })
                .await
            {
                error!("RPC server failed: {:?}", e);
            }
        });
        self
    }

    /// Finalizes construction and returns the node
    pub fn ready(mut self) -> Result<Arc<Node<GrpcTransport>>> {
        self.node
            .take()
            .ok_or_else(|| Error::System(SystemError::NodeStartFailed("build() was not called".to_string())))
    }
}
