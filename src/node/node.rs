//! The per-process host of the dissemination engine.
//!
//! ## Key Responsibilities
//! - Bridges the local consensus layer into the dissemination shard pool
//! - Maintains node readiness state gating the RPC surface
//! - Applies membership changes, the only eviction signal for pending state
//! - Coordinates orderly shutdown of timers, tasks and in-flight RPCs

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::proto::metadata::NodeMeta;
use crate::proto::metadata::Ntp;
use crate::ClusterMembership;
use crate::DisseminationShardPool;
use crate::LeadershipMonitor;
use crate::MetadataCache;
use crate::MetadataTransport;
use crate::Result;
use crate::Settings;

pub struct Node<T>
where
    T: MetadataTransport,
{
    pub(crate) node_id: u32,
    pub(crate) settings: Arc<Settings>,
    pub(crate) cache: Arc<MetadataCache>,
    pub(crate) membership: Arc<ClusterMembership>,
    pub(crate) monitor: Arc<LeadershipMonitor>,
    pub(crate) transport: Arc<T>,
    pub(crate) shards: DisseminationShardPool<T>,
    pub(crate) ready: Arc<AtomicBool>,
    pub(crate) shutdown_signal: watch::Receiver<()>,
}

impl<T> Node<T>
where
    T: MetadataTransport,
{
    /// Marks the node ready and parks until the shutdown signal fires, then
    /// tears the dissemination pool down in order: timers first, then an
    /// orderly wait for in-flight work.
    pub async fn run(&self) -> Result<()> {
        self.set_ready(true);
        info!(node_id = self.node_id, "Metadata dissemination node started");

        let mut shutdown = self.shutdown_signal.clone();
        let _ = shutdown.changed().await;
        info!(node_id = self.node_id, "Shutdown signal received");

        self.shards.stop().await;
        self.set_ready(false);
        Ok(())
    }

    /// Entry point for the local consensus layer: report a leadership
    /// transition of a locally hosted partition replica.
    pub async fn disseminate_leadership(
        &self,
        ntp: Ntp,
        term: u64,
        leader_id: Option<u32>,
    ) {
        self.monitor.notify_leadership_change(ntp, term, leader_id).await;
    }

    /// A broker left the cluster: drop it from the broker table, every
    /// shard's pending ledger and the connection cache.
    pub fn handle_node_decommissioned(
        &self,
        node_id: u32,
    ) -> Result<()> {
        self.membership.remove_node(node_id)?;
        self.shards.evict_node(node_id);
        self.transport.evict(node_id);
        Ok(())
    }

    /// A broker joined the cluster and becomes a dissemination destination.
    pub fn handle_node_added(
        &self,
        meta: NodeMeta,
    ) {
        self.membership.add_node(meta);
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub fn membership(&self) -> &Arc<ClusterMembership> {
        &self.membership
    }

    pub fn monitor(&self) -> &Arc<LeadershipMonitor> {
        &self.monitor
    }

    pub fn set_ready(
        &self,
        is_ready: bool,
    ) {
        self.ready.store(is_ready, Ordering::SeqCst);
    }

    pub fn server_is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
