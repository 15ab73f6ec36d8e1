use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::constants::SHARD_EVENT_BUFFER;
use crate::utils::util::ntp_hash;
use crate::ClusterMembership;
use crate::DisseminationConfig;
use crate::LeadershipChange;
use crate::LeadershipMonitor;
use crate::MetadataCache;
use crate::MetadataDisseminator;
use crate::MetadataTransport;
use crate::NotificationHandle;

struct ShardHandle<T>
where
    T: MetadataTransport,
{
    disseminator: Arc<MetadataDisseminator<T>>,
    events_tx: mpsc::Sender<LeadershipChange>,
}

/// N independent dissemination instances, each owning a non-overlapping
/// slice of partitions.
///
/// The pool holds the single consensus subscription and routes each change
/// to the owning shard by a stable hash of the partition id; that explicit
/// message passing is the only cross-shard communication. Shard 0 is the
/// coordinating instance and alone runs the startup bootstrap.
pub struct DisseminationShardPool<T>
where
    T: MetadataTransport,
{
    shards: Vec<ShardHandle<T>>,
    monitor: Arc<LeadershipMonitor>,
    subscription: Mutex<Option<NotificationHandle>>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl<T> DisseminationShardPool<T>
where
    T: MetadataTransport,
{
    /// Starts the configured number of shard instances plus the routing
    /// task. Must be called within a tokio runtime.
    pub fn start(
        self_id: u32,
        config: &DisseminationConfig,
        seed_ids: Vec<u32>,
        cache: Arc<MetadataCache>,
        membership: Arc<ClusterMembership>,
        transport: Arc<T>,
        monitor: Arc<LeadershipMonitor>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let tasks = TaskTracker::new();
        let (subscription, mut events) = monitor.register();

        let mut shards = Vec::with_capacity(config.shards);
        for shard_id in 0..config.shards {
            // Only the coordinating shard pulls the startup snapshot.
            let run_bootstrap = shard_id == 0;
            let (events_tx, events_rx) = mpsc::channel(SHARD_EVENT_BUFFER);
            let disseminator = Arc::new(MetadataDisseminator::new(
                self_id,
                config.clone(),
                if run_bootstrap { seed_ids.clone() } else { vec![] },
                run_bootstrap,
                Arc::clone(&cache),
                Arc::clone(&membership),
                Arc::clone(&transport),
                shutdown.clone(),
                tasks.clone(),
            ));

            let svc = Arc::clone(&disseminator);
            tasks.spawn(async move {
                if let Err(e) = svc.run(events_rx).await {
                    error!(shard_id, "Dissemination shard stopped with error: {:?}", e);
                }
            });

            shards.push(ShardHandle { disseminator, events_tx });
        }
        info!(node_id = self_id, shards = shards.len(), "Dissemination shard pool started");

        // Routing task: consumes the consensus subscription and forwards
        // each change to its owning shard.
        let routes: Vec<mpsc::Sender<LeadershipChange>> = shards.iter().map(|shard| shard.events_tx.clone()).collect();
        let router_shutdown = shutdown.clone();
        tasks.spawn(async move {
            loop {
                tokio::select! {
                    _ = router_shutdown.cancelled() => break,
                    maybe_change = events.recv() => {
                        let Some(change) = maybe_change else { break };
                        let index = Self::shard_index(&change, routes.len());
                        if routes[index].send(change).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Leadership routing task stopped");
        });

        Self {
            shards,
            monitor,
            subscription: Mutex::new(Some(subscription)),
            shutdown,
            tasks,
        }
    }

    pub(crate) fn shard_index(
        change: &LeadershipChange,
        shard_count: usize,
    ) -> usize {
        (ntp_hash(&change.ntp) % shard_count as u64) as usize
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Membership-change eviction fan-out: every shard drops its pending
    /// state for the node.
    pub fn evict_node(
        &self,
        node_id: u32,
    ) {
        for shard in &self.shards {
            shard.disseminator.handle_node_removed(node_id);
        }
    }

    pub fn pending_destination_count(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.disseminator.pending_destination_count())
            .sum()
    }

    /// Releases the consensus subscription, cancels the timers and in-flight
    /// RPCs, then waits for every task to unwind before returning.
    pub async fn stop(&self) {
        if let Some(handle) = self.subscription.lock().take() {
            self.monitor.unregister(&handle);
        }
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        info!("Dissemination shard pool stopped");
    }
}
