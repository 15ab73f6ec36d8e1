use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::bootstrap;
use super::pending_updates::PendingUpdates;
use crate::metrics::LEADERSHIP_BATCHES_FAILED;
use crate::metrics::LEADERSHIP_BATCHES_SENT;
use crate::proto::metadata::Ntp;
use crate::proto::metadata::NtpLeader;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::ClusterMembership;
use crate::DisseminationConfig;
use crate::DisseminationError;
use crate::LeadershipChange;
use crate::MetadataCache;
use crate::MetadataTransport;
use crate::Result;

/// One dissemination instance over its slice of local partitions.
///
/// Consensus notifications update the local cache immediately and queue a
/// copy of the fact for every cluster node that does not replicate the
/// partition. A fixed-cadence timer flushes the queue as one RPC batch per
/// destination; a failed destination keeps its batch and retries it, merged
/// with anything newer, on the next tick. Retries are unbounded because
/// stale metadata is self-healing once connectivity resumes.
pub struct MetadataDisseminator<T>
where
    T: MetadataTransport,
{
    self_id: u32,
    config: DisseminationConfig,
    /// Bootstrap candidates tried first, in order. Only the coordinating
    /// shard receives them.
    seed_ids: Vec<u32>,
    run_bootstrap: bool,
    cache: Arc<MetadataCache>,
    membership: Arc<ClusterMembership>,
    transport: Arc<T>,
    pending_updates: Arc<PendingUpdates>,
    // Destinations with a batch currently on the wire; they are skipped by
    // the tick that finds them here.
    in_flight: Arc<DashSet<u32>>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl<T> MetadataDisseminator<T>
where
    T: MetadataTransport,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        self_id: u32,
        config: DisseminationConfig,
        seed_ids: Vec<u32>,
        run_bootstrap: bool,
        cache: Arc<MetadataCache>,
        membership: Arc<ClusterMembership>,
        transport: Arc<T>,
        shutdown: CancellationToken,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            self_id,
            config,
            seed_ids,
            run_bootstrap,
            cache,
            membership,
            transport,
            pending_updates: Arc::new(PendingUpdates::new()),
            in_flight: Arc::new(DashSet::new()),
            shutdown,
            tasks,
        }
    }

    /// Drives this instance until shutdown: startup bootstrap (coordinating
    /// shard only), consensus notifications and the dissemination timer
    /// interleave as cooperative tasks.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<LeadershipChange>,
    ) -> Result<()> {
        if self.run_bootstrap {
            let svc = Arc::clone(&self);
            self.tasks.spawn(async move {
                svc.initialize_leadership_metadata().await;
            });
        }

        let mut timer = tokio::time::interval(Duration::from_millis(self.config.interval_ms));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!(node_id = self.self_id, "Dissemination loop stopped");
                    return Ok(());
                }
                _ = timer.tick() => {
                    self.dispatch_disseminate_leadership();
                }
                maybe_change = events.recv() => {
                    match maybe_change {
                        Some(change) => self.handle_leadership_notification(&change),
                        None => {
                            warn!(node_id = self.self_id, "Leadership subscription closed, stopping dissemination loop");
                            return Err(DisseminationError::SubscriptionClosed.into());
                        }
                    }
                }
            }
        }
    }

    /// Consensus reported a leadership transition for a locally hosted
    /// partition replica. Purely local bookkeeping, no network I/O.
    pub fn handle_leadership_notification(
        &self,
        change: &LeadershipChange,
    ) {
        // Local knowledge is immediate
        self.cache.apply(change.ntp.clone(), change.term, change.leader_id);

        let destinations = self.destinations_for(&change.ntp);
        if destinations.is_empty() {
            trace!(ntp = %change.ntp, "Every cluster node replicates this partition, nothing to disseminate");
            return;
        }

        let fact = NtpLeader::new(change.ntp.clone(), change.term, change.leader_id);
        self.pending_updates.record_for_all(&destinations, &fact);
        debug!(
            ntp = %change.ntp,
            term = change.term,
            leader_id = ?change.leader_id,
            ?destinations,
            "Queued leadership fact"
        );
    }

    /// Cluster members that can only learn about this partition over the
    /// wire: everyone except its replicas and this node.
    fn destinations_for(
        &self,
        ntp: &Ntp,
    ) -> Vec<u32> {
        let replicas = self.membership.replicas_of(ntp);
        let mut destinations: Vec<u32> = self
            .membership
            .node_ids()
            .into_iter()
            .filter(|id| *id != self.self_id && !replicas.contains(id))
            .collect();
        destinations.sort_unstable();
        destinations
    }

    /// One dissemination round: snapshot the ledger, dispatch one batch per
    /// destination in parallel, then reclaim entries delivered earlier.
    pub fn dispatch_disseminate_leadership(&self) {
        let pending = self.pending_updates.collect();
        for (destination, updates) in pending {
            if !self.in_flight.insert(destination) {
                debug!(node_id = destination, "Previous batch still in flight, skipping");
                continue;
            }
            let transport = Arc::clone(&self.transport);
            let pending_updates = Arc::clone(&self.pending_updates);
            let in_flight = Arc::clone(&self.in_flight);
            let shutdown = self.shutdown.clone();
            self.tasks.spawn(async move {
                if let Err(e) = Self::dispatch_one_update(transport, pending_updates, shutdown, destination, updates).await {
                    warn!(node_id = destination, "Leadership update not delivered: {}", e);
                    LEADERSHIP_BATCHES_FAILED
                        .with_label_values(&[&destination.to_string()])
                        .inc();
                }
                in_flight.remove(&destination);
            });
        }
        self.pending_updates.cleanup();
    }

    async fn dispatch_one_update(
        transport: Arc<T>,
        pending_updates: Arc<PendingUpdates>,
        shutdown: CancellationToken,
        destination: u32,
        updates: Vec<NtpLeader>,
    ) -> Result<()> {
        let batch_size = updates.len();
        let request = UpdateLeadershipRequest { leaders: updates };
        let response = tokio::select! {
            _ = shutdown.cancelled() => return Err(DisseminationError::ShuttingDown.into()),
            result = transport.update_leadership(destination, request) => result?,
        };
        if !response.success {
            return Err(DisseminationError::UpdateRejected { node_id: destination }.into());
        }
        pending_updates.mark_delivered(destination, batch_size);
        LEADERSHIP_BATCHES_SENT
            .with_label_values(&[&destination.to_string()])
            .inc();
        trace!(node_id = destination, batch = batch_size, "Leadership batch delivered");
        Ok(())
    }

    /// Startup pull of the full leadership snapshot. Exhaustion is a
    /// degraded start, not a failure: the push protocol catches up lazily.
    async fn initialize_leadership_metadata(&self) {
        let candidates = self.bootstrap_candidates();
        if candidates.is_empty() {
            debug!(node_id = self.self_id, "No bootstrap candidates, starting with an empty leadership view");
            return;
        }
        match bootstrap::request_metadata_update(
            self.transport.as_ref(),
            self.cache.as_ref(),
            candidates,
            self.config.bootstrap,
            &self.shutdown,
        )
        .await
        {
            Ok(node_id) => {
                info!(node_id, entries = self.cache.len(), "Leadership metadata bootstrap complete");
            }
            Err(e) => warn!(node_id = self.self_id, "Degraded start: {}", e),
        }
    }

    /// Seeds first, then every other known peer in stable order.
    fn bootstrap_candidates(&self) -> Vec<u32> {
        let mut candidates = self.seed_ids.clone();
        let mut peers = self.membership.peer_ids();
        peers.sort_unstable();
        for id in peers {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }
        candidates
    }

    /// Membership-change eviction: a decommissioned destination must not
    /// keep accumulating pending facts.
    pub fn handle_node_removed(
        &self,
        node_id: u32,
    ) {
        self.pending_updates.remove(node_id);
    }

    pub fn pending_destination_count(&self) -> usize {
        self.pending_updates.destination_count()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &PendingUpdates {
        &self.pending_updates
    }
}
