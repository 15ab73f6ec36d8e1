//! gRPC service handling metadata dissemination RPCs from peer nodes.
//!
//! `update_leadership` applies pushed leadership batches into the local
//! metadata cache; `get_leadership` serves the snapshot a starting peer
//! pulls. Both apply paths are idempotent and term-ordered, so duplicated
//! or reordered delivery cannot regress the local view.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use autometrics::autometrics;
use tonic::Request;
use tonic::Response;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use crate::metrics::LEADERSHIP_UPDATES_APPLIED;
use crate::metrics::LEADERSHIP_UPDATES_STALE;
use crate::proto::metadata::metadata_dissemination_server::MetadataDissemination;
use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::GetLeadershipResponse;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::proto::metadata::UpdateLeadershipResponse;
use crate::MetadataCache;
use crate::API_SLO;

pub struct MetadataService {
    node_id: u32,
    cache: Arc<MetadataCache>,
    ready: Arc<AtomicBool>,
}

impl MetadataService {
    pub fn new(
        node_id: u32,
        cache: Arc<MetadataCache>,
        ready: Arc<AtomicBool>,
    ) -> Self {
        Self { node_id, cache, ready }
    }

    fn check_ready(
        &self,
        rpc: &str,
    ) -> std::result::Result<(), Status> {
        if !self.ready.load(Ordering::Acquire) {
            warn!("[rpc|{}] Node-{} is not ready!", rpc, self.node_id);
            return Err(Status::unavailable("Service is not ready"));
        }
        Ok(())
    }
}

#[tonic::async_trait]
impl MetadataDissemination for MetadataService {
    /// Applies a pushed batch of leadership facts.
    ///
    /// Stale facts (term equal or lower than the recorded one) are silently
    /// discarded; they are not an error, so the batch still acknowledges
    /// with success.
    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn update_leadership(
        &self,
        request: Request<UpdateLeadershipRequest>,
    ) -> std::result::Result<Response<UpdateLeadershipResponse>, Status> {
        self.check_ready("update_leadership")?;

        let batch = request.into_inner().leaders;
        let mut applied = 0usize;
        let mut stale = 0usize;
        for update in &batch {
            if update.ntp.is_none() {
                warn!(node_id = self.node_id, "Skipping leadership fact without a partition id");
                continue;
            }
            if self.cache.apply_update(update) {
                applied += 1;
                LEADERSHIP_UPDATES_APPLIED.inc();
            } else {
                stale += 1;
                LEADERSHIP_UPDATES_STALE.inc();
            }
        }
        debug!(
            node_id = self.node_id,
            batch = batch.len(),
            applied,
            stale,
            "Applied leadership update batch"
        );

        Ok(Response::new(UpdateLeadershipResponse { success: true }))
    }

    /// Serves the leadership snapshot used by a bootstrapping peer.
    #[cfg_attr(not(doc), autometrics(objective = API_SLO))]
    async fn get_leadership(
        &self,
        request: Request<GetLeadershipRequest>,
    ) -> std::result::Result<Response<GetLeadershipResponse>, Status> {
        self.check_ready("get_leadership")?;

        let filter = request.into_inner().filter;
        let leaders = self.cache.snapshot(&filter);
        debug!(node_id = self.node_id, entries = leaders.len(), "Serving leadership snapshot");

        Ok(Response::new(GetLeadershipResponse { success: true, leaders }))
    }
}
