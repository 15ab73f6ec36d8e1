//! Startup metadata pull.
//!
//! A node that just joined or restarted knows nothing about leadership
//! until the push protocol happens to reach it. To close that gap it walks
//! a candidate list of cluster members, strictly in order with the
//! configured seeds first, and asks each for a full leadership snapshot.
//! Exactly one pull is outstanding at a time; a failed candidate costs one
//! exponential-backoff delay before the next one is tried.

use std::time::Duration;

use tokio::time::sleep;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::metrics::BOOTSTRAP_ATTEMPTS;
use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::GetLeadershipResponse;
use crate::utils::backoff::ExpBackoff;
use crate::BackoffPolicy;
use crate::DisseminationError;
use crate::MetadataCache;
use crate::MetadataTransport;
use crate::NetworkError;
use crate::Result;

/// Tracks the progress of requesting a leadership snapshot when the node
/// starts. When a candidate fails, the next one in the list is tried.
pub(crate) struct RequestRetryMeta {
    candidates: Vec<u32>,
    next: usize,
    pub(crate) success: bool,
    backoff: ExpBackoff,
}

impl RequestRetryMeta {
    pub(crate) fn new(
        candidates: Vec<u32>,
        policy: &BackoffPolicy,
    ) -> Self {
        Self {
            candidates,
            next: 0,
            success: false,
            backoff: ExpBackoff::from_policy(policy),
        }
    }

    pub(crate) fn next_candidate(&mut self) -> Option<u32> {
        let candidate = self.candidates.get(self.next).copied();
        self.next += 1;
        candidate
    }

    pub(crate) fn has_more(&self) -> bool {
        self.next < self.candidates.len()
    }
}

/// Pulls a leadership snapshot from the first responsive candidate and
/// applies it into the local cache. Returns the id of the node that served
/// the snapshot.
pub(crate) async fn request_metadata_update<T>(
    transport: &T,
    cache: &MetadataCache,
    candidates: Vec<u32>,
    policy: BackoffPolicy,
    shutdown: &CancellationToken,
) -> Result<u32>
where
    T: MetadataTransport,
{
    let total = candidates.len();
    let mut meta = RequestRetryMeta::new(candidates, &policy);
    let op_timeout = Duration::from_millis(policy.timeout_ms);

    while !meta.success {
        let Some(candidate) = meta.next_candidate() else { break };
        if shutdown.is_cancelled() {
            return Err(DisseminationError::ShuttingDown.into());
        }

        BOOTSTRAP_ATTEMPTS.with_label_values(&[&candidate.to_string()]).inc();
        debug!(node_id = candidate, "Requesting leadership snapshot");

        match dispatch_get_metadata_update(transport, candidate, op_timeout).await {
            Ok(reply) if reply.success => {
                let mut applied = 0usize;
                for leader in &reply.leaders {
                    if cache.apply_update(leader) {
                        applied += 1;
                    }
                }
                debug!(
                    node_id = candidate,
                    entries = reply.leaders.len(),
                    applied,
                    "Leadership snapshot applied"
                );
                meta.success = true;
                return Ok(candidate);
            }
            // A partial/error reply counts the same as a transport failure.
            Ok(_) => warn!(node_id = candidate, "Leadership snapshot request rejected"),
            Err(e) => warn!(node_id = candidate, "Leadership snapshot request failed: {}", e),
        }

        if meta.has_more() {
            let delay = meta.backoff.next_delay();
            debug!(?delay, "Backing off before next bootstrap candidate");
            tokio::select! {
                _ = shutdown.cancelled() => return Err(DisseminationError::ShuttingDown.into()),
                _ = sleep(delay) => {}
            }
        }
    }

    Err(DisseminationError::BootstrapExhausted { attempted: total }.into())
}

async fn dispatch_get_metadata_update<T>(
    transport: &T,
    candidate: u32,
    op_timeout: Duration,
) -> Result<GetLeadershipResponse>
where
    T: MetadataTransport,
{
    match timeout(op_timeout, transport.get_leadership(candidate, GetLeadershipRequest::default())).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::Timeout {
            node_id: candidate,
            duration: op_timeout,
        }
        .into()),
    }
}
