use dashmap::DashMap;
use dashmap::DashSet;
use parking_lot::Mutex;
use tonic::async_trait;

use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::GetLeadershipResponse;
use crate::proto::metadata::NtpLeader;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::proto::metadata::UpdateLeadershipResponse;
use crate::MetadataTransport;
use crate::NetworkError;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Update { target: u32, leaders: Vec<NtpLeader> },
    Pull { target: u32 },
}

/// Hand-rolled transport fake recording every call in order, with
/// programmable per-target failures. Complements the generated
/// `MockMetadataTransport` where call ordering matters.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    update_failures: DashMap<u32, usize>,
    pull_failures: DashMap<u32, usize>,
    reject_targets: DashSet<u32>,
    reject_pull_targets: DashSet<u32>,
    hang_pull_targets: DashSet<u32>,
    snapshot: Mutex<Vec<NtpLeader>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `times` update batches to `target` fail with a connect error.
    pub fn fail_updates(
        &self,
        target: u32,
        times: usize,
    ) {
        self.update_failures.insert(target, times);
    }

    /// The next `times` snapshot pulls from `target` fail with a connect error.
    pub fn fail_pulls(
        &self,
        target: u32,
        times: usize,
    ) {
        self.pull_failures.insert(target, times);
    }

    /// Update batches to `target` are acknowledged with `success == false`.
    pub fn reject_updates(
        &self,
        target: u32,
    ) {
        self.reject_targets.insert(target);
    }

    /// Snapshot pulls from `target` are acknowledged with `success == false`.
    pub fn reject_pulls(
        &self,
        target: u32,
    ) {
        self.reject_pull_targets.insert(target);
    }

    /// Snapshot pulls from `target` never complete (callers rely on their
    /// own timeout).
    pub fn hang_pulls(
        &self,
        target: u32,
    ) {
        self.hang_pull_targets.insert(target);
    }

    /// Snapshot served on a successful pull.
    pub fn set_snapshot(
        &self,
        leaders: Vec<NtpLeader>,
    ) {
        *self.snapshot.lock() = leaders;
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    /// Pull targets in call order.
    pub fn pull_targets(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                TransportCall::Pull { target } => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// Update targets in call order (duplicates preserved).
    pub fn update_targets(&self) -> Vec<u32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                TransportCall::Update { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// All facts attempted towards one target, flattened across batches.
    pub fn updates_sent_to(
        &self,
        target: u32,
    ) -> Vec<NtpLeader> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                TransportCall::Update { target: t, leaders } if *t == target => Some(leaders.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn take_failure(
        failures: &DashMap<u32, usize>,
        target: u32,
    ) -> bool {
        if let Some(mut remaining) = failures.get_mut(&target) {
            if *remaining > 0 {
                *remaining -= 1;
                return true;
            }
        }
        false
    }
}

#[async_trait]
impl MetadataTransport for RecordingTransport {
    async fn update_leadership(
        &self,
        target: u32,
        request: UpdateLeadershipRequest,
    ) -> Result<UpdateLeadershipResponse> {
        self.calls.lock().push(TransportCall::Update {
            target,
            leaders: request.leaders,
        });
        if Self::take_failure(&self.update_failures, target) {
            return Err(NetworkError::ConnectError("injected failure".to_string()).into());
        }
        Ok(UpdateLeadershipResponse {
            success: !self.reject_targets.contains(&target),
        })
    }

    async fn get_leadership(
        &self,
        target: u32,
        _request: GetLeadershipRequest,
    ) -> Result<GetLeadershipResponse> {
        self.calls.lock().push(TransportCall::Pull { target });
        if self.hang_pull_targets.contains(&target) {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            return Err(NetworkError::ConnectError("hung request".to_string()).into());
        }
        if Self::take_failure(&self.pull_failures, target) {
            return Err(NetworkError::ConnectError("injected failure".to_string()).into());
        }
        Ok(GetLeadershipResponse {
            success: !self.reject_pull_targets.contains(&target),
            leaders: self.snapshot.lock().clone(),
        })
    }
}
