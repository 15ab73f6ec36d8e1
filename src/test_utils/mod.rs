//! Shared fixtures and fakes for unit tests.

mod recording_transport;
pub use recording_transport::*;

use std::collections::HashSet;
use std::sync::Arc;

use crate::proto::metadata::NodeMeta;
use crate::proto::metadata::Ntp;
use crate::proto::metadata::NtpLeader;
use crate::ClusterMembership;

pub fn node_meta(id: u32) -> NodeMeta {
    NodeMeta {
        id,
        ip: "127.0.0.1".to_string(),
        port: 9080 + id,
    }
}

/// Membership of nodes `1..=size` with `self_id` as the local node.
pub fn test_membership(
    self_id: u32,
    size: u32,
) -> Arc<ClusterMembership> {
    Arc::new(ClusterMembership::new(self_id, (1..=size).map(node_meta).collect()))
}

pub fn test_ntp(
    topic: &str,
    partition: i32,
) -> Ntp {
    Ntp::new("kafka", topic, partition)
}

pub fn test_fact(
    topic: &str,
    partition: i32,
    term: u64,
    leader_id: Option<u32>,
) -> NtpLeader {
    NtpLeader::new(test_ntp(topic, partition), term, leader_id)
}

pub fn replica_set(ids: &[u32]) -> HashSet<u32> {
    ids.iter().copied().collect()
}
