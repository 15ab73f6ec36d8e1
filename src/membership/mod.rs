//! Broker table and partition placement registry.
//!
//! Tracks which nodes form the cluster and which of them replicate each
//! partition. The dissemination engine uses it to answer one question: for
//! a given partition, which cluster members can only learn about leadership
//! over the wire? Membership removal is also the eviction signal for
//! per-destination dissemination state.

mod cluster_membership;
pub use cluster_membership::*;

#[cfg(test)]
mod cluster_membership_test;
