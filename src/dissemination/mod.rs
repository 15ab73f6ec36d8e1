//! Leadership metadata dissemination engine.
//!
//! A raft group only tells its own replicas who the leader is. Every other
//! node in the cluster still has to route client requests, so leadership
//! facts are pushed to them here: consensus notifications are folded into a
//! per-destination ledger and flushed as one batch per node on a fixed
//! timer, with failed destinations retried verbatim on the next tick. The
//! inverse path runs once at startup, when a fresh node pulls a full
//! leadership snapshot from an existing cluster member before the push
//! protocol has had a chance to reach it.
//!
//! The engine is replicated into independent shard instances, each owning a
//! non-overlapping slice of partitions; the only cross-shard communication
//! is the explicit message routing done by [`DisseminationShardPool`].

mod bootstrap;
mod disseminator;
mod pending_updates;
mod shards;

pub use disseminator::*;
pub use shards::*;
