//! Boundary to the consensus layer.
//!
//! Raft instances hosted on this node report every leadership transition of
//! their partition here. Interested components take an explicit registration
//! handle and release it at shutdown; there is no implicit global listener
//! list.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

use crate::constants::LEADERSHIP_EVENT_BUFFER;
use crate::proto::metadata::Ntp;

/// A single leadership transition reported by the consensus layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadershipChange {
    pub ntp: Ntp,
    pub term: u64,
    /// `None` when the partition lost its leader.
    pub leader_id: Option<u32>,
}

/// Proof of a live subscription. Release it with
/// [`LeadershipMonitor::unregister`] before tearing the subscriber down.
#[derive(Debug)]
pub struct NotificationHandle(u64);

#[derive(Debug, Default)]
pub struct LeadershipMonitor {
    next_handle: AtomicU64,
    subscribers: DashMap<u64, mpsc::Sender<LeadershipChange>>,
}

impl LeadershipMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> (NotificationHandle, mpsc::Receiver<LeadershipChange>) {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(LEADERSHIP_EVENT_BUFFER);
        self.subscribers.insert(id, tx);
        debug!(handle = id, "Registered leadership subscriber");
        (NotificationHandle(id), rx)
    }

    pub fn unregister(
        &self,
        handle: &NotificationHandle,
    ) {
        if self.subscribers.remove(&handle.0).is_none() {
            warn!(handle = handle.0, "Unregistering unknown leadership subscriber");
        } else {
            debug!(handle = handle.0, "Unregistered leadership subscriber");
        }
    }

    /// Fans a leadership change out to every live subscriber. Closed
    /// subscribers are pruned.
    pub async fn notify(
        &self,
        change: LeadershipChange,
    ) {
        // Senders are cloned out first: a DashMap guard must not be held
        // across an await point.
        let subscribers: Vec<(u64, mpsc::Sender<LeadershipChange>)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let results = join_all(subscribers.into_iter().map(|(id, tx)| {
            let change = change.clone();
            async move { (id, tx.send(change).await) }
        }))
        .await;

        for (id, result) in results {
            if result.is_err() {
                warn!(handle = id, "Dropping closed leadership subscriber");
                self.subscribers.remove(&id);
            }
        }
    }

    pub async fn notify_leadership_change(
        &self,
        ntp: Ntp,
        term: u64,
        leader_id: Option<u32>,
    ) {
        self.notify(LeadershipChange { ntp, term, leader_id }).await;
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
