use std::collections::HashMap;

use parking_lot::Mutex;

use crate::proto::metadata::NtpLeader;

/// Pending leadership facts for one destination.
///
/// `finished` is set once the current batch is confirmed delivered and no
/// newer fact arrived meanwhile; the entry is then reclaimed by the next
/// cleanup pass.
#[derive(Debug, Default, Clone)]
pub(crate) struct UpdateRetryMeta {
    pub(crate) updates: Vec<NtpLeader>,
    pub(crate) finished: bool,
}

/// Per-destination ledger of leadership facts awaiting delivery.
///
/// The lock is held only across map mutation, never across an RPC, so
/// consensus notifications are never stalled by a slow peer.
pub(crate) struct PendingUpdates {
    inner: Mutex<HashMap<u32, UpdateRetryMeta>>,
}

impl PendingUpdates {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Merges a fact into a destination's entry, creating it if absent. New
    /// work re-arms an entry that finished but was not yet cleaned up.
    pub(crate) fn record(
        &self,
        destination: u32,
        fact: NtpLeader,
    ) {
        let mut inner = self.inner.lock();
        let meta = inner.entry(destination).or_default();
        meta.updates.push(fact);
        meta.finished = false;
    }

    pub(crate) fn record_for_all(
        &self,
        destinations: &[u32],
        fact: &NtpLeader,
    ) {
        let mut inner = self.inner.lock();
        for destination in destinations {
            let meta = inner.entry(*destination).or_default();
            meta.updates.push(fact.clone());
            meta.finished = false;
        }
    }

    /// Snapshot of every unfinished entry. Entries stay in the ledger until
    /// their delivery is confirmed.
    pub(crate) fn collect(&self) -> HashMap<u32, Vec<NtpLeader>> {
        self.inner
            .lock()
            .iter()
            .filter(|(_, meta)| !meta.finished && !meta.updates.is_empty())
            .map(|(destination, meta)| (*destination, meta.updates.clone()))
            .collect()
    }

    /// Confirms delivery of the first `delivered` facts of a destination's
    /// entry. Facts recorded while the batch was in flight survive and keep
    /// the entry unfinished.
    pub(crate) fn mark_delivered(
        &self,
        destination: u32,
        delivered: usize,
    ) {
        let mut inner = self.inner.lock();
        if let Some(meta) = inner.get_mut(&destination) {
            let confirmed = delivered.min(meta.updates.len());
            meta.updates.drain(..confirmed);
            if meta.updates.is_empty() {
                meta.finished = true;
            }
        }
    }

    /// Drops every entry whose batch was delivered and not re-armed since.
    /// Keeps ledger size bounded by the number of destinations with
    /// outstanding work.
    pub(crate) fn cleanup(&self) {
        self.inner.lock().retain(|_, meta| !meta.finished);
    }

    /// Explicit eviction on membership change.
    pub(crate) fn remove(
        &self,
        destination: u32,
    ) {
        self.inner.lock().remove(&destination);
    }

    pub(crate) fn destination_count(&self) -> usize {
        self.inner.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_finished(
        &self,
        destination: u32,
    ) -> Option<bool> {
        self.inner.lock().get(&destination).map(|meta| meta.finished)
    }
}
