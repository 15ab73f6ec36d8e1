//! Local authoritative view of partition leadership.
//!
//! Every node holds one cache. Partitions replicated locally update it
//! straight from consensus notifications; partitions hosted elsewhere are
//! filled in by the dissemination protocol. Application is term-ordered, so
//! stale or duplicate facts arriving out of order can never regress the
//! table.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use crate::proto::metadata::Ntp;
use crate::proto::metadata::NtpLeader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderEntry {
    pub term: u64,
    /// `None` means the partition currently has no known leader.
    pub leader_id: Option<u32>,
}

/// Thread-safe leadership table keyed by partition identifier.
#[derive(Debug, Default)]
pub struct MetadataCache {
    leaders: DashMap<Ntp, LeaderEntry>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a leadership fact with last-write-wins-by-term semantics.
    ///
    /// Returns `true` if the table changed. A fact whose term is equal to or
    /// lower than the recorded one is stale and ignored, which makes
    /// re-application of the same batch a no-op.
    pub fn apply(
        &self,
        ntp: Ntp,
        term: u64,
        leader_id: Option<u32>,
    ) -> bool {
        match self.leaders.entry(ntp) {
            Entry::Occupied(mut entry) => {
                if term > entry.get().term {
                    entry.insert(LeaderEntry { term, leader_id });
                    true
                } else {
                    trace!(term, known_term = entry.get().term, "Discarding stale leadership fact");
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(LeaderEntry { term, leader_id });
                true
            }
        }
    }

    /// Applies a wire-format fact. Entries without a partition identifier
    /// are malformed and skipped.
    pub fn apply_update(
        &self,
        update: &NtpLeader,
    ) -> bool {
        match &update.ntp {
            Some(ntp) => self.apply(ntp.clone(), update.term, update.leader_id),
            None => false,
        }
    }

    pub fn get_leader(
        &self,
        ntp: &Ntp,
    ) -> Option<u32> {
        self.leaders.get(ntp).and_then(|entry| entry.leader_id)
    }

    pub fn get_term(
        &self,
        ntp: &Ntp,
    ) -> Option<u64> {
        self.leaders.get(ntp).map(|entry| entry.term)
    }

    pub fn contains(
        &self,
        ntp: &Ntp,
    ) -> bool {
        self.leaders.contains_key(ntp)
    }

    /// Leadership snapshot served to a bootstrapping peer. An empty filter
    /// returns the full table.
    pub fn snapshot(
        &self,
        filter: &[Ntp],
    ) -> Vec<NtpLeader> {
        self.leaders
            .iter()
            .filter(|entry| filter.is_empty() || filter.contains(entry.key()))
            .map(|entry| NtpLeader::new(entry.key().clone(), entry.value().term, entry.value().leader_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }
}
