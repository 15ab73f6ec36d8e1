use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::proto::metadata::NodeMeta;
use crate::utils::util::address_str;
use crate::proto::metadata::Ntp;
use crate::Error;
use crate::NetworkError;
use crate::Result;

pub struct ClusterMembership {
    self_id: u32,
    inner: Arc<RwLock<InnerState>>,
}

pub struct InnerState {
    pub nodes: HashMap<u32, NodeMeta>,
    pub replicas: HashMap<Ntp, HashSet<u32>>,
}

impl ClusterMembership {
    pub fn new(
        self_id: u32,
        initial_nodes: Vec<NodeMeta>,
    ) -> Self {
        info!("Initializing membership: {:?}", initial_nodes);
        let inner = Arc::new(RwLock::new(InnerState {
            nodes: initial_nodes.into_iter().map(|node| (node.id, node)).collect(),
            replicas: HashMap::new(),
        }));
        Self { self_id, inner }
    }

    /// Provides read access to the state
    pub fn blocking_read<R>(
        &self,
        f: impl FnOnce(&InnerState) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Provides write access to the state
    pub fn blocking_write<R>(
        &self,
        f: impl FnOnce(&mut InnerState) -> R,
    ) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    pub fn self_id(&self) -> u32 {
        self.self_id
    }

    /// All cluster node ids (including itself)
    pub fn node_ids(&self) -> Vec<u32> {
        self.blocking_read(|state| state.nodes.keys().copied().collect())
    }

    /// All non-self node ids
    pub fn peer_ids(&self) -> Vec<u32> {
        self.blocking_read(|state| {
            state
                .nodes
                .keys()
                .copied()
                .filter(|id| *id != self.self_id)
                .collect()
        })
    }

    pub fn contains_node(
        &self,
        node_id: u32,
    ) -> bool {
        self.blocking_read(|state| state.nodes.contains_key(&node_id))
    }

    /// gRPC endpoint address of a broker, if known
    pub fn address_of(
        &self,
        node_id: u32,
    ) -> Option<String> {
        self.blocking_read(|state| {
            state
                .nodes
                .get(&node_id)
                .map(|meta| address_str(&meta.ip, meta.port as u16))
        })
    }

    pub fn add_node(
        &self,
        meta: NodeMeta,
    ) {
        info!(node_id = meta.id, "Adding node to membership");
        self.blocking_write(|state| {
            state.nodes.insert(meta.id, meta);
        });
    }

    /// Removes a decommissioned broker and its replica assignments.
    pub fn remove_node(
        &self,
        node_id: u32,
    ) -> Result<()> {
        info!(node_id, "Removing node from membership");
        self.blocking_write(|state| {
            if state.nodes.remove(&node_id).is_none() {
                return Err(Error::from(NetworkError::UnknownPeer { node_id }));
            }
            for replica_set in state.replicas.values_mut() {
                replica_set.remove(&node_id);
            }
            Ok(())
        })
    }

    /// Nodes replicating a partition. Empty when the partition is unknown,
    /// which makes every cluster peer a dissemination destination.
    pub fn replicas_of(
        &self,
        ntp: &Ntp,
    ) -> HashSet<u32> {
        self.blocking_read(|state| state.replicas.get(ntp).cloned().unwrap_or_default())
    }

    pub fn assign_replicas(
        &self,
        ntp: Ntp,
        replica_set: HashSet<u32>,
    ) {
        self.blocking_write(|state| {
            state.replicas.insert(ntp, replica_set);
        });
    }
}
