use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::proto::metadata::NodeMeta;
use crate::Error;
use crate::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    #[serde(default = "default_node_id")]
    pub node_id: u32,

    #[serde(default = "default_listen_addr")]
    pub listen_address: SocketAddr,

    /// Broker table at startup. Must contain this node.
    #[serde(default = "default_initial_cluster")]
    pub initial_cluster: Vec<NodeMeta>,

    /// Node ids the startup metadata pull contacts first, in order.
    #[serde(default)]
    pub seed_nodes: Vec<u32>,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            listen_address: default_listen_addr(),
            initial_cluster: default_initial_cluster(),
            seed_nodes: vec![],
            log_dir: default_log_dir(),
        }
    }
}

impl ClusterConfig {
    /// Validates cluster configuration consistency
    /// # Errors
    /// Returns `Error::InvalidConfig` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        // Validate node identity
        if self.node_id == 0 {
            return Err(Error::InvalidConfig(
                "node_id cannot be 0 (reserved for invalid nodes)".into(),
            ));
        }

        // Validate cluster membership
        if self.initial_cluster.is_empty() {
            return Err(Error::InvalidConfig(
                "initial_cluster must contain at least one node".into(),
            ));
        }

        // Check node existence in cluster
        let self_in_cluster = self.initial_cluster.iter().any(|n| n.id == self.node_id);
        if !self_in_cluster {
            return Err(Error::InvalidConfig(format!(
                "Current node {} not found in initial_cluster",
                self.node_id
            )));
        }

        // Check unique node IDs
        let mut ids = HashSet::new();
        for node in &self.initial_cluster {
            if !ids.insert(node.id) {
                return Err(Error::InvalidConfig(format!(
                    "Duplicate node_id {} in initial_cluster",
                    node.id
                )));
            }
            if node.port == 0 || node.port > u16::MAX as u32 {
                return Err(Error::InvalidConfig(format!(
                    "Node {} has invalid port {}",
                    node.id, node.port
                )));
            }
        }

        // Seed nodes must be known, remote peers
        for seed in &self.seed_nodes {
            if *seed == self.node_id {
                return Err(Error::InvalidConfig(
                    "seed_nodes must not contain the local node".into(),
                ));
            }
            if !ids.contains(seed) {
                return Err(Error::InvalidConfig(format!(
                    "Seed node {} not found in initial_cluster",
                    seed
                )));
            }
        }

        // Validate network configuration
        if self.listen_address.port() == 0 {
            return Err(Error::InvalidConfig(
                "listen_address must specify a non-zero port".into(),
            ));
        }

        Ok(())
    }
}

fn default_node_id() -> u32 {
    1
}
fn default_initial_cluster() -> Vec<NodeMeta> {
    vec![NodeMeta {
        id: 1,
        ip: "127.0.0.1".to_string(),
        port: 9081,
    }]
}
fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:9081".parse().unwrap()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/md-engine/logs")
}
