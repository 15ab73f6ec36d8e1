use std::net::SocketAddr;

use crate::proto::metadata::NodeMeta;
use crate::BackoffPolicy;
use crate::ClusterConfig;
use crate::DisseminationConfig;
use crate::MonitoringConfig;
use crate::NetworkConfig;
use crate::Settings;

fn node_meta(
    id: u32,
    port: u32,
) -> NodeMeta {
    NodeMeta {
        id,
        ip: "127.0.0.1".to_string(),
        port,
    }
}

/// Case 1: default settings pass validation
#[test]
fn test_default_settings_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
}

/// Case 2: node_id 0 is reserved
#[test]
fn test_cluster_rejects_node_id_zero() {
    let config = ClusterConfig {
        node_id: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

/// Case 3: the local node must appear in the initial cluster
#[test]
fn test_cluster_rejects_unknown_self() {
    let config = ClusterConfig {
        node_id: 9,
        initial_cluster: vec![node_meta(1, 9081), node_meta(2, 9082)],
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

/// Case 4: duplicate broker ids are rejected
#[test]
fn test_cluster_rejects_duplicate_ids() {
    let config = ClusterConfig {
        node_id: 1,
        initial_cluster: vec![node_meta(1, 9081), node_meta(1, 9082)],
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

/// Case 5: seed nodes must be remote peers known to the cluster
#[test]
fn test_cluster_rejects_bad_seed_nodes() {
    let base = ClusterConfig {
        node_id: 1,
        initial_cluster: vec![node_meta(1, 9081), node_meta(2, 9082)],
        ..Default::default()
    };

    let self_seed = ClusterConfig {
        seed_nodes: vec![1],
        ..base.clone()
    };
    assert!(self_seed.validate().is_err());

    let unknown_seed = ClusterConfig {
        seed_nodes: vec![7],
        ..base.clone()
    };
    assert!(unknown_seed.validate().is_err());

    let valid_seed = ClusterConfig {
        seed_nodes: vec![2],
        ..base
    };
    assert!(valid_seed.validate().is_ok());
}

/// Case 6: listen address needs a concrete port
#[test]
fn test_cluster_rejects_port_zero_listener() {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let config = ClusterConfig {
        listen_address: addr,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

/// Case 7: dissemination timer and shard count must be non-zero
#[test]
fn test_dissemination_validation() {
    let zero_interval = DisseminationConfig {
        interval_ms: 0,
        ..Default::default()
    };
    assert!(zero_interval.validate().is_err());

    let zero_shards = DisseminationConfig {
        shards: 0,
        ..Default::default()
    };
    assert!(zero_shards.validate().is_err());

    assert!(DisseminationConfig::default().validate().is_ok());
}

/// Case 8: backoff base must not exceed the ceiling
#[test]
fn test_backoff_policy_validation() {
    let inverted = BackoffPolicy {
        timeout_ms: 1000,
        base_delay_ms: 500,
        max_delay_ms: 100,
    };
    assert!(inverted.validate().is_err());

    let zero_timeout = BackoffPolicy {
        timeout_ms: 0,
        base_delay_ms: 100,
        max_delay_ms: 500,
    };
    assert!(zero_timeout.validate().is_err());

    assert!(BackoffPolicy::default().validate().is_ok());
}

/// Case 9: http2 keepalive timeout must stay below the ping interval
#[test]
fn test_network_keepalive_validation() {
    let config = NetworkConfig {
        http2_keep_alive_interval_in_secs: 10,
        http2_keep_alive_timeout_in_secs: 10,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

/// Case 10: enabled prometheus requires an unprivileged port
#[test]
fn test_monitoring_validation() {
    let config = MonitoringConfig {
        prometheus_enabled: true,
        prometheus_port: 80,
    };
    assert!(config.validate().is_err());

    let disabled = MonitoringConfig::default();
    assert!(disabled.validate().is_ok());
}
