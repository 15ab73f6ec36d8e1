use std::collections::HashSet;

use crate::proto::metadata::NodeMeta;
use crate::proto::metadata::Ntp;
use crate::ClusterMembership;

fn node_meta(id: u32) -> NodeMeta {
    NodeMeta {
        id,
        ip: "127.0.0.1".to_string(),
        port: 9080 + id,
    }
}

fn five_node_membership(self_id: u32) -> ClusterMembership {
    ClusterMembership::new(self_id, (1..=5).map(node_meta).collect())
}

/// Case 1: node and peer listings exclude nothing but self
#[test]
fn test_node_listings() {
    let membership = five_node_membership(1);
    let mut node_ids = membership.node_ids();
    node_ids.sort_unstable();
    assert_eq!(node_ids, vec![1, 2, 3, 4, 5]);

    let mut peer_ids = membership.peer_ids();
    peer_ids.sort_unstable();
    assert_eq!(peer_ids, vec![2, 3, 4, 5]);
    assert_eq!(membership.self_id(), 1);
}

/// Case 2: broker addresses resolve to http endpoints
#[test]
fn test_address_lookup() {
    let membership = five_node_membership(1);
    assert_eq!(membership.address_of(2), Some("http://127.0.0.1:9082".to_string()));
    assert_eq!(membership.address_of(9), None);
}

/// Case 3: replica assignment drives replicas_of
#[test]
fn test_replica_assignment() {
    let membership = five_node_membership(1);
    let ntp = Ntp::new("kafka", "orders", 0);

    // Unknown partition has no replicas
    assert!(membership.replicas_of(&ntp).is_empty());

    membership.assign_replicas(ntp.clone(), HashSet::from([1, 2, 3]));
    assert_eq!(membership.replicas_of(&ntp), HashSet::from([1, 2, 3]));
}

/// Case 4: removing a node drops it from broker table and replica sets
#[test]
fn test_remove_node() {
    let membership = five_node_membership(1);
    let ntp = Ntp::new("kafka", "orders", 0);
    membership.assign_replicas(ntp.clone(), HashSet::from([1, 2, 3]));

    assert!(membership.remove_node(3).is_ok());
    assert!(!membership.contains_node(3));
    assert_eq!(membership.replicas_of(&ntp), HashSet::from([1, 2]));

    // Removing twice reports the unknown peer
    assert!(membership.remove_node(3).is_err());
}

/// Case 5: added nodes become routable destinations
#[test]
fn test_add_node() {
    let membership = five_node_membership(1);
    membership.add_node(node_meta(6));
    assert!(membership.contains_node(6));
    assert_eq!(membership.address_of(6), Some("http://127.0.0.1:9086".to_string()));
}
