use crate::proto::metadata::Ntp;
use crate::proto::metadata::NtpLeader;
use crate::MetadataCache;

fn ntp(partition: i32) -> Ntp {
    Ntp::new("kafka", "orders", partition)
}

/// Case 1: first fact for a partition is always applied
#[test]
fn test_apply_fresh_fact() {
    let cache = MetadataCache::new();
    assert!(cache.apply(ntp(0), 5, Some(2)));
    assert_eq!(cache.get_leader(&ntp(0)), Some(2));
    assert_eq!(cache.get_term(&ntp(0)), Some(5));
}

/// Case 2: the resulting term is the maximum seen regardless of arrival order
#[test]
fn test_term_monotonicity() {
    let cache = MetadataCache::new();
    assert!(cache.apply(ntp(0), 5, Some(2)));

    // Older term after newer one is a no-op
    assert!(!cache.apply(ntp(0), 3, Some(1)));
    assert_eq!(cache.get_leader(&ntp(0)), Some(2));
    assert_eq!(cache.get_term(&ntp(0)), Some(5));

    // Newer term wins
    assert!(cache.apply(ntp(0), 7, Some(3)));
    assert_eq!(cache.get_leader(&ntp(0)), Some(3));
    assert_eq!(cache.get_term(&ntp(0)), Some(7));
}

/// Case 3: applying the same fact twice leaves the table unchanged
#[test]
fn test_idempotent_application() {
    let cache = MetadataCache::new();
    let update = NtpLeader::new(ntp(1), 5, Some(2));

    assert!(cache.apply_update(&update));
    assert!(!cache.apply_update(&update));
    assert_eq!(cache.get_leader(&ntp(1)), Some(2));
    assert_eq!(cache.len(), 1);
}

/// Case 4: leaderless facts are representable
#[test]
fn test_leaderless_fact() {
    let cache = MetadataCache::new();
    assert!(cache.apply(ntp(0), 2, Some(1)));
    assert!(cache.apply(ntp(0), 3, None));
    assert_eq!(cache.get_leader(&ntp(0)), None);
    assert_eq!(cache.get_term(&ntp(0)), Some(3));
    assert!(cache.contains(&ntp(0)));
}

/// Case 5: malformed wire entries are skipped
#[test]
fn test_malformed_update_is_skipped() {
    let cache = MetadataCache::new();
    let update = NtpLeader {
        ntp: None,
        term: 5,
        leader_id: Some(2),
    };
    assert!(!cache.apply_update(&update));
    assert!(cache.is_empty());
}

/// Case 6: snapshot honors the partition filter
#[test]
fn test_snapshot_filter() {
    let cache = MetadataCache::new();
    cache.apply(ntp(0), 1, Some(1));
    cache.apply(ntp(1), 2, Some(2));
    cache.apply(ntp(2), 3, None);

    let full = cache.snapshot(&[]);
    assert_eq!(full.len(), 3);

    let filtered = cache.snapshot(&[ntp(1)]);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].ntp, Some(ntp(1)));
    assert_eq!(filtered[0].term, 2);
    assert_eq!(filtered[0].leader_id, Some(2));
}
