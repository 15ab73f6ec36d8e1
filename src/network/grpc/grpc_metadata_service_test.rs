use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tonic::Code;
use tonic::Request;

use crate::proto::metadata::metadata_dissemination_server::MetadataDissemination;
use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::NtpLeader;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::test_utils::test_fact;
use crate::test_utils::test_ntp;
use crate::MetadataCache;
use crate::MetadataService;

fn service(ready: bool) -> (MetadataService, Arc<MetadataCache>) {
    let cache = Arc::new(MetadataCache::new());
    let service = MetadataService::new(1, Arc::clone(&cache), Arc::new(AtomicBool::new(ready)));
    (service, cache)
}

/// Case 1: a node that is not ready rejects both RPCs
#[tokio::test]
async fn test_rejects_when_not_ready() {
    let (service, _cache) = service(false);

    let update = service
        .update_leadership(Request::new(UpdateLeadershipRequest::default()))
        .await;
    assert_eq!(update.unwrap_err().code(), Code::Unavailable);

    let get = service.get_leadership(Request::new(GetLeadershipRequest::default())).await;
    assert_eq!(get.unwrap_err().code(), Code::Unavailable);
}

/// Case 2: applying the same batch twice yields the same cache state
#[tokio::test]
async fn test_update_leadership_is_idempotent() {
    let (service, cache) = service(true);
    let request = UpdateLeadershipRequest {
        leaders: vec![test_fact("orders", 1, 5, Some(2))],
    };

    for _ in 0..2 {
        let response = service
            .update_leadership(Request::new(request.clone()))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);
    }

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_leader(&test_ntp("orders", 1)), Some(2));
    assert_eq!(cache.get_term(&test_ntp("orders", 1)), Some(5));
}

/// Case 3: stale facts inside a batch are discarded without failing it
#[tokio::test]
async fn test_stale_facts_do_not_regress() {
    let (service, cache) = service(true);
    cache.apply(test_ntp("orders", 1), 9, Some(3));

    let response = service
        .update_leadership(Request::new(UpdateLeadershipRequest {
            leaders: vec![
                test_fact("orders", 1, 5, Some(2)),
                test_fact("billing", 0, 2, Some(4)),
            ],
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.success);
    assert_eq!(cache.get_leader(&test_ntp("orders", 1)), Some(3));
    assert_eq!(cache.get_leader(&test_ntp("billing", 0)), Some(4));
}

/// Case 4: facts without a partition id are skipped, the rest still apply
#[tokio::test]
async fn test_malformed_entries_are_skipped() {
    let (service, cache) = service(true);

    let response = service
        .update_leadership(Request::new(UpdateLeadershipRequest {
            leaders: vec![
                NtpLeader {
                    ntp: None,
                    term: 5,
                    leader_id: Some(2),
                },
                test_fact("orders", 1, 5, Some(2)),
            ],
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.success);
    assert_eq!(cache.len(), 1);
}

/// Case 5: get_leadership serves the full or filtered snapshot
#[tokio::test]
async fn test_get_leadership_snapshot() {
    let (service, cache) = service(true);
    cache.apply(test_ntp("orders", 0), 1, Some(1));
    cache.apply(test_ntp("orders", 1), 2, Some(2));

    let full = service
        .get_leadership(Request::new(GetLeadershipRequest::default()))
        .await
        .unwrap()
        .into_inner();
    assert!(full.success);
    assert_eq!(full.leaders.len(), 2);

    let filtered = service
        .get_leadership(Request::new(GetLeadershipRequest {
            filter: vec![test_ntp("orders", 1)],
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(filtered.leaders.len(), 1);
    assert_eq!(filtered.leaders[0].term, 2);
}
