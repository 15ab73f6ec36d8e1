//! Network abstraction layer for peer metadata RPCs.
//!
//! All network operations are governed by the timeout parameters defined in
//! [`crate::NetworkConfig`]. The [`MetadataTransport`] trait is the seam
//! between the dissemination engine and the wire; the gRPC implementation
//! lives in [`grpc`].

pub(crate) mod connection_cache;
pub mod grpc;
pub use grpc::*;

#[cfg(test)]
use mockall::automock;
use tonic::async_trait;

use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::GetLeadershipResponse;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::proto::metadata::UpdateLeadershipResponse;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetadataTransport: Send + Sync + 'static {
    /// Pushes one batch of leadership facts to a destination node.
    ///
    /// Any failure (connect error, timeout, gRPC status) means the batch is
    /// not confirmed and will be retried by the caller. A response with
    /// `success == false` is an application-level rejection and counts the
    /// same way.
    async fn update_leadership(
        &self,
        target: u32,
        request: UpdateLeadershipRequest,
    ) -> Result<UpdateLeadershipResponse>;

    /// Pulls a leadership snapshot from a cluster member. Used only during
    /// startup bootstrap.
    async fn get_leadership(
        &self,
        target: u32,
        request: GetLeadershipRequest,
    ) -> Result<GetLeadershipResponse>;

    /// Drops cached connection state for a decommissioned node.
    fn evict(
        &self,
        _target: u32,
    ) {
    }
}
