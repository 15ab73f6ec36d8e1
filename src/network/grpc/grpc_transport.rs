//! gRPC client side of the metadata dissemination RPCs.
//!
//! Channels to peers are cached and re-established when a broker's address
//! changes. Every failure is reported as a [`NetworkError`]; retry policy is
//! owned by the callers (fixed-cadence ticks for pushes, candidate fail-over
//! for pulls).

use std::sync::Arc;

use tonic::async_trait;
use tonic::transport::Channel;
use tracing::warn;

use crate::network::connection_cache::ConnectionCache;
use crate::proto::metadata::metadata_dissemination_client::MetadataDisseminationClient;
use crate::proto::metadata::GetLeadershipRequest;
use crate::proto::metadata::GetLeadershipResponse;
use crate::proto::metadata::UpdateLeadershipRequest;
use crate::proto::metadata::UpdateLeadershipResponse;
use crate::ClusterMembership;
use crate::MetadataTransport;
use crate::NetworkConfig;
use crate::NetworkError;
use crate::Result;

pub struct GrpcTransport {
    membership: Arc<ClusterMembership>,
    connections: ConnectionCache,
}

impl GrpcTransport {
    pub fn new(
        membership: Arc<ClusterMembership>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            membership,
            connections: ConnectionCache::new(config),
        }
    }

    async fn client_for(
        &self,
        node_id: u32,
    ) -> Result<MetadataDisseminationClient<Channel>> {
        let address = self
            .membership
            .address_of(node_id)
            .ok_or(NetworkError::UnknownPeer { node_id })?;
        let channel = self.connections.get_channel(node_id, address).await?;
        Ok(MetadataDisseminationClient::new(channel))
    }
}

#[async_trait]
impl MetadataTransport for GrpcTransport {
    async fn update_leadership(
        &self,
        target: u32,
        request: UpdateLeadershipRequest,
    ) -> Result<UpdateLeadershipResponse> {
        let mut client = self.client_for(target).await?;
        let response = client
            .update_leadership(tonic::Request::new(request))
            .await
            .map_err(|status| {
                warn!(node_id = target, "update_leadership RPC failed: {}", status);
                NetworkError::TonicStatusError(Box::new(status))
            })?;
        Ok(response.into_inner())
    }

    async fn get_leadership(
        &self,
        target: u32,
        request: GetLeadershipRequest,
    ) -> Result<GetLeadershipResponse> {
        let mut client = self.client_for(target).await?;
        let response = client
            .get_leadership(tonic::Request::new(request))
            .await
            .map_err(|status| {
                warn!(node_id = target, "get_leadership RPC failed: {}", status);
                NetworkError::TonicStatusError(Box::new(status))
            })?;
        Ok(response.into_inner())
    }

    fn evict(
        &self,
        target: u32,
    ) {
        self.connections.remove_node(target);
    }
}
