//! Content-routing queries.

use crate::client::{collect_providers, Command, IpfsClient};
use crate::error::Result;
use crate::types::{PeerIdentity, ProviderRecord};
use tokio_util::sync::CancellationToken;

/// Wrapper for distributed-hash-table queries.
#[derive(Clone)]
pub struct DhtApi {
    client: IpfsClient,
}

impl DhtApi {
    pub(crate) fn new(client: IpfsClient) -> Self {
        DhtApi { client }
    }

    /// Find peers providing the content identified by `cid`.
    ///
    /// Consumption stops as soon as `limit` providers have been seen; the
    /// rest of the stream is released, not drained.
    pub async fn find_providers(
        &self,
        cid: &str,
        limit: usize,
        token: CancellationToken,
    ) -> Result<Vec<ProviderRecord>> {
        let cmd = Command::new("dht/findprovs")
            .arg(cid)
            .option(format!("num-providers={}", limit));
        let events = self.client.open_event_stream(cmd, token).await?;
        collect_providers(events, limit).await
    }

    /// Locate a specific peer's identity.
    pub async fn find_peer(
        &self,
        peer_id: &str,
        token: CancellationToken,
    ) -> Result<Option<PeerIdentity>> {
        self.client.generic().identity(Some(peer_id), token).await
    }
}
