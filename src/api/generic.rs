//! Node-level commands.

use crate::client::{Command, IpfsClient};
use crate::error::{IpfsError, Result};
use crate::types::{PeerIdentity, PingResult, VersionInfo};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Wrapper for `id`, `version`, `ping`, `resolve`, and `shutdown`.
#[derive(Clone)]
pub struct GenericApi {
    client: IpfsClient,
}

impl GenericApi {
    pub(crate) fn new(client: IpfsClient) -> Self {
        GenericApi { client }
    }

    /// Identity of the local node, or of `peer` when given.
    pub async fn identity(
        &self,
        peer: Option<&str>,
        token: CancellationToken,
    ) -> Result<Option<PeerIdentity>> {
        let mut cmd = Command::new("id");
        if let Some(peer) = peer {
            cmd = cmd.arg(peer);
        }
        self.client.fetch_json(&cmd, token).await
    }

    /// Version information of the daemon.
    pub async fn version(&self, token: CancellationToken) -> Result<Option<VersionInfo>> {
        self.client.fetch_json(&Command::new("version"), token).await
    }

    /// Ping a peer `count` times, collecting the streamed result frames.
    ///
    /// Each round trip produces up to three frames (start text, latency,
    /// average); the stream ends when the daemon is done.
    pub async fn ping(
        &self,
        peer: &str,
        count: u32,
        token: CancellationToken,
    ) -> Result<Vec<PingResult>> {
        let cmd = Command::new("ping")
            .arg(peer)
            .option(format!("count={}", count));
        let mut events = self.client.open_event_stream(cmd, token).await?;

        let mut results = Vec::new();
        while let Some(item) = events.next().await {
            let event = item?;
            let result: PingResult = serde_json::from_value(event.value)
                .map_err(|e| IpfsError::Decode(e.to_string()))?;
            results.push(result);
        }
        Ok(results)
    }

    /// Resolve a name (IPNS or path) to its canonical path.
    pub async fn resolve(
        &self,
        name: &str,
        recursive: bool,
        token: CancellationToken,
    ) -> Result<Option<String>> {
        let cmd = Command::new("resolve")
            .arg(name)
            .option(format!("recursive={}", recursive));
        let value: Option<Value> = self.client.fetch_json(&cmd, token).await?;
        Ok(value
            .as_ref()
            .and_then(|v| v.get("Path"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    /// Ask the daemon to shut down.
    pub async fn shutdown(&self, token: CancellationToken) -> Result<()> {
        self.client.execute(&Command::new("shutdown"), token).await
    }
}
