//! Publish/subscribe messaging.
//!
//! Topic arguments travel multibase-encoded (`u` prefix, base64url) on
//! the wire; message payloads go up as multipart uploads and come back
//! multibase-encoded inside subscription frames.

use crate::client::{Command, IpfsClient};
use crate::error::Result;
use crate::types::{encode_multibase, PeerList, PublishedMessage};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Wrapper for `pubsub/*` commands.
#[derive(Clone)]
pub struct PubSubApi {
    client: IpfsClient,
}

impl PubSubApi {
    pub(crate) fn new(client: IpfsClient) -> Self {
        PubSubApi { client }
    }

    /// Publish `data` to `topic`.
    pub async fn publish(
        &self,
        topic: &str,
        data: Vec<u8>,
        token: CancellationToken,
    ) -> Result<()> {
        let cmd = Command::new("pubsub/pub").arg(encode_multibase(topic.as_bytes()));
        self.client.upload(&cmd, data, None, token).await
    }

    /// Subscribe to `topic`, invoking `handler` for each message.
    ///
    /// The consumption loop runs on a detached task so this call returns
    /// as soon as the subscription is established. Cancelling `token`
    /// closes the stream (the daemon sees the unsubscribe) and the
    /// handler is never invoked after cancellation. Stream errors are
    /// logged, not surfaced, since there is no caller left to surface them to.
    pub async fn subscribe<F>(
        &self,
        topic: &str,
        handler: F,
        token: CancellationToken,
    ) -> Result<()>
    where
        F: Fn(PublishedMessage) + Send + 'static,
    {
        let cmd = Command::new("pubsub/sub").arg(encode_multibase(topic.as_bytes()));
        let mut events = self.client.open_event_stream(cmd, token.clone()).await?;

        let topic = topic.to_string();
        tokio::spawn(async move {
            tracing::debug!(topic = %topic, "start listening");
            while let Some(item) = events.next().await {
                match item {
                    Ok(event) => {
                        if token.is_cancelled() {
                            break;
                        }
                        match PublishedMessage::from_json(&event.value) {
                            Ok(message) => handler(message),
                            Err(e) => {
                                tracing::error!(topic = %topic, error = %e, "bad pubsub frame")
                            }
                        }
                    }
                    Err(e) => {
                        if !token.is_cancelled() {
                            tracing::error!(topic = %topic, error = %e, "pubsub stream error");
                        }
                    }
                }
            }
            tracing::debug!(topic = %topic, "stop listening");
        });

        Ok(())
    }

    /// Topics this node is currently subscribed to.
    pub async fn subscribed_topics(&self, token: CancellationToken) -> Result<Vec<String>> {
        let value: Option<Value> = self
            .client
            .fetch_json(&Command::new("pubsub/ls"), token)
            .await?;
        Ok(string_list(value.as_ref()))
    }

    /// Peers participating in pubsub, optionally filtered to one topic.
    ///
    /// The response shape depends on the daemon version; both are
    /// flattened to peer IDs.
    pub async fn peers(&self, topic: Option<&str>, token: CancellationToken) -> Result<Vec<String>> {
        let mut cmd = Command::new("pubsub/peers");
        if let Some(topic) = topic {
            cmd = cmd.arg(topic);
        }
        let list: Option<PeerList> = self.client.fetch_json(&cmd, token).await?;
        Ok(list.map(|l| l.ids()).unwrap_or_default())
    }
}

/// Extract the `Strings` array the daemon uses for plain string lists.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.get("Strings"))
        .and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
