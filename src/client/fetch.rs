//! Main IPFS HTTP client implementation.
//!
//! Provides the primary [`IpfsClient`] for invoking daemon commands over
//! the `/api/v0` HTTP surface.
//!
//! # Examples
//!
//! ## Buffered JSON command
//!
//! ```ignore
//! use ipfs_http_client::{ClientConfig, IpfsClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IpfsClient::new(ClientConfig::default());
//!     let version: Option<serde_json::Value> = client
//!         .fetch_json(&ipfs_http_client::Command::new("version"), CancellationToken::new())
//!         .await?;
//!     println!("{:?}", version);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming command
//!
//! ```ignore
//! use ipfs_http_client::{Command, IpfsClient, ClientConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> ipfs_http_client::Result<()> {
//! let client = IpfsClient::new(ClientConfig::default());
//! let token = CancellationToken::new();
//! let mut events = client
//!     .open_event_stream(Command::new("ping").arg("QmPeer").option("count=3"), token)
//!     .await?;
//! while let Some(event) = events.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::stream::EventStream;
use crate::client::{config::ClientConfig, utils, Command};
use crate::error::{IpfsError, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Filename placeholder for uploads without an advisory name
const UNKNOWN_FILENAME: &str = "unknown";

/// The main IPFS HTTP client.
///
/// Owns one pooled `reqwest::Client` that is shared by every call made
/// through it; clones share the same pool, so only one instance is
/// required by an application. The client applies no request timeout:
/// commands such as `pubsub/sub` run indefinitely and cancellation is
/// driven exclusively by the per-call [`CancellationToken`].
///
/// All commands are issued as `POST {base_url}/api/v0/{command}`.
///
/// # Response shapes
///
/// The requested shape is a compile-time choice, one method per shape:
///
/// | Method | Body handling |
/// |--------|---------------|
/// | [`execute`](Self::execute) | discarded |
/// | [`fetch_bytes`](Self::fetch_bytes) | buffered into memory |
/// | [`fetch_text`](Self::fetch_text) | buffered, decoded as UTF-8 |
/// | [`fetch_json`](Self::fetch_json) | buffered, deserialized; empty body is `None` |
/// | [`open_stream`](Self::open_stream) | left attached to the connection |
/// | [`open_event_stream`](Self::open_event_stream) | read lazily as NDJSON events |
#[derive(Clone)]
pub struct IpfsClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl IpfsClient {
    /// Create a client from the given configuration.
    ///
    /// The configuration is fixed for the lifetime of the client; the
    /// connection pool it describes is torn down when the last clone is
    /// dropped.
    pub fn new(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .unwrap_or_default();

        IpfsClient {
            http,
            config: Arc::new(config),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a command, discarding any response body.
    pub async fn execute(&self, command: &Command, token: CancellationToken) -> Result<()> {
        let response = self.send_with_retries(command, &token).await?;
        let _ = self.classify(&command.url(), response).await?;
        Ok(())
    }

    /// Run a command and buffer the entire response body.
    pub async fn fetch_bytes(&self, command: &Command, token: CancellationToken) -> Result<Bytes> {
        let response = self.send_with_retries(command, &token).await?;
        let response = self.classify(&command.url(), response).await?;
        read_body(response, &token).await
    }

    /// Run a command and buffer the response body as UTF-8 text.
    pub async fn fetch_text(&self, command: &Command, token: CancellationToken) -> Result<String> {
        let body = self.fetch_bytes(command, token).await?;
        let text = String::from_utf8(body.to_vec())?;
        tracing::debug!(response = %text, "RSP");
        Ok(text)
    }

    /// Run a command and deserialize the response body as JSON.
    ///
    /// An empty or absent body yields `None`, not an error; several
    /// commands legitimately return nothing on success.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        command: &Command,
        token: CancellationToken,
    ) -> Result<Option<T>> {
        let text = self.fetch_text(command, token).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| IpfsError::Decode(e.to_string()))
    }

    /// Run a command and return the live response body without buffering.
    ///
    /// The HTTP connection stays attached to the returned response until
    /// it is dropped. Dropping it before end-of-stream is the supported
    /// way to stop a daemon-side handler (e.g. an active subscription).
    pub async fn open_stream(
        &self,
        command: &Command,
        token: CancellationToken,
    ) -> Result<reqwest::Response> {
        let response = self.send_with_retries(command, &token).await?;
        self.classify(&command.url(), response).await
    }

    /// Run a command and read its response as a lazy, cancelable NDJSON
    /// event sequence.
    ///
    /// Cancelling `token` (or dropping the returned stream) closes the
    /// underlying body, which doubles as the unsubscribe signal for
    /// long-lived endpoints.
    pub async fn open_event_stream(
        &self,
        command: Command,
        token: CancellationToken,
    ) -> Result<EventStream> {
        let response = self.open_stream(&command, token.clone()).await?;
        Ok(EventStream::new(response, token))
    }

    /// Run a command carrying a multipart payload and discard the result.
    pub async fn upload(
        &self,
        command: &Command,
        payload: impl Into<reqwest::Body>,
        filename: Option<&str>,
        token: CancellationToken,
    ) -> Result<()> {
        let response = self.send_upload(command, payload, filename, &token).await?;
        let _ = self.classify(&command.url(), response).await?;
        Ok(())
    }

    /// Run a command carrying a multipart payload and deserialize the
    /// response as JSON. An empty body yields `None`.
    pub async fn upload_json<T: DeserializeOwned>(
        &self,
        command: &Command,
        payload: impl Into<reqwest::Body>,
        filename: Option<&str>,
        token: CancellationToken,
    ) -> Result<Option<T>> {
        let response = self.send_upload(command, payload, filename, &token).await?;
        let response = self.classify(&command.url(), response).await?;
        let body = read_body(response, &token).await?;
        let text = String::from_utf8(body.to_vec())?;
        tracing::debug!(response = %text, "RSP");
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| IpfsError::Decode(e.to_string()))
    }

    /// Run a command carrying a multipart payload and read its response
    /// as an NDJSON event sequence (used by progress-reporting uploads).
    pub async fn upload_event_stream(
        &self,
        command: Command,
        payload: impl Into<reqwest::Body>,
        filename: Option<&str>,
        token: CancellationToken,
    ) -> Result<EventStream> {
        let response = self.send_upload(&command, payload, filename, &token).await?;
        let response = self.classify(&command.url(), response).await?;
        Ok(EventStream::new(response, token))
    }

    /// Send a bodyless command POST, retrying transient failures.
    ///
    /// Retries cover connection-level errors, 5xx responses, and 404 (the
    /// daemon transiently 404s during its startup window). The attempt
    /// budget and backoff schedule come from [`ClientConfig`]. Requests
    /// carrying an upload body never pass through here; see
    /// [`send_upload`](Self::send_upload).
    async fn send_with_retries(
        &self,
        command: &Command,
        token: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, command.url());
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let outcome = self.post(&url, token).await;

            match outcome {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !utils::is_retryable_status(status) || attempt >= self.config.max_attempts {
                        return Ok(response);
                    }
                    tracing::warn!(
                        url = %url,
                        status,
                        attempt,
                        "transient daemon response, retrying"
                    );
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    tracing::warn!(url = %url, attempt, error = %e, "transport failure, retrying");
                }
                Err(e) => return Err(e),
            }

            let delay = utils::backoff_delay(attempt - 1, self.config.retry_base_delay_ms);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = token.cancelled() => return Err(IpfsError::Cancelled),
            }
        }
    }

    /// Send a command POST with a single multipart part.
    ///
    /// Part name is always `file`, content type `application/octet-stream`,
    /// filename the supplied name or a fixed placeholder when absent or
    /// blank. Never retried: the payload may have partially streamed to
    /// the server and the operation may not be idempotent.
    async fn send_upload(
        &self,
        command: &Command,
        payload: impl Into<reqwest::Body>,
        filename: Option<&str>,
        token: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, command.url());
        tracing::debug!(url = %url, "POST (multipart)");

        let name = match filename {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => UNKNOWN_FILENAME.to_string(),
        };
        let part = reqwest::multipart::Part::stream(payload)
            .file_name(name)
            .mime_str("application/octet-stream")
            .map_err(|e| IpfsError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self.http.post(&url).multipart(form);
        tokio::select! {
            res = request.send() => res.map_err(|e| IpfsError::Transport(e.to_string())),
            _ = token.cancelled() => Err(IpfsError::Cancelled),
        }
    }

    /// Issue one POST, racing the cancellation token against the send.
    async fn post(&self, url: &str, token: &CancellationToken) -> Result<reqwest::Response> {
        tracing::debug!(url = %url, "POST");
        tokio::select! {
            res = self.http.post(url).send() => {
                res.map_err(|e| IpfsError::Transport(e.to_string()))
            }
            _ = token.cancelled() => Err(IpfsError::Cancelled),
        }
    }

    /// Classify a response: pass successes through, turn everything else
    /// into a structured error.
    ///
    /// The daemon reports failures as `{"Message": "...", "Code": N}`, but
    /// the body may be arbitrary text; a body that fails to parse falls
    /// back to the raw text and never masks the original failure.
    async fn classify(&self, route: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(route, "invalid command");
            return Err(IpfsError::UnknownCommand {
                route: route.to_string(),
            });
        }

        let status = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status, body = %body, "ERR");

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("Message").and_then(|m| m.as_str()).map(String::from));

        Err(IpfsError::Daemon {
            status,
            body,
            message,
        })
    }
}

/// Buffer a response body, racing the cancellation token.
async fn read_body(response: reqwest::Response, token: &CancellationToken) -> Result<Bytes> {
    tokio::select! {
        body = response.bytes() => body.map_err(|e| IpfsError::Transport(e.to_string())),
        _ = token.cancelled() => Err(IpfsError::Cancelled),
    }
}
