#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Architecture
//!
//! The crate is layered leaf-first:
//!
//! 1. **URL building** - a pure function from (command name, positional
//!    argument, option flags) to a relative `/api/v0/...` URL
//! 2. **Transport** - one pooled `reqwest::Client` per [`IpfsClient`],
//!    no request timeout, every command a `POST`
//! 3. **Retry** - bounded exponential backoff with decorrelated jitter
//!    around the send step for transient failures (connection errors,
//!    5xx, the daemon's startup-window 404); uploads are never retried
//! 4. **Decoding** - one named operation per response shape: bytes,
//!    text, JSON, or a live stream, plus structured error classification
//! 5. **Streaming** - [`EventStream`], a lazy cancelable NDJSON reader
//!    feeding the domain interpreters (ping frames, provider records,
//!    pubsub messages, upload-progress frames)
//!
//! # Module Structure
//!
//! - **[client]** - Command execution, retry, decoding, streaming core
//! - **[api]** - Thin per-endpoint wrappers (generic, dht, pubsub, files)
//! - **[error]** - Error types and result handling
//! - **[types]** - Typed daemon response shapes
//!
//! # Cancellation
//!
//! Every operation takes a `tokio_util::sync::CancellationToken`. For
//! buffered calls it aborts the in-flight request; for streaming calls it
//! closes the underlying body, which is also how a subscription is
//! unsubscribed. Dropping an [`EventStream`] has the same effect.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{AddOptions, DhtApi, FilesApi, GenericApi, PubSubApi};
pub use client::{
    build_command_url, ClientConfig, Command, EventStream, IpfsClient, StreamingEvent,
};
pub use error::{IpfsError, Result};
pub use types::{
    AddedFile, PeerIdentity, PeerList, PingResult, ProviderRecord, PublishedMessage,
    TransferProgress, VersionInfo,
};
