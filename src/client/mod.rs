//! IPFS HTTP client core.
//!
//! This module contains the command-execution, response-decoding, and
//! streaming layer that everything else is built on:
//!
//! ```text
//! client/
//! ├── command   - Command value and pure URL builder
//! ├── config    - Client construction parameters
//! ├── fetch     - IpfsClient: pooled transport, retry, shape decoding
//! ├── stream    - EventStream: cancelable NDJSON event sequences
//! ├── providers - dht/findprovs record flattening
//! └── utils     - backoff and status classification helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`IpfsClient`] | Pooled HTTP client over the daemon's `/api/v0` surface |
//! | [`ClientConfig`] | Construction parameters (daemon address, retry, pool) |
//! | [`Command`] | One logical API invocation |
//! | [`EventStream`] | Lazy, cancelable NDJSON event sequence |
//! | [`StreamingEvent`] | One decoded record plus its arrival ordinal |
//!
//! # Examples
//!
//! ## Building a command URL
//!
//! ```
//! use ipfs_http_client::client::build_command_url;
//!
//! let url = build_command_url("dht/findprovs", Some("QmX"), &["num-providers=20".to_string()]);
//! assert_eq!(url, "/api/v0/dht/findprovs?arg=QmX&num-providers=20");
//! ```
//!
//! ## Creating a client
//!
//! ```
//! use ipfs_http_client::{ClientConfig, IpfsClient};
//!
//! // Default configuration: local daemon, five attempts
//! let client = IpfsClient::new(ClientConfig::default());
//!
//! // Custom configuration
//! let client = IpfsClient::new(ClientConfig {
//!     base_url: "http://10.0.0.7:5001".to_string(),
//!     max_attempts: 3,
//!     ..Default::default()
//! });
//! # let _ = client;
//! ```

mod command;
mod config;
mod fetch;
mod providers;
mod stream;
mod utils;

pub use command::{build_command_url, Command};
pub use config::ClientConfig;
pub use fetch::IpfsClient;
pub use providers::collect_providers;
pub use stream::{EventStream, StreamingEvent};
pub use utils::{backoff_delay, is_retryable_status};
