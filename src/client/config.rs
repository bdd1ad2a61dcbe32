//! Client configuration.
//!
//! A [`ClientConfig`] is supplied once at construction and never mutated
//! per call. The daemon address is the only required external
//! configuration; everything else has defaults matching the daemon's
//! documented behavior.
//!
//! # Examples
//!
//! ```
//! use ipfs_http_client::ClientConfig;
//!
//! // Default: local daemon on the standard API port
//! let config = ClientConfig::default();
//! assert_eq!(config.base_url, "http://127.0.0.1:5001");
//!
//! // Custom
//! let config = ClientConfig {
//!     base_url: "http://10.0.0.7:5001".to_string(),
//!     max_attempts: 3,
//!     ..Default::default()
//! };
//! # let _ = config;
//! ```

/// Configuration for [`crate::IpfsClient`].
///
/// Connection-pool parameters are explicit construction inputs; the pool
/// itself lives inside the client and is shared by every call made
/// through it (or through clones of it).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the daemon's API endpoint, without the `/api/v0` suffix
    pub base_url: String,
    /// Total attempt budget for transient failures (first try included)
    pub max_attempts: u32,
    /// Base delay for the backoff schedule; the first retry delay has this
    /// median, later ones grow exponentially with decorrelated jitter
    pub retry_base_delay_ms: u64,
    /// Maximum idle pooled connections kept per host
    pub pool_max_idle_per_host: usize,
    /// How long an idle pooled connection is kept before being closed
    pub pool_idle_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://127.0.0.1:5001".to_string(),
            max_attempts: 5,
            retry_base_delay_ms: 1000,
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 90,
        }
    }
}
