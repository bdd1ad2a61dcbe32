//! Error types for the IPFS HTTP client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, IpfsError>`.
//!
//! # Error Taxonomy
//!
//! | Variant | Meaning | Retried? |
//! |---------|---------|----------|
//! | [`IpfsError::Transport`] | Connection-level failure before a response arrived | yes |
//! | [`IpfsError::UnknownCommand`] | 404 that persisted after the retry budget | no |
//! | [`IpfsError::Daemon`] | Non-2xx response reported by the daemon | no |
//! | [`IpfsError::Decode`] | Response body did not parse into the requested shape | no |
//! | [`IpfsError::StreamTermination`] | Read failure on an open stream, not caused by cancellation | no |
//!
//! Transient failures (connection errors, 5xx, startup-window 404) are
//! absorbed by the retry loop in [`crate::client::IpfsClient`] and only
//! surface once the attempt budget is exhausted.

use thiserror::Error;

/// Result type alias for IPFS client operations
pub type Result<T> = std::result::Result<T, IpfsError>;

/// Errors that can occur while talking to the IPFS daemon.
#[derive(Error, Debug)]
pub enum IpfsError {
    /// Connection or protocol-level failure before a usable response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// A 404 that persisted after the retry budget was exhausted.
    ///
    /// The daemon returns 404 both for genuinely unknown commands and,
    /// transiently, during its startup window before routes are registered.
    /// The retry loop absorbs the latter; what remains is a bad route.
    #[error("invalid IPFS command: {route}")]
    UnknownCommand {
        /// The relative URL that was attempted
        route: String,
    },

    /// The daemon reported a failure with a non-2xx status.
    ///
    /// `message` is the `Message` field of the daemon's JSON error body
    /// when the body parsed as one; `body` is always the raw text.
    #[error("daemon error (status {status}): {}", best_message(.message, .body))]
    Daemon {
        /// HTTP status code of the response
        status: u16,
        /// Raw response body text
        body: String,
        /// Extracted `Message` field, when the body was a JSON error object
        message: Option<String>,
    },

    /// The HTTP call succeeded but the body did not decode into the
    /// requested shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// An open event stream failed mid-read without the caller having
    /// requested cancellation.
    #[error("stream terminated abnormally: {0}")]
    StreamTermination(String),

    /// The caller's cancellation token fired while the call was in flight
    #[error("request cancelled")]
    Cancelled,

    /// Response body was not valid UTF-8 when text was requested
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn best_message<'a>(message: &'a Option<String>, body: &'a String) -> &'a str {
    message.as_deref().unwrap_or(body)
}

impl IpfsError {
    /// Whether this failure is classified as transient (likely to succeed
    /// on retry). Only connection-level transport failures qualify here;
    /// retryable HTTP statuses are decided before an error is built.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IpfsError::Transport(_))
    }
}
