//! Command representation and URL building.
//!
//! Every daemon invocation is one [`Command`]: a name, an optional
//! positional argument, and zero or more option tokens. The URL builder
//! is a pure function over those inputs, so it can be exercised
//! exhaustively without a network in sight.
//!
//! # Wire Format
//!
//! ```text
//! /api/v0/{name}?arg=<enc(arg)>&<opt1>=<enc(val1)>&<flag>&...
//! ```
//!
//! The positional argument, when present, is always the first query
//! parameter. Option tokens are split on the first `=`; a token with no
//! `=` is appended as a bare flag. Values are percent-encoded exactly
//! once with standard query-component escaping. Duplicate option keys are
//! legal and preserved in insertion order (the daemon accepts repeated
//! query keys, e.g. multiple `arg` values).
//!
//! # Examples
//!
//! ```
//! use ipfs_http_client::client::build_command_url;
//!
//! let url = build_command_url("ping", Some("QmPeer"), &["count=3".to_string()]);
//! assert_eq!(url, "/api/v0/ping?arg=QmPeer&count=3");
//! ```

use url::form_urlencoded;

/// One logical API invocation, built once per call and immutable after.
#[derive(Debug, Clone)]
pub struct Command {
    /// Command name, e.g. `pin/add` or `pubsub/sub`
    pub name: String,
    /// Optional positional argument, percent-encoded when the URL is built
    pub arg: Option<String>,
    /// Option tokens, either `key=value` or bare flags, in insertion order
    pub options: Vec<String>,
}

impl Command {
    /// Create a command with no argument or options.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            arg: None,
            options: Vec::new(),
        }
    }

    /// Set the positional argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    /// Append one option token (`key=value` or a bare flag).
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Append several option tokens, preserving their order.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Build the relative URL for this command.
    pub fn url(&self) -> String {
        build_command_url(&self.name, self.arg.as_deref(), &self.options)
    }
}

/// Build the relative command URL.
///
/// Pure and deterministic: no network, no mutation of inputs, identical
/// output for identical input. See the module docs for the wire format.
pub fn build_command_url(name: &str, arg: Option<&str>, options: &[String]) -> String {
    let mut url = format!("/api/v0/{}", name);
    let mut separator = '?';

    if let Some(arg) = arg {
        url.push(separator);
        url.push_str("arg=");
        url.extend(form_urlencoded::byte_serialize(arg.as_bytes()));
        separator = '&';
    }

    for option in options {
        url.push(separator);
        separator = '&';
        match option.split_once('=') {
            None => url.push_str(option),
            Some((key, value)) => {
                url.push_str(key);
                url.push('=');
                url.extend(form_urlencoded::byte_serialize(value.as_bytes()));
            }
        }
    }

    url
}
