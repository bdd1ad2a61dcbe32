//! Typed representations of daemon response shapes.
//!
//! The daemon emits JSON with PascalCase field names for most commands and
//! camelCase for a few (pubsub). Older daemon versions occasionally used
//! lowercase names, so the structs here carry `alias` attributes for the
//! shapes where that has been observed in the wild.

use base64::Engine;
use serde::Deserialize;

/// One frame of a `ping` response stream.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PingResult {
    /// Whether this leg of the ping succeeded
    #[serde(rename = "Success", alias = "success", default)]
    pub success: bool,
    /// Human-readable text accompanying the frame
    #[serde(rename = "Text", alias = "text", default)]
    pub text: String,
    /// Round-trip time in nanoseconds, zero for informational frames
    #[serde(rename = "Time", alias = "time", default)]
    pub time_ns: u64,
}

/// A peer discovered through content routing (`dht/findprovs`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProviderRecord {
    /// The peer identifier (multihash string)
    #[serde(rename = "ID", alias = "Id", default)]
    pub id: String,
    /// Known multiaddresses for the peer, when the daemon includes them
    #[serde(rename = "Addrs", default)]
    pub addresses: Vec<String>,
}

/// The daemon's identity response (`id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerIdentity {
    /// Peer identifier
    #[serde(rename = "ID", alias = "Id", default)]
    pub id: String,
    /// Base-64 encoded public key
    #[serde(rename = "PublicKey", default)]
    pub public_key: String,
    /// Listen addresses
    #[serde(rename = "Addresses", default)]
    pub addresses: Vec<String>,
    /// Agent version string, e.g. `kubo/0.29.0`
    #[serde(rename = "AgentVersion", default)]
    pub agent_version: String,
    /// Protocol version string
    #[serde(rename = "ProtocolVersion", default)]
    pub protocol_version: String,
}

/// The daemon's `version` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    /// Daemon semantic version
    #[serde(rename = "Version", default)]
    pub version: String,
    /// Git commit the daemon was built from
    #[serde(rename = "Commit", default)]
    pub commit: String,
    /// Repo format version
    #[serde(rename = "Repo", default)]
    pub repo: String,
    /// Host triple
    #[serde(rename = "System", default)]
    pub system: String,
    /// Go toolchain version
    #[serde(rename = "Golang", default)]
    pub golang: String,
}

/// A peer list whose wire shape depends on the daemon version.
///
/// Older daemons return `{"Strings": ["Qm…", …]}` (bare peer IDs); newer
/// ones return structured records. The variant is resolved by which
/// top-level field is present, never by a fallback cast.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PeerList {
    /// `{"Strings": [...]}` - plain peer ID strings
    Strings {
        /// The bare peer IDs
        #[serde(rename = "Strings", default)]
        strings: Vec<String>,
    },
    /// `{"Peers": [...]}` - structured peer records
    Peers {
        /// The structured records
        #[serde(rename = "Peers", default)]
        peers: Vec<ProviderRecord>,
    },
}

impl PeerList {
    /// Flatten either wire shape into a list of peer IDs.
    pub fn ids(&self) -> Vec<String> {
        match self {
            PeerList::Strings { strings } => strings.clone(),
            PeerList::Peers { peers } => peers.iter().map(|p| p.id.clone()).collect(),
        }
    }
}

/// A message received from a pubsub subscription.
///
/// The daemon encodes `data`, `seqno`, and topic IDs as multibase strings
/// (`u` prefix, base64url without padding).
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Peer that published the message
    pub sender: String,
    /// Decoded message payload
    pub data: Vec<u8>,
    /// Decoded sequence number bytes
    pub sequence_number: Vec<u8>,
    /// Decoded topic names the message was published to
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    from: String,
    #[serde(default)]
    data: String,
    #[serde(default)]
    seqno: String,
    #[serde(rename = "topicIDs", default)]
    topic_ids: Vec<String>,
}

impl PublishedMessage {
    /// Parse one pubsub NDJSON frame into a message.
    pub fn from_json(value: &serde_json::Value) -> crate::Result<Self> {
        let wire: WireMessage = serde_json::from_value(value.clone())
            .map_err(|e| crate::IpfsError::Decode(e.to_string()))?;
        Ok(PublishedMessage {
            sender: wire.from,
            data: decode_multibase(&wire.data)?,
            sequence_number: decode_multibase(&wire.seqno)?,
            topics: wire
                .topic_ids
                .iter()
                .map(|t| {
                    decode_multibase(t).map(|b| String::from_utf8_lossy(&b).into_owned())
                })
                .collect::<crate::Result<Vec<_>>>()?,
        })
    }

    /// Payload interpreted as UTF-8 text.
    pub fn data_string(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Encode bytes as a multibase string with the `u` (base64url, no padding)
/// prefix the pubsub API expects for topic arguments.
pub(crate) fn encode_multibase(data: &[u8]) -> String {
    format!("u{}", base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data))
}

/// Decode a multibase string. Only the `u` encoding is emitted by the
/// daemons this client supports; an empty string decodes to empty bytes.
pub(crate) fn decode_multibase(s: &str) -> crate::Result<Vec<u8>> {
    let Some(rest) = s.strip_prefix('u') else {
        if s.is_empty() {
            return Ok(Vec::new());
        }
        return Err(crate::IpfsError::Decode(format!(
            "unsupported multibase prefix in {:?}",
            s
        )));
    };
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(rest)
        .map_err(|e| crate::IpfsError::Decode(format!("invalid base64url payload: {}", e)))
}

/// A progress report frame from a multipart `add` upload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TransferProgress {
    /// Advisory name of the file being uploaded
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Bytes transferred so far for this file; non-decreasing per file
    #[serde(rename = "Bytes")]
    pub bytes: u64,
}

/// The terminal frame of an `add` upload: the added file's identity.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AddedFile {
    /// Advisory name supplied with the upload
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Content identifier of the added file
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Size in bytes, reported by the daemon as a decimal string
    #[serde(rename = "Size", default)]
    pub size: String,
}

impl AddedFile {
    /// Size parsed as a number; zero when the daemon omitted it.
    pub fn size_bytes(&self) -> u64 {
        self.size.parse().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_result_deserializes_pascal_case() {
        let r: PingResult =
            serde_json::from_str(r#"{"Success":true,"Text":"PING","Time":1500000}"#).unwrap();
        assert!(r.success);
        assert_eq!(r.text, "PING");
        assert_eq!(r.time_ns, 1_500_000);
    }

    #[test]
    fn peer_list_resolves_strings_variant() {
        let l: PeerList = serde_json::from_str(r#"{"Strings":["QmA","QmB"]}"#).unwrap();
        assert_eq!(l.ids(), vec!["QmA", "QmB"]);
    }

    #[test]
    fn peer_list_resolves_structured_variant() {
        let l: PeerList =
            serde_json::from_str(r#"{"Peers":[{"ID":"QmA"},{"ID":"QmB"}]}"#).unwrap();
        assert_eq!(l.ids(), vec!["QmA", "QmB"]);
    }

    #[test]
    fn multibase_round_trip() {
        let encoded = encode_multibase(b"hello world");
        assert!(encoded.starts_with('u'));
        assert_eq!(decode_multibase(&encoded).unwrap(), b"hello world");
    }

    #[test]
    fn multibase_rejects_unknown_prefix() {
        assert!(decode_multibase("zQmfoo").is_err());
        assert!(decode_multibase("").unwrap().is_empty());
    }

    #[test]
    fn published_message_decodes_wire_frame() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"from":"QmSender","data":"uaGVsbG8","seqno":"uAAE","topicIDs":["udG9waWM"]}"#,
        )
        .unwrap();
        let msg = PublishedMessage::from_json(&json).unwrap();
        assert_eq!(msg.sender, "QmSender");
        assert_eq!(msg.data_string(), "hello");
        assert_eq!(msg.topics, vec!["topic"]);
    }

    #[test]
    fn added_file_parses_decimal_size() {
        let f: AddedFile =
            serde_json::from_str(r#"{"Name":"a.txt","Hash":"QmX","Size":"42"}"#).unwrap();
        assert_eq!(f.size_bytes(), 42);
    }
}
