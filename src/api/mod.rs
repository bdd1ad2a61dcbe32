//! Per-endpoint wrappers over the command-execution core.
//!
//! Each wrapper chooses a command name and option set and hands the rest
//! to [`IpfsClient`]; they hold a clone of the client, so they share its
//! connection pool.
//!
//! | Accessor | Commands |
//! |----------|----------|
//! | [`IpfsClient::generic`] | `id`, `version`, `ping`, `resolve`, `shutdown` |
//! | [`IpfsClient::dht`] | `dht/findprovs` |
//! | [`IpfsClient::pubsub`] | `pubsub/pub`, `pubsub/sub`, `pubsub/ls`, `pubsub/peers` |
//! | [`IpfsClient::files`] | `add`, `cat`, `get` |

mod dht;
mod files;
mod generic;
mod pubsub;

pub use dht::DhtApi;
pub use files::{AddOptions, FilesApi};
pub use generic::GenericApi;
pub use pubsub::PubSubApi;

use crate::client::IpfsClient;

impl IpfsClient {
    /// Node-level commands: identity, version, ping, resolve, shutdown.
    pub fn generic(&self) -> GenericApi {
        GenericApi::new(self.clone())
    }

    /// Content-routing queries.
    pub fn dht(&self) -> DhtApi {
        DhtApi::new(self.clone())
    }

    /// Publish/subscribe messaging.
    pub fn pubsub(&self) -> PubSubApi {
        PubSubApi::new(self.clone())
    }

    /// File import and retrieval.
    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.clone())
    }
}
