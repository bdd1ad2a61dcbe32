//! File import and retrieval.
//!
//! `add` uploads content as a multipart body and reads back a stream of
//! LDJSON frames: any number of progress reports (`Bytes` field) per
//! file, then one terminal frame per file carrying the added file's
//! identity. See <https://github.com/ipfs/go-ipfs/issues/4852>.

use crate::client::{Command, IpfsClient};
use crate::error::{IpfsError, Result};
use crate::types::{AddedFile, TransferProgress};
use tokio_util::sync::CancellationToken;

/// Options for [`FilesApi::add`], mirroring the daemon's `add` flags.
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Pin the added content (daemon default; `pin=false` sent otherwise)
    pub pin: bool,
    /// Wrap the file in a directory object
    pub wrap_with_directory: bool,
    /// Use raw blocks for leaf nodes
    pub raw_leaves: bool,
    /// Only compute the hash, do not store the content
    pub only_hash: bool,
    /// Use trickle-dag layout instead of balanced
    pub trickle: bool,
    /// Chunker block size in bytes
    pub chunk_size: usize,
    /// Multihash algorithm, when not the daemon default
    pub hash: Option<String>,
    /// CID base encoding, when not the daemon default
    pub cid_base: Option<String>,
}

impl Default for AddOptions {
    fn default() -> Self {
        AddOptions {
            pin: true,
            wrap_with_directory: false,
            raw_leaves: false,
            only_hash: false,
            trickle: false,
            chunk_size: 256 * 1024,
            hash: None,
            cid_base: None,
        }
    }
}

impl AddOptions {
    /// Render the option token list, requesting progress frames when a
    /// callback will consume them.
    fn to_tokens(&self, progress: bool) -> Vec<String> {
        let mut tokens = Vec::new();
        if !self.pin {
            tokens.push("pin=false".to_string());
        }
        if self.wrap_with_directory {
            tokens.push("wrap-with-directory=true".to_string());
        }
        if self.raw_leaves {
            tokens.push("raw-leaves=true".to_string());
        }
        if self.only_hash {
            tokens.push("only-hash=true".to_string());
        }
        if self.trickle {
            tokens.push("trickle=true".to_string());
        }
        if progress {
            tokens.push("progress=true".to_string());
        }
        if let Some(hash) = &self.hash {
            tokens.push(format!("hash={}", hash));
        }
        if let Some(base) = &self.cid_base {
            tokens.push(format!("cid-base={}", base));
        }
        tokens.push(format!("chunker=size-{}", self.chunk_size));
        tokens
    }
}

/// Wrapper for `add`, `cat`, and `get`.
#[derive(Clone)]
pub struct FilesApi {
    client: IpfsClient,
}

impl FilesApi {
    pub(crate) fn new(client: IpfsClient) -> Self {
        FilesApi { client }
    }

    /// Add content to the store.
    pub async fn add(
        &self,
        content: impl Into<reqwest::Body>,
        name: &str,
        options: &AddOptions,
        token: CancellationToken,
    ) -> Result<AddedFile> {
        self.add_inner(content, name, options, None, token).await
    }

    /// Add content, reporting upload progress.
    ///
    /// `on_progress` is invoked synchronously, once per progress frame,
    /// in frame order. Byte counts are non-decreasing per file; across
    /// the files of one multi-file upload no global ordering is
    /// guaranteed.
    pub async fn add_with_progress(
        &self,
        content: impl Into<reqwest::Body>,
        name: &str,
        options: &AddOptions,
        on_progress: impl FnMut(TransferProgress),
        token: CancellationToken,
    ) -> Result<AddedFile> {
        self.add_inner(content, name, options, Some(Box::new(on_progress)), token)
            .await
    }

    /// Add a UTF-8 string as a file.
    pub async fn add_text(&self, text: &str, token: CancellationToken) -> Result<AddedFile> {
        self.add(text.as_bytes().to_vec(), "", &AddOptions::default(), token)
            .await
    }

    async fn add_inner(
        &self,
        content: impl Into<reqwest::Body>,
        name: &str,
        options: &AddOptions,
        mut on_progress: Option<Box<dyn FnMut(TransferProgress) + '_>>,
        token: CancellationToken,
    ) -> Result<AddedFile> {
        let cmd = Command::new("add").options(options.to_tokens(on_progress.is_some()));
        let filename = (!name.trim().is_empty()).then_some(name);
        let mut events = self
            .client
            .upload_event_stream(cmd, content, filename, token)
            .await?;

        let mut added: Option<AddedFile> = None;
        while let Some(item) = events.next().await {
            let event = item?;
            if event.value.get("Bytes").is_some() {
                let frame: TransferProgress = serde_json::from_value(event.value)
                    .map_err(|e| IpfsError::Decode(e.to_string()))?;
                if let Some(report) = on_progress.as_mut() {
                    report(frame);
                }
            } else {
                // Terminal frame for the current item. With
                // wrap-with-directory the wrapper directory comes last.
                let file: AddedFile = serde_json::from_value(event.value)
                    .map_err(|e| IpfsError::Decode(e.to_string()))?;
                tracing::debug!(hash = %file.hash, name = %file.name, "added");
                added = Some(file);
            }
        }

        added.ok_or_else(|| IpfsError::Decode("no file added".to_string()))
    }

    /// Open an existing file's content for reading.
    ///
    /// The connection stays attached to the returned response; drop it to
    /// release the download early.
    pub async fn cat(&self, path: &str, token: CancellationToken) -> Result<reqwest::Response> {
        self.client.open_stream(&Command::new("cat").arg(path), token).await
    }

    /// Open a byte range of an existing file's content.
    pub async fn cat_range(
        &self,
        path: &str,
        offset: u64,
        length: u64,
        token: CancellationToken,
    ) -> Result<reqwest::Response> {
        let cmd = Command::new("cat")
            .arg(path)
            .option(format!("offset={}", offset))
            .option(format!("length={}", length));
        self.client.open_stream(&cmd, token).await
    }

    /// Read an existing file's content as UTF-8 text.
    pub async fn read_all_text(&self, path: &str, token: CancellationToken) -> Result<String> {
        self.client.fetch_text(&Command::new("cat").arg(path), token).await
    }

    /// Download a path as a TAR archive stream.
    pub async fn get(
        &self,
        path: &str,
        compress: bool,
        token: CancellationToken,
    ) -> Result<reqwest::Response> {
        let cmd = Command::new("get")
            .arg(path)
            .option(format!("compress={}", compress));
        self.client.open_stream(&cmd, token).await
    }
}
