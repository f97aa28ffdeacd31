//! The media indexer seam.
//!
//! Platform adapters (a directory walker on desktop) implement
//! [`MediaIndexer`]; the catalog loader treats every call as fallible.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("media library access denied")]
    PermissionDenied,
    #[error("media library root {path} is not readable")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown asset {0}")]
    AssetNotFound(String),
    #[error("indexer failure: {0}")]
    Other(String),
}

/// One audio asset as enumerated by the indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub id: String,
    pub uri: String,
    pub filename: String,
    pub duration: Duration,
}

/// Extra metadata for an asset. Fields are `None` when the indexer has no tag data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetDetail {
    pub artist: Option<String>,
    pub album: Option<String>,
}

pub trait MediaIndexer {
    /// Ask for access to the media library. `Ok(false)` means denied.
    fn request_permission(&mut self) -> Result<bool, IndexerError>;

    /// Enumerate audio assets, at most `limit` of them, in device order.
    fn query_audio_assets(&mut self, limit: usize) -> Result<Vec<AudioAsset>, IndexerError>;

    fn asset_detail(&mut self, id: &str) -> Result<AssetDetail, IndexerError>;
}
