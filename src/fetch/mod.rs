//! Fetcher: streamed retrieval of selected videos into memory
//!
//! Each video is buffered whole before it is archived. That is fine for the
//! form's bounded batch sizes; `http.max_asset_bytes` caps a single item.

pub mod http;

use bytes::Bytes;

use crate::config::ArchiveSettings;
use crate::humanize;

pub use http::{FetchError, HttpClient, HttpConfig};

/// Downloaded video, owned by the fetcher until the archiver consumes it
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub id: String,
    pub file_name: String,
    pub content: Bytes,
}

impl FetchedAsset {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Byte progress of one download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub received: u64,
    /// `None` when the server sent no Content-Length
    pub total: Option<u64>,
}

impl DownloadProgress {
    pub fn new(received: u64, total: Option<u64>) -> Self {
        Self { received, total }
    }

    /// 0 when the total is unknown
    pub fn percent(&self) -> u8 {
        humanize::percent(self.received, self.total)
    }
}

/// Derives archive entry names from hit identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNaming {
    prefix: String,
    extension: String,
}

impl AssetNaming {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Path separators in the identifier are replaced so every name stays a
    /// single top-level entry
    pub fn file_name(&self, id: &str) -> String {
        let safe_id: String = id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        format!("{}{}.{}", self.prefix, safe_id, self.extension)
    }
}

impl From<&ArchiveSettings> for AssetNaming {
    fn from(settings: &ArchiveSettings) -> Self {
        AssetNaming::new(&settings.entry_prefix, &settings.entry_extension)
    }
}
