//! HTTP client for streaming video downloads

use bytes::BytesMut;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::{AssetNaming, DownloadProgress, FetchedAsset};
use crate::config::HttpSettings;
use crate::humanize::ByteSize;
use crate::search::{Quality, VideoHit};

/// Per-item download failure. Never fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no {quality} rendition for video {id}")]
    MissingRendition { id: String, quality: Quality },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}")]
    Status { status: StatusCode },

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("asset exceeds size limit of {limit}")]
    TooLarge { limit: ByteSize },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
    pub max_asset_bytes: Option<ByteSize>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig::from(&HttpSettings::default())
    }
}

impl From<&HttpSettings> for HttpConfig {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            request_timeout: settings.request_timeout(),
            user_agent: settings.user_agent.clone(),
            max_asset_bytes: settings.max_asset_bytes,
        }
    }
}

/// Streaming downloader sharing one connection pool with the search client
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Underlying reqwest client, for the search API
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Download one hit's rendition into memory, single attempt.
    ///
    /// `on_progress` is called after every received chunk.
    pub async fn fetch(
        &self,
        hit: &VideoHit,
        quality: Quality,
        naming: &AssetNaming,
        mut on_progress: impl FnMut(DownloadProgress),
    ) -> Result<FetchedAsset> {
        let url = hit.url(quality).ok_or_else(|| FetchError::MissingRendition {
            id: hit.id.clone(),
            quality,
        })?;
        let file_name = naming.file_name(&hit.id);

        debug!(id = %hit.id, url, "Starting download");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Transport("connection timed out".to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok());
        if let Some(media_type) = media_type.filter(|m| !is_video_payload(m)) {
            warn!(id = %hit.id, content_type = %media_type, "Unexpected content type for video");
        }

        let total = response.content_length();
        self.check_limit(total.unwrap_or(0))?;

        let mut buffer = BytesMut::with_capacity(total.unwrap_or(0).min(64 * 1024 * 1024) as usize);
        let mut stream = response.bytes_stream();
        on_progress(DownloadProgress::new(0, total));

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Body(e.to_string()))?;
            buffer.extend_from_slice(&chunk);
            self.check_limit(buffer.len() as u64)?;
            on_progress(DownloadProgress::new(buffer.len() as u64, total));
        }

        if let Some(expected) = total {
            if expected != buffer.len() as u64 {
                warn!(
                    id = %hit.id,
                    expected,
                    received = buffer.len(),
                    "Body length differs from Content-Length"
                );
            }
        }

        debug!(id = %hit.id, size = buffer.len(), "Download completed");

        Ok(FetchedAsset {
            id: hit.id.clone(),
            file_name,
            content: buffer.freeze(),
        })
    }

    fn check_limit(&self, bytes: u64) -> Result<()> {
        match self.config.max_asset_bytes {
            Some(limit) if bytes > limit.as_u64() => Err(FetchError::TooLarge { limit }),
            _ => Ok(()),
        }
    }
}

/// Video payloads are `video/*`; CDNs also send `application/octet-stream`
pub(crate) fn is_video_payload(media_type: &mime::Mime) -> bool {
    media_type.type_() == mime::VIDEO
        || media_type.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str()
}
