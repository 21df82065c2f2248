use crate::humanize::ByteSize;
use crate::search::Quality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: VideoApiConfig,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub form: FormDefaults,
    #[serde(default)]
    pub archive: ArchiveSettings,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Credential or shared secret supplied by the environment.
///
/// Never printed: `Debug` is redacted and the type is not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// Web surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound on login/search form bodies
    #[serde(default = "default_max_form_bytes")]
    pub max_form_bytes: ByteSize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_form_bytes: default_max_form_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_form_bytes() -> ByteSize {
    ByteSize(16 * 1024)
}

/// Video search API contract
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Page size requested from the API (the API caps this at 200)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Safety bound on pages requested per run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Loaded from environment, never from the config file
    #[serde(skip)]
    pub api_key: Option<Secret>,
}

impl Default for VideoApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            api_key: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://pixabay.com/api/videos/".to_string()
}

fn default_per_page() -> u32 {
    200
}

fn default_max_pages() -> u32 {
    2
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// No connect timeout beyond the client default when unset
    pub connect_timeout_secs: Option<u64>,
    /// No whole-request timeout when unset
    pub request_timeout_secs: Option<u64>,
    /// Per-asset size cap; whole videos are buffered in memory
    pub max_asset_bytes: Option<ByteSize>,
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: None,
            request_timeout_secs: None,
            max_asset_bytes: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("vidbundle/{}", env!("CARGO_PKG_VERSION"))
}

/// Pre-filled values and bounds of the search form
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormDefaults {
    #[serde(default = "default_keyword")]
    pub keyword: String,
    #[serde(default = "default_min_duration")]
    pub min_duration: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Largest count an operator may request in one run
    #[serde(default = "default_max_count")]
    pub max_count: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
            quality: Quality::default(),
            count: default_count(),
            max_count: default_max_count(),
        }
    }
}

fn default_keyword() -> String {
    "nature".to_string()
}

fn default_min_duration() -> u32 {
    10
}

fn default_max_duration() -> u32 {
    30
}

fn default_count() -> u32 {
    5
}

fn default_max_count() -> u32 {
    20
}

/// Naming of the produced archive and its entries
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveSettings {
    #[serde(default = "default_archive_file_name")]
    pub file_name: String,
    #[serde(default = "default_entry_prefix")]
    pub entry_prefix: String,
    #[serde(default = "default_entry_extension")]
    pub entry_extension: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            file_name: default_archive_file_name(),
            entry_prefix: default_entry_prefix(),
            entry_extension: default_entry_extension(),
        }
    }
}

fn default_archive_file_name() -> String {
    "pixabay_videos.zip".to_string()
}

fn default_entry_prefix() -> String {
    "pixabay_video_".to_string()
}

fn default_entry_extension() -> String {
    "mp4".to_string()
}

/// Login gate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Loaded from environment, never from the config file
    #[serde(skip)]
    pub access_key: Option<Secret>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            access_key: None,
        }
    }
}

fn default_cookie_name() -> String {
    "vidbundle_session".to_string()
}
