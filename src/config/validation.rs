use super::models::{Config, Secret};
use thiserror::Error;

/// The search API rejects page sizes outside this range
const PER_PAGE_RANGE: std::ops::RangeInclusive<u32> = 3..=200;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("api.per_page must be between 3 and 200, got {value}")]
    InvalidPerPage { value: u32 },

    #[error("api.max_pages must be at least 1")]
    ZeroMaxPages,

    #[error("api.endpoint '{endpoint}' is not a valid http(s) URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("form.max_count must be at least 1")]
    ZeroMaxCount,

    #[error("form.count ({count}) must be between 1 and form.max_count ({max_count})")]
    DefaultCountOutOfRange { count: u32, max_count: u32 },

    #[error("form.min_duration ({min}) must be positive and less than form.max_duration ({max})")]
    DefaultDurationRange { min: u32, max: u32 },

    #[error("archive.{field} must not be empty")]
    EmptyArchiveSetting { field: &'static str },

    #[error("http.max_asset_bytes must be positive")]
    ZeroAssetLimit,

    #[error("Video API key not configured (set VIDBUNDLE_API_KEY or PIXABAY_API_KEY)")]
    MissingApiKey,

    #[error("Access key not configured (set VIDBUNDLE_ACCESS_KEY)")]
    MissingAccessKey,
}

/// Validate the structural parts of the configuration (no secrets)
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_api(config)?;
    validate_form(config)?;
    validate_archive(config)?;
    validate_http(config)?;
    Ok(())
}

/// The API key is needed by every command that runs the pipeline
pub fn require_api_key(config: &Config) -> Result<&Secret, ValidationError> {
    config
        .api
        .api_key
        .as_ref()
        .filter(|key| !key.is_blank())
        .ok_or(ValidationError::MissingApiKey)
}

/// The access key is only needed when the login gate is served
pub fn require_access_key(config: &Config) -> Result<&Secret, ValidationError> {
    config
        .auth
        .access_key
        .as_ref()
        .filter(|key| !key.is_blank())
        .ok_or(ValidationError::MissingAccessKey)
}

fn validate_api(config: &Config) -> Result<(), ValidationError> {
    if !PER_PAGE_RANGE.contains(&config.api.per_page) {
        return Err(ValidationError::InvalidPerPage {
            value: config.api.per_page,
        });
    }

    if config.api.max_pages == 0 {
        return Err(ValidationError::ZeroMaxPages);
    }

    let invalid = |reason: String| ValidationError::InvalidEndpoint {
        endpoint: config.api.endpoint.clone(),
        reason,
    };
    let url = reqwest::Url::parse(&config.api.endpoint).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    Ok(())
}

fn validate_form(config: &Config) -> Result<(), ValidationError> {
    let form = &config.form;

    if form.max_count == 0 {
        return Err(ValidationError::ZeroMaxCount);
    }

    if form.count == 0 || form.count > form.max_count {
        return Err(ValidationError::DefaultCountOutOfRange {
            count: form.count,
            max_count: form.max_count,
        });
    }

    if form.min_duration == 0 || form.min_duration >= form.max_duration {
        return Err(ValidationError::DefaultDurationRange {
            min: form.min_duration,
            max: form.max_duration,
        });
    }

    Ok(())
}

fn validate_archive(config: &Config) -> Result<(), ValidationError> {
    let archive = &config.archive;

    if archive.file_name.trim().is_empty() {
        return Err(ValidationError::EmptyArchiveSetting { field: "file_name" });
    }

    if archive.entry_extension.trim().is_empty() {
        return Err(ValidationError::EmptyArchiveSetting {
            field: "entry_extension",
        });
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.max_asset_bytes.is_some_and(|limit| limit.as_u64() == 0) {
        return Err(ValidationError::ZeroAssetLimit);
    }

    Ok(())
}
