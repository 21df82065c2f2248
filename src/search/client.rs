//! HTTP page source for the video search API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::SearchPage;
use super::query::SearchQuery;
use crate::config::Secret;

/// Longest slice of an error body carried into the error message
const ERROR_BODY_LIMIT: usize = 200;

/// Search-phase failure. Always fatal to the run.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(String),

    #[error("search endpoint returned HTTP {status}{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("search response could not be decoded: {0}")]
    Decode(String),
}

impl SearchError {
    /// reqwest errors embed the request URL, which carries the API key
    fn transport(err: reqwest::Error) -> Self {
        SearchError::Transport(err.without_url().to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Anything that can produce one page of search results
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage>;
}

/// Video search API client
#[derive(Clone)]
pub struct VideoApiClient {
    client: Client,
    endpoint: String,
    api_key: Secret,
}

impl VideoApiClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Secret) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl PageSource for VideoApiClient {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage> {
        debug!(
            page = query.page,
            per_page = query.per_page,
            keyword = %query.keyword,
            "Requesting search page"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query.to_params(&self.api_key))
            .send()
            .await
            .map_err(SearchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
            warn!(page = query.page, %status, "Search endpoint rejected request");
            return Err(SearchError::Status {
                status,
                detail: if snippet.is_empty() {
                    String::new()
                } else {
                    format!(": {snippet}")
                },
            });
        }

        let body = response.bytes().await.map_err(SearchError::transport)?;
        let page: SearchPage =
            serde_json::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        debug!(
            page = query.page,
            hits = page.hits.len(),
            total_hits = page.total_hits,
            "Search page received"
        );

        Ok(page)
    }
}
