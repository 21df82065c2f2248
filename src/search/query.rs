//! Query builder: request parameters for one page of the search API

use super::models::SearchCriteria;
use crate::config::Secret;

/// Parameters of one search page request. Contains no credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    /// 1-based
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn for_page(criteria: &SearchCriteria, page: u32, per_page: u32) -> Self {
        Self {
            keyword: criteria.keyword().to_string(),
            page,
            per_page,
        }
    }

    /// Query string pairs in the order the API documents them
    pub fn to_params(&self, api_key: &Secret) -> [(&'static str, String); 4] {
        [
            ("key", api_key.expose().to_string()),
            ("q", self.keyword.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}
