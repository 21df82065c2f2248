//! Form payloads and JSON responses of the web surface

use serde::{Deserialize, Serialize};

use crate::observability::MetricsSnapshot;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub access_key: String,
}

/// Search form as submitted; every field is text until validated
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub min_duration: String,
    #[serde(default)]
    pub max_duration: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub count: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub runs: MetricsSnapshot,
}
