use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use thiserror::Error;

use super::pages;
use super::validation::FormError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidForm(#[from] FormError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Error fetching from the video API: {0}. Check the API key or network.")]
    SearchFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SearchFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidForm(_) => "INVALID_FORM",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::SearchFailed(_) => "SEARCH_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = pages::error_page(status, self.code(), &self.to_string());

        (status, Html(body)).into_response()
    }
}
