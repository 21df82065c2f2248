use axum::{
    Extension, Form, Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    auth::{SessionToken, constant_time_eq},
    error::ApiError,
    models::{HealthResponse, LoginForm, RunForm},
    pages,
    state::AppState,
    utils::{attachment_disposition, cookie_value, expired_cookie, session_cookie},
    validation::criteria_from_form,
};
use crate::archive::ZIP_CONTENT_TYPE;
use crate::pipeline::RunError;
use crate::progress::TracingProgress;

/// Liveness plus run counters (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        runs: state.metrics.snapshot(),
    })
}

/// Search form for logged-in sessions, login form otherwise (GET /)
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let logged_in = match cookie_value(&headers, &state.config.auth.cookie_name) {
        Some(token) => state.sessions.contains(&token).await,
        None => false,
    };

    if logged_in {
        Html(pages::search_page(&state.config.form))
    } else {
        Html(pages::login_page(None))
    }
}

/// Check the access key and open a session (POST /login)
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !constant_time_eq(
        form.access_key.as_bytes(),
        state.access_key.expose().as_bytes(),
    ) {
        warn!("Rejected login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Html(pages::login_page(Some("Invalid access key. Please try again."))),
        )
            .into_response();
    }

    let token = state.sessions.create().await;
    let sessions = state.sessions.len().await;
    info!(sessions, "Session opened");

    (
        [(header::SET_COOKIE, session_cookie(&state.config.auth.cookie_name, &token))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Drop the session and its pending archive (POST /logout)
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = cookie_value(&headers, cookie_name) {
        if state.sessions.remove(&token).await {
            info!("Session closed");
        }
    }

    (
        [(header::SET_COOKIE, expired_cookie(cookie_name))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Run search → filter → fetch → archive for the submitted form (POST /runs)
///
/// The form is validated before any outbound request. A ready archive
/// replaces whatever the session had pending; the result page links to it.
pub async fn start_run(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Form(form): Form<RunForm>,
) -> Result<Html<String>, ApiError> {
    let criteria = criteria_from_form(&form, &state.config.form)?;

    state.metrics.run_started();
    let mut progress = TracingProgress::new();

    let outcome = match state.pipeline.run(&criteria, &mut progress).await {
        Ok(outcome) => outcome,
        Err(RunError::Search(err)) => {
            state.metrics.run_failed();
            return Err(ApiError::SearchFailed(err.to_string()));
        }
        Err(err) => {
            state.metrics.run_failed();
            return Err(ApiError::Internal(err.to_string()));
        }
    };

    state.metrics.run_finished(&outcome.report);

    let run_id = outcome.report.run_id;
    let link = outcome
        .archive
        .as_ref()
        .map(|_| format!("/runs/{run_id}/archive"));
    state
        .sessions
        .set_archive(&token, run_id, outcome.archive)
        .await;

    Ok(Html(pages::result_page(&outcome.report, link.as_deref())))
}

/// One-shot archive download (GET /runs/{run_id}/archive)
pub async fn download_archive(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Path(run_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bundle = state
        .sessions
        .take_archive(&token, run_id)
        .await
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No archive is waiting for run {run_id}. It was already downloaded or replaced by a newer run."
            ))
        })?;

    state.metrics.archive_delivered();
    info!(%run_id, file = %bundle.file_name, bytes = bundle.len(), "Archive delivered");

    let disposition = attachment_disposition(&bundle.file_name);
    let mut response = Response::new(Body::from(bundle.content));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ZIP_CONTENT_TYPE));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}
