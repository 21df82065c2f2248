use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use super::{
    auth::require_session,
    services::{download_archive, health, index, login, logout, start_run},
    state::AppState,
};
use crate::config::Config;
use crate::pipeline::Pipeline;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_form_bytes.as_u64() as usize;

    let protected = Router::new()
        .route("/runs", post(start_run))
        .route("/runs/{run_id}/archive", get(download_archive))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
}

/// Serve the web surface until Ctrl+C or SIGTERM.
///
/// `address` overrides `server.bind_addr` from configuration.
pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    let address = address.unwrap_or(config.server.bind_addr);

    let pipeline =
        Pipeline::from_config(&config).map_err(|e| format!("Failed to set up pipeline: {}", e))?;
    let state = AppState::new(config, pipeline)
        .map_err(|e| format!("Failed to set up web surface: {}", e))?;

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "vidbundle listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
