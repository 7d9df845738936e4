//! HTTP API
//!
//! JSON endpoints over [`storymem_core::StoryMemory`]. Every route except
//! `/health` sits behind bearer token authentication.

mod auth;
mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Maximum requests handled at once
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let protected = Router::new()
        // Profiles
        .route("/children", post(handlers::create_child))
        .route("/children/{id}", get(handlers::get_child))
        // Stories
        .route("/stories", post(handlers::save_story))
        .route("/stories/search", get(handlers::search_stories))
        .route("/stories/latest/{child_id}", get(handlers::latest_story))
        .route("/stories/{child_id}", get(handlers::list_stories))
        // Feedback & progress
        .route("/feedback", post(handlers::save_feedback))
        .route("/progress/{child_id}", get(handlers::get_progress))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .concurrency_limit(MAX_CONCURRENT_REQUESTS)
                .layer(cors),
        )
        .with_state(state)
}

/// Serve `router` on `listener` until Ctrl+C or SIGTERM
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Storymem API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Storymem API shutting down");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
