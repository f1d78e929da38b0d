//! HTTP boundary: routes, parameter parsing, error mapping.
//!
//! | route | |
//! |-------|-|
//! | `POST /preview` | render a preview of the request body |
//! | `GET /health`   | liveness, always `ok` |
//! | `GET /version`  | crate name and version |
//! | `GET /`         | upload form |
//!
//! Every preview failure is a `400` with `{"error": ..., "code": 400}`.

pub mod error;
mod handlers;
mod middleware;

use crate::preview::Previewer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Router};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub previewer: Previewer,
}

/// Build the service router around `previewer`.
pub fn build_router(previewer: Previewer) -> Router {
    let body_limit = previewer.config().max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/preview", post(handlers::preview))
        .with_state(AppState { previewer })
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::log_responses))
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, previewer: Previewer) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, build_router(previewer))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        // No signal handler available: run until the process is killed.
        Err(_) => std::future::pending::<()>().await,
    }
}
