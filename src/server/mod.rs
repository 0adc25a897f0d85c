//! HTTP surface over [`App`]
//!
//! Routes mirror the paths the web frontend calls: generation endpoints plus
//! read/clear endpoints for the two history logs.

pub mod error;
pub mod routes;

pub use error::ApiError;

use crate::app::App;
use crate::Result;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Application handle shared by every request handler.
pub type SharedApp = Arc<App>;

pub fn router(app: SharedApp, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/generate", post(routes::generate_text))
        .route("/api/generate-image", post(routes::generate_image))
        .route(
            "/api/history",
            get(routes::text_history).delete(routes::clear_history),
        )
        .route(
            "/api/image-history",
            get(routes::image_history).delete(routes::clear_image_history),
        )
        .layer(cors_layer(allowed_origins))
        .with_state(app)
}

/// `*` anywhere in the list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Serve until Ctrl-C.
pub async fn serve(app: SharedApp, bind_addr: &str, allowed_origins: &[String]) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(app, allowed_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
