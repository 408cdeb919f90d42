//! # HTTP Server for Poster Rendering
//!
//! Exposes the composition engine over HTTP.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /create` | JSON render request, answers `image/jpeg` |
//! | `POST /create/form` | Multipart request with raw image uploads |
//! | `GET /health` | Liveness probe |
//!
//! ## Usage
//!
//! ```bash
//! poster serve --listen 0.0.0.0:8080 --font-dir ./resources/fonts
//! ```

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{PosterError, Result};
use crate::render::Poster;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit;
    Router::new()
        .route("/create", post(handlers::poster::create))
        .route("/create/form", post(handlers::poster::create_form))
        .route("/health", get(handlers::poster::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM.
///
/// ## Example
///
/// ```no_run
/// use poster::server::{serve, ServerConfig};
/// use poster::{Poster, PosterConfig};
///
/// # async fn example() -> poster::Result<()> {
/// let engine = Poster::from_config(PosterConfig::default())?;
/// serve(ServerConfig::default(), engine).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, engine: Poster) -> Result<()> {
    let listen_addr = config.listen_addr.clone();
    let app = router(Arc::new(AppState::new(config, engine)));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| PosterError::Config(format!("Failed to bind to {}: {}", listen_addr, e)))?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        address = %listen_addr,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received, starting graceful shutdown");
}
