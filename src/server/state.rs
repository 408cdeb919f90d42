//! Server state and configuration.

use std::sync::Arc;

use crate::render::Poster;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            body_limit: 20 * 1024 * 1024,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: Arc<Poster>,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: Poster) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
        }
    }
}
