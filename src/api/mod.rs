// API layer module (adapters for controllers)
// The HTTP surface: routing, shared state, and error mapping

pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agents::LlmClient;
use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LlmClient>,
}

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard page
        .route("/", get(handlers::dashboard::dashboard))
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Analysis routes
        .route("/api/preview", post(handlers::analyze::preview))
        .route("/api/analyze", post(handlers::analyze::analyze))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
