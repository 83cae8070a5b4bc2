use std::net::SocketAddr;
use std::sync::Arc;

use insightcrew_api::agents::GeminiClient;
use insightcrew_api::api::{router, AppState};
use insightcrew_api::config::AppConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();
    if config.gemini_api_key.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY not set; runs will require a key from the dashboard sidebar"
        );
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        llm: Arc::new(GeminiClient::new()),
    };

    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Dashboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
