use std::sync::Arc;

use server::config::ServerConfig;
use server::llm::{LlmChat, LlmClient};
use server::routes;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = ServerConfig::from_env();

    // Non-fatal: copy generation answers 503 until the LLM is configured.
    let llm = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client) as Arc<dyn LlmChat>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, AI copy disabled");
            None
        }
    };

    let state = AppState::new(&config, llm);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(
        port = config.port,
        completion_probability = config.gateway.completion_probability(),
        "poster studio server listening"
    );
    axum::serve(listener, app).await
}
