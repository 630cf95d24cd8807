use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use travelease::config::AppConfig;
use travelease::db::{seed, SqliteStore};
use travelease::handlers;
use travelease::services::ai::openai::OpenAiProvider;
use travelease::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = SqliteStore::open(&config.database_url)?;
    seed::seed_destinations(&store)?;

    if config.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    tracing::info!(
        "using completion API at {} (model: {})",
        config.openai_base_url,
        config.openai_model
    );
    let llm = OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        config.chat_max_tokens,
    );

    let state = Arc::new(AppState {
        store: Box::new(store),
        llm: Box::new(llm),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
