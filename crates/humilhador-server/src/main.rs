use std::sync::Arc;
use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use humilhador_core::{Config, GithubClient, OpenAIClient, RoastService};
use humilhador_server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set (env var or config file)"))?;

    let profiles = GithubClient::new(&config.github_api_url);
    let generator = OpenAIClient::with_endpoint(&api_key, &config.openai_base_url, &config.model);
    tracing::info!("Using model {} at {}", generator.model(), config.openai_base_url);

    let service = RoastService::new(Arc::new(profiles), Arc::new(generator));
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
