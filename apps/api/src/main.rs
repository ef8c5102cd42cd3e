mod agents;
mod config;
mod db;
mod errors;
mod history;
mod llm_client;
mod matching;
mod materials;
mod models;
mod opportunities;
mod profile;
mod repository;
mod routes;
mod schema;
mod state;
mod strategy;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::anthropic::AnthropicProvider;
use crate::llm_client::LlmClient;
use crate::repository::postgres::PgRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ScholarMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    let repo = Arc::new(PgRepository::new(pool));

    // Initialize LLM client
    let provider = AnthropicProvider::new(config.anthropic_api_key.clone(), config.llm_timeout)
        .context("failed to build LLM HTTP client")?;
    let llm = LlmClient::new(Arc::new(provider), config.llm_timeout);
    info!(
        model = llm_client::DEFAULT_MODEL,
        timeout_secs = config.llm_timeout.as_secs(),
        "LLM client initialized"
    );

    let state = AppState { repo, llm };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.frontend_url.as_deref())?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Restricts CORS to the frontend origin when one is configured.
fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer> {
    match frontend_url {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .with_context(|| format!("FRONTEND_URL is not a valid origin: {origin}"))?;
            info!(?origin, "CORS restricted to frontend origin");
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
        None => Ok(CorsLayer::permissive()),
    }
}
