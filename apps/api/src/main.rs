mod auth;
mod config;
mod db;
mod errors;
mod insights;
mod llm_client;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::insights::generator::InsightGenerator;
use crate::insights::service::InsightService;
use crate::insights::store::PgInsightStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathwise API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgInsightStore::new(db));

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let generator = Arc::new(InsightGenerator::new(
        Arc::new(llm),
        config.retry_policy,
        config.market.clone(),
    ));
    info!(
        "Insight generator: {} attempts, {}ms base backoff, {} market",
        config.retry_policy.max_attempts,
        config.retry_policy.base_delay.as_millis(),
        config.market.region
    );

    let insights = Arc::new(InsightService::new(
        store,
        generator,
        config.refresh_interval(),
    ));

    if config.gateway_secret.is_none() {
        warn!("GATEWAY_SECRET is not set; forwarded user ids are trusted without a gateway check");
    }

    // Build app state
    let state = AppState {
        insights,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web frontend's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
