mod chat;
mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod notifier;
mod routes;
mod state;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::engine::TurnEngine;
use crate::config::Config;
use crate::documents::SystemContext;
use crate::llm_client::LlmClient;
use crate::notifier::PushoverNotifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::ToolRegistry;

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

    info!("Starting profile chat v{}", env!("CARGO_PKG_VERSION"));

    // Profile documents are required; a missing file stops startup
    let context = SystemContext::load(&config).context("Failed to load profile documents")?;

    // Initialize notifier
    let notifier = PushoverNotifier::new(
        config.pushover_url.clone(),
        config.pushover_user.clone(),
        config.pushover_token.clone(),
        Duration::from_secs(config.notify_timeout_secs),
    )
    .context("Failed to build notification client")?;
    if !notifier.is_configured() {
        warn!("PUSHOVER_USER/PUSHOVER_TOKEN not set; tool notifications are disabled");
    }

    // Initialize LLM client
    let llm = LlmClient::new(
        config.completion_base_url.clone(),
        config.groq_api_key.clone(),
        config.completion_model.clone(),
        Duration::from_secs(config.completion_timeout_secs),
    )
    .context("Failed to build completion client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let registry = Arc::new(ToolRegistry::new(Arc::new(notifier)));
    let engine = Arc::new(TurnEngine::new(
        Arc::new(llm),
        registry,
        Arc::new(context),
        config.max_tool_rounds,
    ));

    // Build router
    let app = build_router(AppState::new(engine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
