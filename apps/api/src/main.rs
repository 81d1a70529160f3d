mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod workbook;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::cost::Pricing;
use crate::llm_client::{CompletionClient, OpenAiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting titlegen v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client. A missing key is reported on first use, not here.
    let llm = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    )?;
    match llm.ensure_configured() {
        Ok(()) => info!("LLM client initialized (model: {})", llm.model()),
        Err(e) => warn!("LLM client initialized without credentials: {e}"),
    }

    let pricing = Pricing::default();
    info!(
        "Pricing: ${}/1M input tokens, ${}/1M output tokens",
        pricing.input_per_million, pricing.output_per_million
    );

    let state = AppState {
        llm: Arc::new(llm),
        pricing,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
