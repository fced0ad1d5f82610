mod config;
mod documents;
mod embedding_client;
mod errors;
mod http_retry;
mod llm_client;
mod matching;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::embedding_client::{HashedTokenEmbedder, HttpEmbeddingProvider};
use crate::llm_client::LlmClient;
use crate::matching::{EmbeddingProvider, SemanticScorer};
use crate::routes::{build_cors, build_router};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding backend
    let embedder = build_embedder(&config)?;
    info!(
        "Embedding backend: {} (model: {})",
        embedder.backend(),
        config.embedding_model
    );

    let scorer = Arc::new(SemanticScorer::new(embedder, config.matching));
    info!(
        "Matching config: min_sentence_chars={}, preview_chars={}",
        config.matching.min_sentence_chars, config.matching.preview_chars
    );

    // Initialize LLM client (optional; only /api/summarize needs it)
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone()).context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; /api/summarize is disabled");
            None
        }
    };

    let cors = build_cors(&config.allowed_origins)?;

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the embedding provider selected by EMBEDDING_BACKEND.
fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding_backend {
        EmbeddingBackend::Http => {
            let url = config
                .embedding_api_url
                .clone()
                .context("EMBEDDING_API_URL is required for the http backend")?;
            let provider = HttpEmbeddingProvider::new(
                url,
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
                config.embedding_batch_size,
            )?;
            Ok(Arc::new(provider))
        }
        EmbeddingBackend::Hashed => {
            warn!("Using hashed token embeddings; scores reflect word overlap, not meaning");
            Ok(Arc::new(HashedTokenEmbedder::new(config.hashed_embedding_dim)))
        }
    }
}
