pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::documents::handlers as documents;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Documents
        .route("/api/parse", post(documents::handle_parse))
        .route("/api/summarize", post(documents::handle_summarize))
        // Scoring
        .route("/api/score", post(matching::handle_score))
        .route("/api/score/text", post(matching::handle_score_text))
        .route("/api/compare", post(matching::handle_compare))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// CORS for the configured origins, with credentials. An empty list mirrors any origin.
pub fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    if origins.is_empty() {
        return Ok(cors.allow_origin(AllowOrigin::mirror_request()));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}
