use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::SemanticScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless across requests; one instance serves every handler.
    pub scorer: Arc<SemanticScorer>,
    /// `None` when ANTHROPIC_API_KEY is unset. `/api/summarize` then answers 503.
    pub llm: Option<LlmClient>,
}
