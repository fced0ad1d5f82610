//! Axum route handlers for scoring.

use axum::{
    extract::{Multipart, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::extract::extract_upload;
use crate::documents::upload::read_multipart;
use crate::errors::AppError;
use crate::matching::aggregate::round2;
use crate::matching::lexical::ratio;
use crate::matching::scorer::ScoreResult;
use crate::matching::similarity::MatchResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub ok: bool,
    pub score: f64,
    pub explanation: String,
    pub matches: Vec<MatchResult>,
}

impl From<ScoreResult> for ScoreResponse {
    fn from(result: ScoreResult) -> Self {
        Self {
            ok: true,
            score: result.score,
            explanation: result.explanation,
            matches: result.matches,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreTextRequest {
    pub job_description: String,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    pub score: f64,
    pub explanation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/score
///
/// Multipart: `file` (PDF or TXT résumé) and `job_desc` (plain text).
/// An empty `job_desc` is scored, not rejected; it yields the zero-score explanation.
pub async fn handle_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let mut form = read_multipart(multipart).await?;
    let job_desc = form
        .take_field("job_desc")
        .ok_or_else(|| AppError::Validation("job_desc is required".to_string()))?;
    let upload = form.take_file()?;

    let resume_text = extract_upload(upload).await?.text();
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Empty resume text after extraction.".to_string(),
        ));
    }

    let result = state.scorer.score(&job_desc, &resume_text).await?;
    Ok(Json(result.into()))
}

/// POST /api/score/text
///
/// Same as `/api/score` for callers that already hold both texts.
pub async fn handle_score_text(
    State(state): State<AppState>,
    Json(request): Json<ScoreTextRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let result = state
        .scorer
        .score(&request.job_description, &request.resume_text)
        .await?;
    Ok(Json(result.into()))
}

/// POST /api/compare
///
/// Character-level similarity of the raw texts. No embeddings involved.
/// The match search is quadratic in the input lengths, so it runs on the blocking pool.
pub async fn handle_compare(
    Form(request): Form<CompareRequest>,
) -> Result<Json<CompareResponse>, AppError> {
    let pct = tokio::task::spawn_blocking(move || {
        ratio(&request.resume_text, &request.job_description) * 100.0
    })
    .await
    .map_err(|e| anyhow::anyhow!("compare task failed: {e}"))?;

    Ok(Json(CompareResponse {
        score: round2(pct),
        explanation: format!(
            "The resume matches {pct:.2}% with the job description based on text similarity."
        ),
    }))
}
