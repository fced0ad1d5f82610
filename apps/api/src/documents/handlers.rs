use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::extract::extract_upload;
use crate::documents::upload::read_multipart;
use crate::errors::AppError;
use crate::state::AppState;

/// Characters of extracted text echoed back by `/api/parse`.
pub const PARSE_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub ok: bool,
    pub ext: String,
    pub chars: usize,
    pub preview: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub ok: bool,
    pub summary: Vec<String>,
}

/// POST /api/parse
///
/// Extracts text from an uploaded PDF or TXT and returns its length and a preview.
pub async fn handle_parse(multipart: Multipart) -> Result<Json<ParseResponse>, AppError> {
    let upload = read_multipart(multipart).await?.take_file()?;
    let extracted = extract_upload(upload).await?;
    let text = extracted.text();

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No extractable text found in the file.".to_string(),
        ));
    }

    Ok(Json(ParseResponse {
        ok: true,
        ext: extracted.kind.extension().to_string(),
        chars: text.chars().count(),
        preview: text.chars().take(PARSE_PREVIEW_CHARS).collect(),
    }))
}

/// POST /api/summarize
///
/// Summarizes an uploaded résumé into at most five bullets. 503 when no LLM key is configured.
pub async fn handle_summarize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SummarizeResponse>, AppError> {
    let llm = state.llm.as_ref().ok_or_else(|| {
        AppError::Unavailable("Summarization is not configured on this server".to_string())
    })?;

    let upload = read_multipart(multipart).await?.take_file()?;
    let text = extract_upload(upload).await?.text();
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No extractable text found in the file.".to_string(),
        ));
    }

    let summary = llm.summarize_resume(&text).await?;
    Ok(Json(SummarizeResponse { ok: true, summary }))
}
