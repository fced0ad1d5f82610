//! LLM Client: the single point of entry for Claude API calls in the screener.
//!
//! Only résumé summarization uses it. Scoring never does; it runs on embeddings alone.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::http_retry::{send_with_retry, RetryError, DEFAULT_MAX_RETRIES};

pub mod prompts;

use prompts::{SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
/// Longer résumés are cut to this many characters before summarization.
pub const SUMMARY_INPUT_CHARS: usize = 3000;
pub const MAX_SUMMARY_BULLETS: usize = 5;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Transport(#[from] RetryError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary: Vec<String>,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Summarizes a résumé into at most `MAX_SUMMARY_BULLETS` short bullets.
    pub async fn summarize_resume(&self, text: &str) -> Result<Vec<String>, LlmError> {
        let excerpt = truncate_chars(text, SUMMARY_INPUT_CHARS);
        let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{resume_text}", excerpt);
        let payload: SummaryPayload = self.call_json(&prompt, SUMMARY_SYSTEM).await?;
        Ok(clean_bullets(payload.summary))
    }

    /// Calls the Messages API and deserializes the first text block as JSON.
    async fn call_json<T: DeserializeOwned>(&self, prompt: &str, system: &str) -> Result<T, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = send_with_retry("LLM call", DEFAULT_MAX_RETRIES, || {
            self.client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
        })
        .await
        .map_err(|e| LlmError::Transport(with_api_message(e)))?;

        let response: MessagesResponse = response.json().await?;
        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            response.usage.input_tokens, response.usage.output_tokens
        );

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(strip_json_fences(text))?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Replaces a raw JSON error body with the API's own `error.message` when it has one.
fn with_api_message(err: RetryError) -> RetryError {
    match err {
        RetryError::Api { status, message } => {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&message)
                .map(|e| e.error.message)
                .unwrap_or(message);
            RetryError::Api { status, message }
        }
        other => other,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn clean_bullets(bullets: Vec<String>) -> Vec<String> {
    bullets
        .into_iter()
        .map(|b| b.trim().trim_start_matches(['-', '•', '*']).trim().to_string())
        .filter(|b| !b.is_empty())
        .take(MAX_SUMMARY_BULLETS)
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
        }
        None => text,
    }
}
