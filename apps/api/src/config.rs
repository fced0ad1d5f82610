use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::matching::MatchingConfig;

/// Which embedding backend the scorer is wired to at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/v1/embeddings` endpoint.
    Http,
    /// Deterministic offline feature hashing. Local development only.
    Hashed,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(EmbeddingBackend::Http),
            "hashed" => Ok(EmbeddingBackend::Hashed),
            other => bail!("EMBEDDING_BACKEND must be 'http' or 'hashed', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub allowed_origins: Vec<String>,
    pub embedding_backend: EmbeddingBackend,
    /// Required when `embedding_backend` is `Http`.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_batch_size: usize,
    pub hashed_embedding_dim: usize,
    /// `/api/summarize` answers 503 while this is unset.
    pub anthropic_api_key: Option<String>,
    pub max_upload_bytes: usize,
    pub matching: MatchingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_backend: EmbeddingBackend =
            env_or("EMBEDDING_BACKEND", "http").parse()?;
        let embedding_api_url = optional_env("EMBEDDING_API_URL");
        if embedding_backend == EmbeddingBackend::Http && embedding_api_url.is_none() {
            bail!("Required environment variable 'EMBEDDING_API_URL' is not set (EMBEDDING_BACKEND=http)");
        }

        let defaults = MatchingConfig::default();

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            allowed_origins: parse_origins(&env_or("ALLOWED_ORIGINS", "http://localhost:5173")),
            embedding_backend,
            embedding_api_url,
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: env_or("EMBEDDING_MODEL", "all-mpnet-base-v2"),
            embedding_batch_size: parse_env::<usize>("EMBEDDING_BATCH_SIZE", 64)?.max(1),
            hashed_embedding_dim: parse_env::<usize>("HASHED_EMBEDDING_DIM", 384)?.max(1),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            matching: MatchingConfig {
                min_sentence_chars: parse_env("MIN_SENTENCE_CHARS", defaults.min_sentence_chars)?,
                preview_chars: parse_env("PREVIEW_CHARS", defaults.preview_chars)?,
            },
        })
    }
}

/// Offline configuration for router tests: hashed embeddings, no LLM.
#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        port: 0,
        rust_log: "debug".to_string(),
        allowed_origins: Vec::new(),
        embedding_backend: EmbeddingBackend::Hashed,
        embedding_api_url: None,
        embedding_api_key: None,
        embedding_model: "hashed".to_string(),
        embedding_batch_size: 64,
        hashed_embedding_dim: 256,
        anthropic_api_key: None,
        max_upload_bytes: 1024 * 1024,
        matching: MatchingConfig::default(),
    }
}

/// Splits a comma-separated origin list, dropping blank entries.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
