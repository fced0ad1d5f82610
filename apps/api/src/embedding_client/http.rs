use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_retry::{send_with_retry, DEFAULT_MAX_RETRIES};
use crate::matching::embedder::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint (OpenAI, text-embeddings-inference,
/// vLLM, Ollama).
///
/// Sends at most `batch_size` sentences per request and retries 429/5xx with backoff.
/// Returned vectors are re-normalized, so endpoints that skip normalization still satisfy
/// the unit-length contract.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    batch_size: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(
        url: String,
        api_key: Option<String>,
        model: String,
        batch_size: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EmbeddingError::Provider(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            api_key,
            model,
            batch_size: batch_size.max(1),
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: batch,
        };

        let response = send_with_retry("Embedding request", DEFAULT_MAX_RETRIES, || {
            let request = self.client.post(&self.url).json(&body);
            match &self.api_key {
                Some(key) => request.bearer_auth(key),
                None => request,
            }
        })
        .await?;

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        decode_batch(batch.len(), payload)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(sentences.len());
        for batch in sentences.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        debug!(
            "Embedded {} sentences with {} in {} requests",
            sentences.len(),
            self.model,
            sentences.len().div_ceil(self.batch_size)
        );
        Ok(vectors)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

/// Puts the response back in input order and normalizes each vector.
///
/// When every datum carries an `index`, the indices must be exactly `0..expected`.
/// Without indices the response order is trusted.
fn decode_batch(
    expected: usize,
    payload: EmbeddingResponse,
) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    let mut data = payload.data;
    if data.len() != expected {
        return Err(EmbeddingError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
        let in_order = data
            .iter()
            .enumerate()
            .all(|(i, d)| d.index == Some(i));
        if !in_order {
            return Err(EmbeddingError::Decode(
                "response indices do not cover the request".to_string(),
            ));
        }
    }

    Ok(data
        .into_iter()
        .map(|d| EmbeddingVector::normalized(d.embedding))
        .collect())
}
