//! Embedding provider seam. The scorer only sees `Arc<dyn EmbeddingProvider>`; concrete
//! backends live in `embedding_client`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_retry::RetryError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Transport(#[from] RetryError),

    #[error("embedding response could not be decoded: {0}")]
    Decode(String),

    #[error("provider returned {actual} vectors for {expected} sentences")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("provider returned vectors of mixed dimension ({expected} and {actual})")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider returned an empty vector")]
    EmptyVector,

    #[error("embedding provider failed: {0}")]
    Provider(String),
}

/// A unit-length embedding. Construct with `normalized` unless the values are already unit length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// L2-normalizes `values`. A zero vector is kept as-is.
    pub fn normalized(values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            Self(values.into_iter().map(|v| v / norm).collect())
        } else {
            Self(values)
        }
    }

    /// Wraps values that are already unit length.
    #[cfg(test)]
    pub fn from_unit(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity. Both vectors are unit length, so this is the dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Maps sentences to unit-normalized vectors, one per input and in input order.
///
/// Implementations own their batching, retry, and transport policy. Any failure is terminal for
/// the scoring request that triggered it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError>;

    /// Short backend label for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Checks a provider response against the request: one vector per sentence, all the same
/// non-zero dimension.
pub fn validate_embeddings(
    expected: usize,
    vectors: &[EmbeddingVector],
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::LengthMismatch {
            expected,
            actual: vectors.len(),
        });
    }

    let Some(first) = vectors.first() else {
        return Ok(());
    };
    if first.dim() == 0 {
        return Err(EmbeddingError::EmptyVector);
    }
    if let Some(other) = vectors.iter().find(|v| v.dim() != first.dim()) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: first.dim(),
            actual: other.dim(),
        });
    }
    Ok(())
}
