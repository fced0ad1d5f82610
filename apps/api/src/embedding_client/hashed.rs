use async_trait::async_trait;

use crate::matching::embedder::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Offline embedder: lowercased word unigrams and bigrams hashed into signed buckets.
///
/// Deterministic and dependency-free. Similarity here is lexical overlap, so it is only meant
/// for local runs and tests, never as a stand-in when a real model fails.
#[derive(Debug, Clone)]
pub struct HashedTokenEmbedder {
    dim: usize,
}

impl HashedTokenEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_one(&self, text: &str) -> EmbeddingVector {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut values = vec![0.0_f32; self.dim];
        for token in &tokens {
            self.add_feature(&mut values, token.as_bytes(), 1.0);
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut values, bigram.as_bytes(), BIGRAM_WEIGHT);
        }
        if tokens.is_empty() {
            self.add_feature(&mut values, text.trim().as_bytes(), 1.0);
        }

        // features can cancel out; keep the vector unit length anyway
        if values.iter().all(|v| *v == 0.0) {
            values[0] = 1.0;
        }

        EmbeddingVector::normalized(values)
    }

    fn add_feature(&self, values: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dim as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        values[bucket] += sign * weight;
    }
}

#[async_trait]
impl EmbeddingProvider for HashedTokenEmbedder {
    async fn embed(&self, sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        Ok(sentences.iter().map(|s| self.embed_one(s)).collect())
    }

    fn backend(&self) -> &'static str {
        "hashed"
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}
