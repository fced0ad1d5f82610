use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::matching::aggregate::aggregate;
use crate::matching::embedder::{validate_embeddings, EmbeddingError, EmbeddingProvider, EmbeddingVector};
use crate::matching::explanation::explain;
use crate::matching::segmenter::{Document, PunctuationSegmenter, Segmenter};
use crate::matching::similarity::{best_matches, MatchResult};
use crate::matching::MatchingConfig;

pub const NO_REQUIREMENT_TEXT: &str = "No job description provided.";
pub const NO_REQUIREMENT_SENTENCES: &str = "Job description has no parseable content.";
pub const NO_CANDIDATE_SENTENCES: &str = "Resume has no parseable content.";

/// Outcome of scoring one requirement document against one candidate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0–100.
    pub score: f64,
    pub explanation: String,
    /// One entry per requirement sentence; empty for degenerate inputs.
    pub matches: Vec<MatchResult>,
}

impl ScoreResult {
    fn degenerate(message: &str) -> Self {
        Self {
            score: 0.0,
            explanation: message.to_string(),
            matches: Vec::new(),
        }
    }
}

/// Scores a candidate document against a requirement document by sentence-level semantic matching.
///
/// Holds no per-request state; share one instance behind an `Arc`.
pub struct SemanticScorer {
    embedder: Arc<dyn EmbeddingProvider>,
    segmenter: Box<dyn Segmenter>,
    config: MatchingConfig,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: MatchingConfig) -> Self {
        let segmenter = PunctuationSegmenter {
            min_sentence_chars: config.min_sentence_chars,
        };
        Self::with_segmenter(embedder, Box::new(segmenter), config)
    }

    pub fn with_segmenter(
        embedder: Arc<dyn EmbeddingProvider>,
        segmenter: Box<dyn Segmenter>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            embedder,
            segmenter,
            config,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.embedder.backend()
    }

    /// Degenerate inputs resolve to a zero score with a fixed message. Only an embedding
    /// failure produces an error, and it aborts the whole request.
    pub async fn score(
        &self,
        requirement_text: &str,
        candidate_text: &str,
    ) -> Result<ScoreResult, EmbeddingError> {
        if requirement_text.trim().is_empty() {
            return Ok(ScoreResult::degenerate(NO_REQUIREMENT_TEXT));
        }

        let requirements = self.segmenter.segment(requirement_text);
        if requirements.is_empty() {
            return Ok(ScoreResult::degenerate(NO_REQUIREMENT_SENTENCES));
        }

        let candidates = self.segmenter.segment(candidate_text);
        if candidates.is_empty() {
            return Ok(ScoreResult::degenerate(NO_CANDIDATE_SENTENCES));
        }

        debug!(
            "Scoring {} requirement sentences against {} candidate sentences via {}",
            requirements.len(),
            candidates.len(),
            self.embedder.backend()
        );

        let (requirement_vecs, candidate_vecs) = tokio::try_join!(
            self.embed_document(&requirements),
            self.embed_document(&candidates)
        )?;

        let matches = best_matches(&requirement_vecs, &candidate_vecs);
        let score = aggregate(&matches);
        let explanation = explain(
            &requirements.sentences,
            &candidates.sentences,
            &matches,
            score,
            self.config.preview_chars,
        );

        info!(
            "Semantic match score {score} over {} requirement sentences",
            matches.len()
        );

        Ok(ScoreResult {
            score,
            explanation,
            matches,
        })
    }

    async fn embed_document(&self, document: &Document) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let vectors = self.embedder.embed(&document.texts()).await?;
        validate_embeddings(document.len(), &vectors)?;
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;
    use crate::embedding_client::HashedTokenEmbedder;

    /// Maps known sentences to fixed vectors; anything else gets `fallback`.
    struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
        calls: AtomicUsize,
    }

    impl TableEmbedder {
        fn new(entries: &[(&str, [f32; 3])], fallback: [f32; 3]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
                fallback: fallback.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sentences
                .iter()
                .map(|s| {
                    let raw = self.table.get(s).unwrap_or(&self.fallback).clone();
                    EmbeddingVector::normalized(raw)
                })
                .collect())
        }

        fn backend(&self) -> &'static str {
            "table"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
            Err(EmbeddingError::Provider("model not loaded".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    /// Returns one vector fewer than it was asked for.
    struct ShortEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ShortEmbedder {
        async fn embed(&self, sentences: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
            Ok(sentences
                .iter()
                .skip(1)
                .map(|_| EmbeddingVector::from_unit(vec![1.0]))
                .collect())
        }

        fn backend(&self) -> &'static str {
            "short"
        }
    }

    fn scorer(embedder: impl EmbeddingProvider + 'static) -> SemanticScorer {
        SemanticScorer::new(Arc::new(embedder), MatchingConfig::default())
    }

    fn hashed_scorer() -> SemanticScorer {
        scorer(HashedTokenEmbedder::new(256))
    }

    const PYTHON_REQ: &str = "Must know Python programming.";
    const SQL_REQ: &str = "Must know SQL query tuning.";
    const PYTHON_CAND: &str = "Experienced in Python and distributed systems.";

    fn python_sql_embedder() -> TableEmbedder {
        TableEmbedder::new(
            &[
                (PYTHON_REQ, [1.0, 0.0, 0.0]),
                (SQL_REQ, [0.0, 1.0, 0.0]),
                (PYTHON_CAND, [0.8, 0.0, 0.6]),
            ],
            [0.0, 0.0, 1.0],
        )
    }

    #[tokio::test]
    async fn test_empty_requirement_text() {
        let s = scorer(FailingEmbedder);
        for requirement in ["", "   ", "\n\t"] {
            let result = s.score(requirement, PYTHON_CAND).await.unwrap();
            assert_eq!(result.score, 0.0);
            assert_eq!(result.explanation, NO_REQUIREMENT_TEXT);
            assert!(result.matches.is_empty());
        }
    }

    #[tokio::test]
    async fn test_requirement_of_short_fragments_has_no_content() {
        let result = scorer(FailingEmbedder)
            .score("Python. SQL. Git. Rust.", PYTHON_CAND)
            .await
            .unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.explanation, NO_REQUIREMENT_SENTENCES);
    }

    #[tokio::test]
    async fn test_candidate_without_sentences() {
        let result = scorer(FailingEmbedder)
            .score(PYTHON_REQ, "Python. SQL.")
            .await
            .unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.explanation, NO_CANDIDATE_SENTENCES);
    }

    #[tokio::test]
    async fn test_degenerate_inputs_never_call_the_provider() {
        let embedder = Arc::new(python_sql_embedder());
        let s = SemanticScorer::new(embedder.clone(), MatchingConfig::default());
        s.score("", PYTHON_CAND).await.unwrap();
        s.score(PYTHON_REQ, "").await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_propagated() {
        let err = scorer(FailingEmbedder)
            .score(PYTHON_REQ, PYTHON_CAND)
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Provider(_)));
    }

    #[tokio::test]
    async fn test_short_provider_response_is_an_error() {
        let err = scorer(ShortEmbedder)
            .score(PYTHON_REQ, PYTHON_CAND)
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::LengthMismatch { .. }));
    }

    #[tokio::test]
    async fn test_python_sql_example() {
        let requirement = format!("{PYTHON_REQ} {SQL_REQ}");
        let result = scorer(python_sql_embedder())
            .score(&requirement, PYTHON_CAND)
            .await
            .unwrap();

        assert_eq!(result.matches.len(), 2);
        assert!((result.matches[0].similarity - 0.8).abs() < 1e-5);
        assert!(result.matches[1].similarity.abs() < 1e-5);

        let mean = (result.matches[0].similarity + result.matches[1].similarity) as f64 / 2.0;
        assert!((result.score - mean * 100.0).abs() < 0.01);
        assert!(result.score < 50.0);

        let (details, improvements) = result
            .explanation
            .split_once("Areas for improvement")
            .expect("low score lists weak requirements");
        assert!(details.contains("Must know Python programming."));
        assert!(improvements.contains("Must know SQL query tuning."));
        assert!(!improvements.contains("Must know Python programming."));
    }

    #[tokio::test]
    async fn test_high_score_has_no_improvement_section() {
        let result = scorer(python_sql_embedder())
            .score(PYTHON_REQ, PYTHON_CAND)
            .await
            .unwrap();
        assert!(result.score >= 50.0);
        assert!(!result.explanation.contains("Areas for improvement"));
    }

    #[tokio::test]
    async fn test_matches_follow_requirement_count() {
        let requirement = "Designs resilient payment services. Writes clear technical documents.";
        let candidate = "Built payment services for five years. Wrote design documents. \
                         Mentored engineers on the platform team.";
        let result = hashed_scorer().score(requirement, candidate).await.unwrap();
        assert_eq!(result.matches.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_documents_score_near_100() {
        let text = "Designed a streaming ingestion pipeline in Rust. \
                    Operated Postgres clusters at scale. \
                    Led incident reviews for the payments team.";
        let result = hashed_scorer().score(text, text).await.unwrap();

        for (i, m) in result.matches.iter().enumerate() {
            assert_eq!(m.requirement_index, i);
            assert_eq!(m.candidate_index, i);
        }
        assert!(result.score > 99.9, "got {}", result.score);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let s = hashed_scorer();
        let requirement = "Needs Kubernetes operations experience. Must write Go services.";
        let candidate = "Ran Kubernetes clusters in production. Wrote services in Go and Rust.";
        let first = s.score(requirement, candidate).await.unwrap();
        let second = s.score(requirement, candidate).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_preview_length_is_configurable() {
        let s = SemanticScorer::new(
            Arc::new(HashedTokenEmbedder::new(64)),
            MatchingConfig {
                min_sentence_chars: 10,
                preview_chars: 5,
            },
        );
        let result = s
            .score("Must know Python programming.", PYTHON_CAND)
            .await
            .unwrap();
        assert!(result.explanation.contains("Requirement part: 'Must ...'"));
        assert!(result.explanation.contains("Candidate: 'Exper...'"));
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(
            requirement in "[a-zA-Z .!?\n]{0,200}",
            candidate in "[a-zA-Z .!?\n]{0,200}",
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let result = runtime
                .block_on(hashed_scorer().score(&requirement, &candidate))
                .unwrap();
            prop_assert!((0.0..=100.0).contains(&result.score));
            if !result.matches.is_empty() {
                let sentences = PunctuationSegmenter::default().segment(&requirement);
                prop_assert_eq!(result.matches.len(), sentences.len());
            }
        }
    }
}
