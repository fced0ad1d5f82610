// Semantic matching core: segment both documents, embed, pair each requirement sentence with its
// best candidate sentence, average, and explain. The embedding model sits behind `EmbeddingProvider`.

pub mod aggregate;
pub mod embedder;
pub mod explanation;
pub mod handlers;
pub mod lexical;
pub mod scorer;
pub mod segmenter;
pub mod similarity;

pub use embedder::{EmbeddingError, EmbeddingProvider};
pub use scorer::SemanticScorer;

pub const DEFAULT_MIN_SENTENCE_CHARS: usize = 10;
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Tunables for segmentation and explanation rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Sentences with this many characters or fewer are discarded.
    pub min_sentence_chars: usize,
    /// Characters of each sentence quoted in explanation lines.
    pub preview_chars: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: DEFAULT_MIN_SENTENCE_CHARS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}
