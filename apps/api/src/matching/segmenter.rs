//! Sentence segmentation: turns raw document text into ordered, noise-filtered sentences.

use serde::{Deserialize, Serialize};

/// One sentence of a document. `index` is its 0-based position among the kept sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub index: usize,
}

/// An ordered sequence of sentences extracted from one raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Sentence texts in document order, as handed to an embedding provider.
    pub fn texts(&self) -> Vec<String> {
        self.sentences.iter().map(|s| s.text.clone()).collect()
    }
}

/// A sentence segmentation strategy. Implementations must preserve source order and
/// never emit empty sentences.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Document;
}

/// Punctuation-based segmenter with a small abbreviation guard.
///
/// Splits on whitespace following `.`, `?` or `!`, except after `x.y?` shapes ("U.S.", "e.g.")
/// and after a capital plus lowercase letter and a period ("Dr.", "Mr."). Approximate: some
/// abbreviations still split and some sentence ends are missed.
#[derive(Debug, Clone)]
pub struct PunctuationSegmenter {
    /// Fragments with this many characters or fewer are dropped as noise.
    pub min_sentence_chars: usize,
}

impl Default for PunctuationSegmenter {
    fn default() -> Self {
        Self {
            min_sentence_chars: super::DEFAULT_MIN_SENTENCE_CHARS,
        }
    }
}

impl Segmenter for PunctuationSegmenter {
    fn segment(&self, text: &str) -> Document {
        let normalized = normalize_whitespace(text);
        let sentences = split_sentences(&normalized)
            .into_iter()
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_sentence_chars)
            .enumerate()
            .map(|(index, s)| Sentence {
                text: s.to_string(),
                index,
            })
            .collect();

        Document { sentences }
    }
}

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text at sentence boundaries. The boundary space is dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    for (pos, &(byte_idx, c)) in chars.iter().enumerate() {
        if c.is_whitespace() && is_boundary(&chars, pos) {
            pieces.push(&text[start..byte_idx]);
            start = byte_idx + c.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Whether the whitespace at `pos` ends a sentence.
fn is_boundary(chars: &[(usize, char)], pos: usize) -> bool {
    let before = |back: usize| pos.checked_sub(back).map(|i| chars[i].1);

    if !matches!(before(1), Some('.' | '?' | '!')) {
        return false;
    }

    // "U.S." / "e.g.": word char, period, word char, terminator
    if let (Some(a), Some('.'), Some(b)) = (before(4), before(3), before(2)) {
        if is_word_char(a) && is_word_char(b) {
            return false;
        }
    }

    // "Dr." / "Mr."
    if let (Some(a), Some(b), Some('.')) = (before(3), before(2), before(1)) {
        if a.is_ascii_uppercase() && b.is_ascii_lowercase() {
            return false;
        }
    }

    true
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
