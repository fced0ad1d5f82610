use serde::{Deserialize, Serialize};

use crate::matching::embedder::EmbeddingVector;

/// Best candidate for one requirement sentence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub requirement_index: usize,
    pub candidate_index: usize,
    /// Cosine similarity, clamped to [-1, 1].
    pub similarity: f32,
}

/// For each requirement vector, finds the candidate with the highest dot product.
///
/// Ties keep the lowest candidate index. Returns one entry per requirement, in order.
/// Callers must not pass an empty candidate slice; the scorer short-circuits that case.
pub fn best_matches(
    requirements: &[EmbeddingVector],
    candidates: &[EmbeddingVector],
) -> Vec<MatchResult> {
    debug_assert!(!candidates.is_empty(), "best_matches needs candidates");

    requirements
        .iter()
        .enumerate()
        .filter_map(|(requirement_index, r)| {
            let (candidate_index, similarity) = best_candidate(r, candidates)?;
            Some(MatchResult {
                requirement_index,
                candidate_index,
                similarity: similarity.clamp(-1.0, 1.0),
            })
        })
        .collect()
}

fn best_candidate(requirement: &EmbeddingVector, candidates: &[EmbeddingVector]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (j, c) in candidates.iter().enumerate() {
        let sim = requirement.dot(c);
        match best {
            Some((_, best_sim)) if sim <= best_sim => {}
            _ => best = Some((j, sim)),
        }
    }
    best
}
