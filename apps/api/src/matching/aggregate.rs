use crate::matching::similarity::MatchResult;

/// Mean best-match similarity scaled to 0–100 and rounded to 2 decimals.
///
/// A negative mean clamps to 0. Must not be called with an empty slice.
pub fn aggregate(matches: &[MatchResult]) -> f64 {
    debug_assert!(!matches.is_empty(), "aggregate needs at least one match");
    if matches.is_empty() {
        return 0.0;
    }

    let mean = matches.iter().map(|m| f64::from(m.similarity)).sum::<f64>() / matches.len() as f64;
    round2(mean * 100.0).clamp(0.0, 100.0)
}

/// Similarity as a percentage rounded to 2 decimals, as shown in explanations.
pub fn similarity_pct(similarity: f32) -> f64 {
    round2(f64::from(similarity) * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
