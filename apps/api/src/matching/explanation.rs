//! Human-readable score report: header, one line per requirement, and weak-coverage call-outs.

use crate::matching::aggregate::similarity_pct;
use crate::matching::segmenter::Sentence;
use crate::matching::similarity::MatchResult;

/// Below this overall score the report lists weakly matched requirements.
pub const IMPROVEMENT_SCORE_THRESHOLD: f64 = 50.0;
/// Match lines under this percentage count as weak.
pub const WEAK_MATCH_PCT: f64 = 50.0;

const IMPROVEMENT_HEADER: &str = "Areas for improvement: Focus on enhancing resume sections \
    related to these weakly matched job description parts:";

/// Renders the explanation string for a scored pair of documents.
///
/// `matches` indexes into `requirements` and `candidates`; entries pointing outside either slice
/// are skipped.
pub fn explain(
    requirements: &[Sentence],
    candidates: &[Sentence],
    matches: &[MatchResult],
    score: f64,
    preview_chars: usize,
) -> String {
    let lines: Vec<(f64, String)> = matches
        .iter()
        .filter_map(|m| {
            let requirement = requirements.get(m.requirement_index)?;
            let candidate = candidates.get(m.candidate_index)?;
            let pct = similarity_pct(m.similarity);
            Some((
                pct,
                format!(
                    "Requirement part: '{}...' matched to Candidate: '{}...' with similarity {}%",
                    preview(&requirement.text, preview_chars),
                    preview(&candidate.text, preview_chars),
                    format_pct(pct)
                ),
            ))
        })
        .collect();

    let mut explanation = format!(
        "Overall semantic match score: {}%\n\nDetailed matches:\n{}",
        format_pct(score),
        lines
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    );

    if score < IMPROVEMENT_SCORE_THRESHOLD {
        let weak: Vec<&str> = lines
            .iter()
            .filter(|(pct, _)| *pct < WEAK_MATCH_PCT)
            .map(|(_, line)| line.as_str())
            .collect();
        if !weak.is_empty() {
            explanation.push_str("\n\n");
            explanation.push_str(IMPROVEMENT_HEADER);
            explanation.push('\n');
            explanation.push_str(&weak.join("\n"));
        }
    }

    explanation
}

/// Shortest round-trip form, keeping `.0` on whole numbers (`80.0`, `12.35`).
fn format_pct(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Sentence {
                text: t.to_string(),
                index,
            })
            .collect()
    }

    fn m(requirement_index: usize, candidate_index: usize, similarity: f32) -> MatchResult {
        MatchResult {
            requirement_index,
            candidate_index,
            similarity,
        }
    }

    #[test]
    fn test_header_and_match_lines() {
        let reqs = sentences(&["Must know Python well."]);
        let cands = sentences(&["Experienced in Python and distributed systems."]);
        let text = explain(&reqs, &cands, &[m(0, 0, 0.8)], 80.0, 100);

        assert!(text.starts_with("Overall semantic match score: 80.0%\n\nDetailed matches:\n"));
        assert!(text.contains(
            "Requirement part: 'Must know Python well....' matched to Candidate: \
             'Experienced in Python and distributed systems....' with similarity 80.0%"
        ));
    }

    #[test]
    fn test_previews_are_truncated() {
        let long = "x".repeat(150);
        let reqs = sentences(&[&long]);
        let cands = sentences(&[&long]);
        let text = explain(&reqs, &cands, &[m(0, 0, 1.0)], 100.0, 100);

        let expected = format!("'{}...'", "x".repeat(100));
        assert_eq!(text.matches(&expected).count(), 2);
        assert!(!text.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("ééééé", 3), "ééé");
        assert_eq!(preview("short", 100), "short");
    }

    #[test]
    fn test_no_improvement_section_at_or_above_50() {
        let reqs = sentences(&["Must know Python well.", "Must know SQL databases."]);
        let cands = sentences(&["Experienced in Python and distributed systems."]);
        let text = explain(&reqs, &cands, &[m(0, 0, 0.9), m(1, 0, 0.1)], 50.0, 100);

        assert!(!text.contains("Areas for improvement"));
    }

    #[test]
    fn test_improvement_section_lists_only_weak_lines() {
        let reqs = sentences(&[
            "Must know Python well.",
            "Must know SQL databases.",
            "Must know Kafka streams.",
        ]);
        let cands = sentences(&["Experienced in Python and distributed systems."]);
        let matches = [m(0, 0, 0.9), m(1, 0, 0.2), m(2, 0, 0.3)];
        let text = explain(&reqs, &cands, &matches, 46.67, 100);

        let (_, improvements) = text
            .split_once("Areas for improvement")
            .expect("improvement section present");
        assert!(!improvements.contains("Python well"));
        let sql = improvements.find("SQL databases").unwrap();
        let kafka = improvements.find("Kafka streams").unwrap();
        assert!(sql < kafka);
    }

    #[test]
    fn test_low_score_without_weak_lines_has_no_section() {
        let reqs = sentences(&["Must know Python well."]);
        let cands = sentences(&["Experienced in Python and distributed systems."]);
        // score and per-line pct disagree only if the caller passes an inconsistent score
        let text = explain(&reqs, &cands, &[m(0, 0, 0.6)], 40.0, 100);
        assert!(!text.contains("Areas for improvement"));
    }

    #[test]
    fn test_fractional_percentages_are_rounded() {
        let reqs = sentences(&["Must know Python well."]);
        let cands = sentences(&["Experienced in Python and distributed systems."]);
        let text = explain(&reqs, &cands, &[m(0, 0, 0.123456)], 12.35, 100);
        assert!(text.contains("with similarity 12.35%"));
    }

    #[test]
    fn test_whole_percentages_keep_one_decimal() {
        assert_eq!(format_pct(80.0), "80.0");
        assert_eq!(format_pct(0.0), "0.0");
        assert_eq!(format_pct(100.0), "100.0");
        assert_eq!(format_pct(46.67), "46.67");
        assert_eq!(format_pct(40.5), "40.5");
    }
}
