//! Post-processing of RAG answers.
//!
//! Pulls cited canonical incident ids out of the answer text and estimates
//! how many records backed the answer. Legacy short-numeric ids appearing
//! in an answer indicate stale cache or unmigrated rows; they are logged
//! as data-quality warnings and never surfaced to the caller.

use crate::ident;

/// Domain keywords used to estimate context size when the answer cites no
/// ids. Each backing record tends to contribute a handful of these.
const CONTEXT_KEYWORDS: &[&str] = &["incident", "severity:", "status:", "location:"];

const KEYWORDS_PER_RECORD: usize = 4;
const KEYWORD_FLOOR: usize = 10;

/// What an answer told us about the records behind it.
#[derive(Debug, PartialEq, Eq)]
pub struct AnswerAnalysis {
    /// Canonical incident ids cited in the answer, first-mention order.
    pub incident_refs: Vec<String>,
    /// Estimated number of records used as context, when determinable.
    pub context_size: Option<usize>,
}

/// Analyze an answer returned by the RAG service.
///
/// `query` is only used to contextualize data-quality warnings.
pub fn analyze_answer(response_text: &str, query: &str) -> AnswerAnalysis {
    let legacy = ident::extract_legacy_refs(response_text);
    if !legacy.is_empty() {
        tracing::warn!("Legacy ids in AI response: {legacy:?}");
        tracing::warn!("  Query was: {query}");
        tracing::warn!("  This indicates a stale answer cache or unmigrated store rows");
    }

    let incident_refs = ident::extract_refs(response_text);

    let context_size = if incident_refs.is_empty() {
        estimate_from_keywords(response_text)
    } else {
        Some(incident_refs.len())
    };

    AnswerAnalysis {
        incident_refs,
        context_size,
    }
}

/// Heuristic context estimate: count domain keyword occurrences and divide
/// by a fixed constant. An approximation, not an exact count.
fn estimate_from_keywords(text: &str) -> Option<usize> {
    let lower = text.to_lowercase();
    let count: usize = CONTEXT_KEYWORDS
        .iter()
        .map(|kw| lower.matches(kw).count())
        .sum();

    if count > KEYWORD_FLOOR {
        Some(std::cmp::max(1, count / KEYWORDS_PER_RECORD))
    } else {
        None
    }
}
