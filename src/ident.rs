//! Incident identifier handling.
//!
//! Canonical identifiers are `INC-YYYYMMDD-HHMMSS`, derived from wall-clock
//! time at creation. Older data carries short numeric identifiers
//! (`INC-101`, `INC-1102`); those are treated as legacy everywhere: they
//! are excluded from the RAG-visible cache and flagged in logs until the
//! rows are migrated.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^INC-\d{8}-\d{6}$").unwrap());

static LEGACY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^INC-\d+$").unwrap());

static CANONICAL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"INC-\d{8}-\d{6}").unwrap());

// The upstream contract used `INC-\d{1,4}(?!\d)`; the regex crate has no
// lookahead, but `\b` between two digits never matches, so the accepted
// set is identical.
static LEGACY_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"INC-\d{1,4}\b").unwrap());

/// Generate a canonical incident identifier from the given instant.
///
/// Known limitation: two creates within the same wall-clock second produce
/// the same identifier. The store does not guard against this either.
pub fn generate(now: DateTime<Utc>) -> String {
    format!("INC-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Whether `id` is a canonical `INC-YYYYMMDD-HHMMSS` identifier.
pub fn is_canonical(id: &str) -> bool {
    CANONICAL.is_match(id)
}

/// Whether `id` is a legacy numeric identifier (any `INC-<digits>` form
/// that is not canonical).
pub fn is_legacy(id: &str) -> bool {
    LEGACY.is_match(id) && !CANONICAL.is_match(id)
}

/// Extract canonical incident identifiers cited in free text, deduplicated
/// in order of first mention.
pub fn extract_refs(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in CANONICAL_REF.find_iter(text) {
        let id = m.as_str().to_string();
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Extract legacy short-numeric identifiers from free text. Used only for
/// data-quality logging; legacy refs are never surfaced to callers.
pub fn extract_legacy_refs(text: &str) -> Vec<String> {
    LEGACY_REF
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_format() {
        let t = Utc.with_ymd_and_hms(2025, 1, 8, 9, 24, 38).unwrap();
        assert_eq!(generate(t), "INC-20250108-092438");
        assert!(is_canonical(&generate(t)));
    }

    #[test]
    fn test_canonical_classification() {
        assert!(is_canonical("INC-20250101-120000"));
        assert!(!is_canonical("INC-123"));
        assert!(!is_canonical("INC-20250101"));
        assert!(!is_canonical("inc-20250101-120000"));
        assert!(!is_canonical("INC-20250101-120000-extra"));
    }

    #[test]
    fn test_legacy_classification() {
        assert!(is_legacy("INC-123"));
        assert!(is_legacy("INC-1102"));
        assert!(!is_legacy("INC-20250101-120000"));
        assert!(!is_legacy("INC-"));
        assert!(!is_legacy("TICKET-123"));
    }

    #[test]
    fn test_extract_refs_dedupes_in_order() {
        let text = "See INC-20250101-120000 and INC-20250102-130000; \
                    INC-20250101-120000 recurred.";
        assert_eq!(
            extract_refs(text),
            vec!["INC-20250101-120000", "INC-20250102-130000"]
        );
    }

    #[test]
    fn test_extract_legacy_refs_skips_canonical() {
        // A canonical id must not be picked up as a legacy prefix match.
        let text = "Incident INC-20250101-120000 supersedes INC-101 and INC-1102.";
        assert_eq!(extract_legacy_refs(text), vec!["INC-101", "INC-1102"]);
    }

    #[test]
    fn test_extract_legacy_refs_ignores_longer_numeric_runs() {
        // Five or more digits is neither legacy nor canonical; the old
        // lookahead contract did not match these either.
        assert!(extract_legacy_refs("INC-12345").is_empty());
    }
}
