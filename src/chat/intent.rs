//! Ordered-table intent classification.
//!
//! Two independent passes over the trimmed, lower-cased message: greeting
//! detection (first matching pattern wins, then a broader second pass
//! picks the response category) and query-mode detection (reasoning
//! keywords take priority over search keywords). Any client-side mirror
//! must compute the same answers, so the tables stay literal.

use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Greeting and small-talk patterns, checked in order against the whole
/// message. Anything that matches none of these is a data query.
const GREETING_PATTERNS: &[&str] = &[
    // Simple greetings
    r"^(hi|hello|hey|hii+|helo+)[\s!.,?]*$",
    r"^(good\s*)?(morning|afternoon|evening|night)[\s!.,?]*$",
    r"^(howdy|hiya|yo|sup)[\s!.,?]*$",
    // How are you variants
    r"^how\s*(are|r)\s*(you|u|ya)[\s!.,?]*$",
    r"^what'?s\s*up[\s!.,?]*$",
    r"^how\s*(is\s*it\s*)?going[\s!.,?]*$",
    // Identity questions
    r"^(who|what)\s*(are|r)\s*(you|u)[\s!.,?]*$",
    r"^what\s*(can|do)\s*(you|u)\s*do[\s!.,?]*$",
    r"^(help|help me)[\s!.,?]*$",
    // Thanks
    r"^(thanks?|thank\s*you|ty)[\s!.,?]*$",
    r"^(ok|okay|cool|great|nice)[\s!.,?]*$",
    // Bye
    r"^(bye|goodbye|see\s*you?|later)[\s!.,?]*$",
];

const GREETING_RESPONSES: &[&str] = &[
    "Hi! I'm your Incident Intelligence assistant. I can help you track, search, and analyze incidents. Try asking about active incidents, severity levels, or specific locations!",
    "Hello! I can help you with incident queries. Ask me things like 'show critical incidents' or 'what happened in Server Room'.",
    "Hey there! I'm here to help you understand your incident data. What would you like to know?",
];

const IDENTITY_RESPONSES: &[&str] = &[
    "I'm the Incident Intelligence AI assistant. I help you search, analyze, and understand incident records. Try asking about active incidents, their status, or trends!",
    "I'm your AI-powered incident analyst. I can answer questions about incidents, their severity, locations, and status. How can I help?",
];

const HELP_RESPONSES: &[&str] = &[
    "I can help you with:\n\u{2022} Listing active incidents\n\u{2022} Finding incidents by location or severity\n\u{2022} Checking incident status\n\u{2022} Analyzing incident patterns\n\nTry asking: 'Show all critical incidents' or 'What incidents are open?'",
];

const THANKS_RESPONSES: &[&str] = &[
    "You're welcome! Let me know if you need anything else about your incidents.",
    "Happy to help! Feel free to ask more questions about incidents.",
];

const BYE_RESPONSES: &[&str] = &[
    "Goodbye! Come back anytime you need help with incidents.",
    "See you! I'll be here if you need incident intel.",
];

static GREETINGS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    GREETING_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

// Second-pass category patterns: broader, unanchored.
static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(who|what).*(are|r).*(you|u)").unwrap());
static CAPABILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"what.*(can|do).*do").unwrap());
static HELP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"help").unwrap());
static THANKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"thank|ty").unwrap());
static BYE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bye|goodbye|see\s*you|later").unwrap());

/// Detect whether a message is greeting/small-talk.
///
/// Returns a canned response if it is, `None` if the message should be
/// treated as a data query.
pub fn detect_greeting(message: &str) -> Option<String> {
    let msg = message.trim().to_lowercase();

    if !GREETINGS.iter().any(|re| re.is_match(&msg)) {
        return None;
    }

    let responses = response_set(&msg);
    responses
        .choose(&mut rand::thread_rng())
        .map(|r| (*r).to_string())
}

/// Pick the response category for a message already known to be a
/// greeting.
fn response_set(msg: &str) -> &'static [&'static str] {
    if IDENTITY_RE.is_match(msg) || CAPABILITY_RE.is_match(msg) {
        IDENTITY_RESPONSES
    } else if HELP_RE.is_match(msg) {
        HELP_RESPONSES
    } else if THANKS_RE.is_match(msg) {
        THANKS_RESPONSES
    } else if BYE_RE.is_match(msg) {
        BYE_RESPONSES
    } else {
        GREETING_RESPONSES
    }
}

/// How a data query will be answered. Carried as response metadata only;
/// it does not change the routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Reasoning,
    Search,
}

/// Keywords that indicate analytical queries. Checked first: reasoning
/// takes priority over search when both match.
const REASONING_KEYWORDS: &[&str] = &[
    "why", "how", "explain", "analyze", "analysis", "reason", "cause", "root cause",
    "pattern", "trend", "insight", "summary", "summarize", "overview",
    "recommend", "suggest", "should", "could", "prevent", "avoid",
    "compare", "correlation", "related", "similar",
    "what happened", "tell me about", "describe",
];

/// Keywords that indicate simple filter/listing queries.
const SEARCH_KEYWORDS: &[&str] = &[
    "list", "show", "get", "find", "what are", "which",
    "open incident", "resolved incident", "investigating",
    "incidents in", "incidents at", "incidents from",
    "all incidents", "active incidents",
];

/// Classify a query as reasoning or search. Unmatched text defaults to
/// reasoning.
pub fn detect_query_mode(query: &str) -> QueryMode {
    let query = query.to_lowercase();

    for keyword in REASONING_KEYWORDS {
        if query.contains(keyword) {
            return QueryMode::Reasoning;
        }
    }
    for keyword in SEARCH_KEYWORDS {
        if query.contains(keyword) {
            return QueryMode::Search;
        }
    }
    QueryMode::Reasoning
}

/// Literal phrase expansions for better retrieval. First substring match
/// wins and exactly one substitution applies; unmatched input passes
/// through unchanged.
const EXPANSIONS: &[(&str, &str)] = &[
    (
        "medium risk incidents",
        "incidents with medium severity level, status open or investigating",
    ),
    ("medium severity", "incidents with severity level medium"),
    ("high risk incidents", "incidents with high severity level"),
    ("critical issues", "incidents with critical severity level"),
    ("critical incidents", "incidents with critical severity level"),
    (
        "network problems",
        "network connectivity incidents, outages, connection timeouts, or network-related issues",
    ),
    (
        "network issues",
        "network connectivity incidents, outages, connection timeouts, or network-related issues",
    ),
    (
        "network connectivity",
        "network connectivity incidents, outages, connection timeouts, or network-related issues",
    ),
    (
        "database problems",
        "database connectivity, timeout, or database-related incidents",
    ),
    (
        "security alerts",
        "security incidents, unauthorized access, or security-related issues",
    ),
];

/// Rewrite a query using the fixed expansion table.
pub fn enhance_query(query: &str) -> String {
    let lower = query.to_lowercase();
    for (pattern, expansion) in EXPANSIONS {
        if lower.contains(pattern) {
            return (*expansion).to_string();
        }
    }
    query.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_detected() {
        let response = detect_greeting("hello").expect("hello is a greeting");
        assert!(GREETING_RESPONSES.contains(&response.as_str()));
    }

    #[test]
    fn test_greeting_with_punctuation_and_case() {
        assert!(detect_greeting("  Hey!! ").is_some());
        assert!(detect_greeting("good morning").is_some());
        assert!(detect_greeting("what's up?").is_some());
    }

    #[test]
    fn test_data_query_is_not_greeting() {
        assert!(detect_greeting("show critical incidents").is_none());
        assert!(detect_greeting("why did the outage happen").is_none());
        assert!(detect_greeting("").is_none());
    }

    #[test]
    fn test_greeting_categories() {
        let identity = detect_greeting("who are you").unwrap();
        assert!(IDENTITY_RESPONSES.contains(&identity.as_str()));

        let help = detect_greeting("help").unwrap();
        assert!(HELP_RESPONSES.contains(&help.as_str()));

        let thanks = detect_greeting("thank you").unwrap();
        assert!(THANKS_RESPONSES.contains(&thanks.as_str()));

        let bye = detect_greeting("goodbye").unwrap();
        assert!(BYE_RESPONSES.contains(&bye.as_str()));
    }

    #[test]
    fn test_query_mode_reasoning() {
        assert_eq!(detect_query_mode("why did this happen"), QueryMode::Reasoning);
        assert_eq!(
            detect_query_mode("summarize recent outages"),
            QueryMode::Reasoning
        );
    }

    #[test]
    fn test_query_mode_search() {
        assert_eq!(detect_query_mode("list open incidents"), QueryMode::Search);
        assert_eq!(
            detect_query_mode("find incidents in Block A"),
            QueryMode::Search
        );
    }

    #[test]
    fn test_query_mode_reasoning_wins_over_search() {
        // "explain" (reasoning) and "list" (search) both present
        assert_eq!(
            detect_query_mode("explain the list of incidents"),
            QueryMode::Reasoning
        );
    }

    #[test]
    fn test_query_mode_defaults_to_reasoning() {
        assert_eq!(detect_query_mode(""), QueryMode::Reasoning);
        assert_eq!(detect_query_mode("server room"), QueryMode::Reasoning);
    }

    #[test]
    fn test_enhance_query_expands_known_phrase() {
        assert_eq!(
            enhance_query("critical issues"),
            "incidents with critical severity level"
        );
        assert_eq!(
            enhance_query("Any NETWORK PROBLEMS today?"),
            "network connectivity incidents, outages, connection timeouts, or network-related issues"
        );
    }

    #[test]
    fn test_enhance_query_passthrough_is_idempotent() {
        let query = "what broke in block c";
        let once = enhance_query(query);
        assert_eq!(once, query);
        assert_eq!(enhance_query(&once), query);
    }

    #[test]
    fn test_enhance_query_first_match_wins() {
        // Both phrases are present; the earlier table entry wins and
        // exactly one substitution applies.
        assert_eq!(
            enhance_query("medium severity or critical issues"),
            "incidents with severity level medium"
        );
    }
}
