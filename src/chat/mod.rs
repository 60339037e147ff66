//! Chat message routing.
//!
//! Messages are either small talk (answered locally from fixed response
//! sets) or data queries (rewritten, wrapped in a prompt, and forwarded to
//! the RAG answer service). All routing is literal ordered-table matching:
//! deterministic and mirrored by client-side logic, so the tables here are
//! a shared contract, not an implementation detail.

mod answer;
mod intent;
mod prompt;

pub use answer::{analyze_answer, AnswerAnalysis};
pub use intent::{detect_greeting, detect_query_mode, enhance_query, QueryMode};
pub use prompt::{build_prompt, ChatTurn};
