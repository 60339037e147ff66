//! Prompt construction for the RAG answer service.
//!
//! The template is a contract with the answer pipeline: it explains the
//! record fields, replays bounded conversation history, and pins down how
//! query terms map onto fields so answers cite exact values and canonical
//! incident ids.

use serde::Deserialize;

/// One prior message in a chat exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub sender: String,
    pub message: String,
}

/// Render the bounded history block: `User:`/`AI:` lines for the last
/// `window` entries (6 entries = 3 turns).
fn render_history(history: &[ChatTurn], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let mut out = String::new();
    for turn in &history[start..] {
        let role = if turn.sender.eq_ignore_ascii_case("user") {
            "User"
        } else {
            "AI"
        };
        out.push_str(role);
        out.push_str(": ");
        out.push_str(&turn.message);
        out.push('\n');
    }
    out
}

/// Build the full prompt for an (already rewritten) data query.
pub fn build_prompt(enhanced_query: &str, history: &[ChatTurn], window: usize) -> String {
    let history_context = render_history(history, window);

    format!(
        "Context: You have access to incident records with these fields:\n\
         - incident_id: Unique ID in format INC-YYYYMMDD-HHMMSS (always cite this)\n\
         - title: Short description of the incident\n\
         - status: Current state (open, investigating, resolved, closed)\n\
         - severity: Impact level (low, medium, high, critical)\n\
         - location: Physical/logical location (e.g., Block A, Block B, Data Center)\n\
         - description: Detailed incident information\n\
         - timestamp: When incident occurred\n\
         - timeline/updates: Recent changes to the incident\n\
         \n\
         CONVERSATION HISTORY:\n\
         {history_context}\n\
         IMPORTANT QUERY INTERPRETATION:\n\
         - \"incidents\" means all incidents regardless of severity\n\
         - \"medium/high/critical/low\" refers to the severity field\n\
         - \"network/database/security\" keywords appear in title or description\n\
         - \"Block A/B/C\" or location terms refer to the location field\n\
         - \"open/investigating/resolved\" refers to the status field\n\
         \n\
         ACCURACY REQUIREMENTS:\n\
         - When reporting status, severity, or location, try to use the EXACT value from the record\n\
         - You MAY infer categories (e.g., \"connection timeout\" implies \"network/database issue\")\n\
         - If a record says \"status: resolved\", report it as RESOLVED\n\
         - NEVER mention file paths, cache directories, or technical implementation details\n\
         - Refer to data as \"incident records\" not \"files\" or \"cache\"\n\
         - CRITICAL: When asked to \"list all\" or \"summarize\", CHECK EVERY SINGLE RECORD provided in the context. Do not stop after the first match.\n\
         \n\
         MULTI-PART QUERIES:\n\
         - If the user asks about multiple severity levels (e.g., \"critical AND high\"), answer BOTH\n\
         - List ALL matching incidents for EACH requested category\n\
         \n\
         When you mention specific incidents, ALWAYS include their exact incident ID from the records.\n\
         Example: \"Incident INC-20260108-092438 (status: resolved) describes...\"\n\
         \n\
         NEVER use legacy ID formats like INC-101, INC-102, or INC-1102.\n\
         \n\
         User query: {enhanced_query}\n\
         \n\
         Please provide an accurate, complete answer citing incident IDs and exact field values."
    )
}
