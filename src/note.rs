//! Prompt construction and triage-note formatting.
//!
//! These are pure functions over the incident and its retrieved hits; the
//! exact text layout is a contract with the humans reading the note in the
//! incident timeline, so tests here pin it down character for character.

use std::fmt::Write;

use crate::incident::{IncidentInput, SimilarIncident};

/// Longest body excerpt quoted into the prompt, in characters.
const EXCERPT_CAP: usize = 300;

/// Posted verbatim when retrieval returns nothing. A valid terminal
/// outcome, not an error.
pub const FALLBACK_NOTE: &str = "================================\n       AI ENRICHMENT\n================================\n\nNo similar past incidents found in the knowledge base.";

/// Build the generation prompt from the new incident and its hits, in the
/// order the index returned them (descending score).
pub fn build_prompt(incident: &IncidentInput, hits: &[SimilarIncident]) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an expert SRE assistant helping with incident triage.\n\n");
    prompt.push_str("NEW ALERT:\n");
    let _ = writeln!(prompt, "Title: {}", incident.title);
    let _ = writeln!(prompt, "Description: {}", incident.description);
    let _ = writeln!(prompt, "Service: {}", incident.service_name);
    let _ = writeln!(prompt, "Urgency: {}\n", incident.urgency);

    prompt.push_str("SIMILAR PAST INCIDENTS:\n\n");
    for (idx, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {} ({} section, {:.0}% match)",
            idx + 1,
            hit.incident_id,
            hit.section,
            hit.score * 100.0
        );
        let _ = writeln!(
            prompt,
            "   Service: {} | Severity: {} | Date: {}",
            hit.service, hit.severity, hit.date
        );
        let _ = writeln!(prompt, "   Content: {}\n", excerpt(&hit.text));
    }

    prompt.push_str("TASK:\n");
    prompt.push_str("Generate a concise triage note (max 400 words) with:\n");
    prompt.push_str("1. Likely Root Cause (based on similar incidents)\n");
    prompt.push_str("2. Recommended Resolution Steps (specific and actionable)\n");
    prompt.push_str("3. Related Incident IDs for reference\n\n");
    prompt.push_str("Format the response in clear, professional sections using proper headers.\n");
    prompt.push_str("Use plain text formatting - no bold, italics, or markdown styling.\n");
    prompt.push_str("Be concise and action-oriented. Focus on what the on-call engineer should do NOW.\n");

    prompt
}

/// Format the final note: banner, generated text, then one similarity line
/// per hit in the original (descending-score) order.
pub fn format_note(generated: &str, hits: &[SimilarIncident]) -> String {
    let mut note = String::new();

    note.push_str("================================\n");
    note.push_str("       AI ENRICHMENT\n");
    note.push_str("================================\n\n");
    note.push_str(generated);
    note.push_str("\n\n");
    note.push_str("--------------------------------\n");
    note.push_str("SIMILARITY SCORES\n");
    note.push_str("--------------------------------\n");
    for (idx, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            note,
            "  [{}] {}: {:.1}% match ({})",
            idx + 1,
            hit.incident_id,
            hit.score * 100.0,
            hit.section
        );
    }
    note.push('\n');

    note
}

/// Cap a hit body at the first [`EXCERPT_CAP`] characters, appending a
/// truncation marker when longer. Shorter text passes through unchanged.
fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CAP {
        return text.to_string();
    }
    let mut capped: String = text.chars().take(EXCERPT_CAP).collect();
    capped.push_str("...");
    capped
}
