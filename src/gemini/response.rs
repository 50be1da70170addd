use tracing::warn;

use super::types::GenerateContentResponse;

/// Concatenated text of the first candidate, or `None` when it is empty.
pub fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        warn!("Gemini returned empty answer (safety filter or empty response)");
        None
    } else {
        Some(text)
    }
}
