//! Storage truncation for extracted content.
//!
//! The upload handler persists content into a field capped at roughly
//! 65,000 characters. Content beyond the cap is cut near 60,000
//! characters and a footer is appended stating the original length, word
//! count, and extraction method, so a reader of the stored record knows
//! what was lost.

use crate::quality::count_words;
use crate::ExtractionMethod;

/// Maximum number of characters the storage field accepts.
pub const STORAGE_CHAR_CAP: usize = 65_000;

/// Where over-cap content is cut, leaving room for the footer.
const TRUNCATE_AT: usize = 60_000;

/// Marker line that identifies an already-truncated document.
const FOOTER_MARKER: &str = "--- Content truncated for storage ---";

/// Truncate content to fit the storage cap, appending a summary footer.
///
/// Idempotent: content at or under the cap (including previously
/// truncated content, which always is) is returned unchanged.
pub fn truncate_for_storage(content: &str, method: ExtractionMethod) -> String {
    let total_chars = content.chars().count();
    if total_chars <= STORAGE_CHAR_CAP || has_trailing_footer(content) {
        return content.to_string();
    }

    let word_count = count_words(content);
    let cut = content
        .char_indices()
        .nth(TRUNCATE_AT)
        .map(|(i, _)| i)
        .unwrap_or(content.len());
    let mut kept = &content[..cut];

    // Prefer ending on a whitespace boundary so no word is split.
    if let Some(pos) = kept.rfind(char::is_whitespace) {
        kept = &kept[..pos];
    }

    format!(
        "{kept}\n\n{FOOTER_MARKER}\nOriginal length: {total_chars} characters, {word_count} words. \
         Extraction method: {method}. The remainder exceeded the storage field cap.\n"
    )
}

/// The marker counts as ours only when it sits in the trailing footer
/// region; a document whose body merely mentions the marker line still
/// gets truncated.
fn has_trailing_footer(content: &str) -> bool {
    let mut tail_start = content.len().saturating_sub(FOOTER_MARKER.len() + 200);
    while !content.is_char_boundary(tail_start) {
        tail_start += 1;
    }
    content[tail_start..].contains(FOOTER_MARKER)
}
