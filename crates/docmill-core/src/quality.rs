//! Quality validation for extracted text.
//!
//! One parameterized validator serves two consumers with different
//! thresholds: the extraction chain is lenient (it must not discard
//! genuinely-extracted-but-fragmented text), while downstream generation
//! is strict (garbled input produces garbled output). Both policies are
//! intentional and shipped as configuration, not unified.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Residual PDF markup signatures. If any survive cleaning, the text is
/// likely non-textual content that leaked through extraction.
static ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?x)
        \b\d+\s+\d+\s+obj\b
        | \bendobj\b
        | \bendstream\b
        | \bstartxref\b
        | <<\s*/
        | /(?:Type|Font|Filter|Length)\b
    ")
    .unwrap()
});

/// Thresholds for accepting a piece of extracted text.
#[derive(Debug, Clone, Copy)]
pub struct QualityPolicy {
    /// Minimum number of word-like tokens.
    pub min_words: usize,
    /// Minimum total character count. Zero disables the floor.
    pub min_chars: usize,
    /// Minimum fraction of readable characters. Zero disables the check.
    pub min_readable_ratio: f64,
    /// Reject text in which structural-markup signatures remain.
    pub reject_structural_artifacts: bool,
}

impl QualityPolicy {
    /// Lenient policy used by the strategy chain to pick a winner.
    pub fn extraction() -> Self {
        Self {
            min_words: 10,
            min_chars: 50,
            min_readable_ratio: 0.0,
            reject_structural_artifacts: false,
        }
    }

    /// Strict policy applied before handing content to generation
    /// features; failing it routes consumers to metadata-only generation.
    pub fn downstream() -> Self {
        Self {
            min_words: 20,
            min_chars: 0,
            min_readable_ratio: 0.7,
            reject_structural_artifacts: true,
        }
    }
}

/// Verdict computed from cleaned text; consumed immediately by the caller.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QualityVerdict {
    pub word_count: usize,
    pub readable_ratio: f64,
    pub has_structural_artifacts: bool,
    pub accepted: bool,
}

/// Assess cleaned text against a policy.
pub fn assess(text: &str, policy: &QualityPolicy) -> QualityVerdict {
    let word_count = count_words(text);
    let readable_ratio = readable_ratio(text);
    let has_structural_artifacts = ARTIFACT_RE.is_match(text);

    let accepted = word_count >= policy.min_words
        && text.chars().count() >= policy.min_chars
        && readable_ratio >= policy.min_readable_ratio
        && !(policy.reject_structural_artifacts && has_structural_artifacts);

    QualityVerdict {
        word_count,
        readable_ratio,
        has_structural_artifacts,
        accepted,
    }
}

/// Count tokens that start with a letter or digit.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|t| t.chars().next().is_some_and(|c| c.is_alphanumeric()))
        .count()
}

/// Fraction of characters belonging to the readable set (letters, digits,
/// whitespace, common punctuation). Empty text scores 0.
fn readable_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let readable = text
        .chars()
        .filter(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '"' | '(' | ')' | '-' | '/'
                        | '%' | '&' | '$' | '#' | '@' | '*' | '+' | '=' | '['
                        | ']' | '_' | '|' | '<' | '>'
                )
        })
        .count();
    readable as f64 / total as f64
}
