//! Content cleaning and reconstruction for raw extraction output.
//!
//! Strategies hand back noisy text: control characters, leaked PDF
//! markup, and words split mid-token by lossy extraction. The cleaner
//! runs a fixed sequence of pure steps over the raw string:
//!
//! 1. strip non-printable control characters
//! 2. remove structural-markup remnants
//! 3. collapse whitespace runs
//! 4. rejoin fragmented tokens
//! 5. normalize spacing around punctuation
//!
//! Deterministic, no I/O.

use once_cell::sync::Lazy;
use regex::Regex;

/// Object and cross-reference table remnants: `12 0 obj`, `endobj`,
/// `xref` triplets like `0000000017 00000 n`, and trailer keywords.
static OBJECT_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b\d+\s+\d+\s+obj\b|\bendobj\b|^stream\s*$|\bendstream\b|\b\d{10}\s+\d{5}\s+[nf]\b|\bstartxref\b|\bxref\b|\btrailer\b")
        .unwrap()
});

/// Dictionary bodies `<< ... >>` (innermost first) and stray delimiters.
static DICT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<[^<>]*>>").unwrap());
static DICT_DELIM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<|>>").unwrap());

/// Internal name tokens that leak from font and page dictionaries.
/// Deliberately a closed list so ordinary slash-joined prose
/// ("and/or", file paths) is left alone.
static NAME_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:F\d+|Type\d?|Font|Subtype|BaseFont|Encoding|Filter|FlateDecode|DCTDecode|Length\d?|MediaBox|Contents|Resources|Pages?|Catalog|Kids|Count|Parent|Root|Info|ProcSet|XObject|Widths|FirstChar|LastChar|ToUnicode|Helvetica|Times[A-Za-z-]*|Courier[A-Za-z-]*|Arial[A-Za-z-]*)\b")
        .unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +([,.!?;:])").unwrap());
static PUNCT_NO_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,.!?;:])([A-Za-z])").unwrap());

/// Run the full cleaning sequence over raw extraction output.
pub fn clean_extracted_text(raw: &str) -> String {
    let text = strip_control_chars(raw);
    let text = strip_markup_remnants(&text);
    let text = collapse_whitespace(&text);
    let text = reconstruct_tokens(&text);
    normalize_punctuation(&text)
}

/// Drop non-printable control characters, keeping the whitespace that
/// later steps rely on for token boundaries.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Remove recognizable PDF structure that leaked into the text stream.
pub fn strip_markup_remnants(text: &str) -> String {
    let mut current = OBJECT_MARKER_RE.replace_all(text, " ").into_owned();

    // Dictionaries nest; peel from the inside out.
    loop {
        let replaced = DICT_RE.replace_all(&current, " ");
        if replaced == current {
            break;
        }
        current = replaced.into_owned();
    }
    let current = DICT_DELIM_RE.replace_all(&current, " ");

    NAME_TOKEN_RE.replace_all(&current, " ").into_owned()
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Rejoin words split mid-token by extraction artifacts.
///
/// A token of length ≤ 2 containing only consonants is treated as a
/// fragment and merged with the following token when the merge contains
/// a vowel and is longer than either piece: `"t he cat"` → `"the cat"`.
pub fn reconstruct_tokens(text: &str) -> String {
    let tokens: Vec<&str> = text.split(' ').filter(|t| !t.is_empty()).collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let tok = tokens[i];
        if is_consonant_fragment(tok) && i + 1 < tokens.len() {
            let next = tokens[i + 1];
            let merged = format!("{tok}{next}");
            if contains_vowel(&merged)
                && merged.chars().count() > tok.chars().count()
                && merged.chars().count() > next.chars().count()
            {
                out.push(merged);
                i += 2;
                continue;
            }
        }
        out.push(tok.to_string());
        i += 1;
    }

    out.join(" ")
}

/// No space before `,.!?;:`, a single space after when a letter follows.
pub fn normalize_punctuation(text: &str) -> String {
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(text, "$1");
    PUNCT_NO_SPACE_RE.replace_all(&text, "$1 $2").into_owned()
}

fn is_consonant_fragment(token: &str) -> bool {
    let len = token.chars().count();
    len >= 1
        && len <= 2
        && token
            .chars()
            .all(|c| c.is_ascii_alphabetic() && !is_vowel(c))
}

fn contains_vowel(s: &str) -> bool {
    s.chars().any(is_vowel)
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
