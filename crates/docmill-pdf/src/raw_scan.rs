//! Raw byte/pattern scanner: last-resort extraction that ignores the
//! document structure entirely.
//!
//! The buffer is decoded under several text encodings; decodings that
//! report errors are excluded from the sweep. Each surviving decoding is
//! scanned for readable runs — parenthesized PDF string literals first,
//! then plain readable character runs — and the richest decoding wins.
//! Output is fragmentary by design; this strategy exists so the chain
//! always has a guaranteed-something candidate.

use once_cell::sync::Lazy;
use regex::Regex;

use docmill_core::{RawExtraction, StrategyFailure};

/// Parenthesized literal runs as written by PDF text operators:
/// `(Some text) Tj`. Escaped parens are handled during unescaping.
static LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(((?:[^()\\]|\\.){3,}?)\)").unwrap());

/// Plain readable runs: a letter followed by mostly word-like content.
static READABLE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9 ,.'\u{2019}:;!?-]{11,}").unwrap());

pub fn extract(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let mut best = String::new();
    let mut best_encoding = "";

    for (label, decoded) in decode_candidates(buffer) {
        let scanned = scan_decoded(&decoded);
        if scanned.len() > best.len() {
            best = scanned;
            best_encoding = label;
        }
    }

    if best.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "no readable runs found under any encoding".into(),
        ));
    }

    tracing::debug!(
        encoding = best_encoding,
        chars = best.len(),
        "raw scan recovered readable runs"
    );

    Ok(RawExtraction {
        text: best,
        pages: None,
        warnings: vec![format!("raw byte scan decoded as {best_encoding}")],
    })
}

/// Decode the buffer under the encoding sweep. Encodings whose decoder
/// reports errors are dropped; UTF-8 is decoded lossily so at least one
/// candidate always remains.
fn decode_candidates(buffer: &[u8]) -> Vec<(&'static str, String)> {
    let mut candidates = vec![(
        "utf-8",
        String::from_utf8_lossy(buffer).into_owned(),
    )];

    for (label, encoding) in [
        ("windows-1252", encoding_rs::WINDOWS_1252),
        ("utf-16le", encoding_rs::UTF_16LE),
        ("utf-16be", encoding_rs::UTF_16BE),
    ] {
        let (decoded, _, had_errors) = encoding.decode(buffer);
        if !had_errors {
            candidates.push((label, decoded.into_owned()));
        }
    }

    candidates
}

fn scan_decoded(text: &str) -> String {
    let literals: Vec<String> = LITERAL_RE
        .captures_iter(text)
        .map(|caps| unescape_literal(&caps[1]))
        .filter(|run| is_plausible_run(run))
        .collect();

    if !literals.is_empty() {
        return literals.join(" ");
    }

    READABLE_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|run| is_plausible_run(run))
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A run is plausible text if it has letters and at least one vowel —
/// filters out hex blobs and operator soup.
fn is_plausible_run(run: &str) -> bool {
    run.chars().filter(|c| c.is_ascii_alphabetic()).count() >= 3
        && run
            .chars()
            .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_parenthesized_literals() {
        let buffer = b"garbage %PDF (Hello readable world) Tj more \x00\x01 (and a second run) Tj";
        let raw = extract(buffer).unwrap();
        assert!(raw.text.contains("Hello readable world"));
        assert!(raw.text.contains("and a second run"));
    }

    #[test]
    fn test_unescapes_literal_escapes() {
        assert_eq!(unescape_literal(r"a\(b\)c"), "a(b)c");
        assert_eq!(unescape_literal(r"line\nbreak"), "line\nbreak");
    }

    #[test]
    fn test_readable_runs_without_literals() {
        let buffer = b"\x00\x01\x02 This sentence sits between binary blobs \x9c\x03";
        let raw = extract(buffer).unwrap();
        assert!(raw.text.contains("This sentence sits between binary blobs"));
    }

    #[test]
    fn test_pure_binary_is_a_failure() {
        let buffer: Vec<u8> = (0u8..32).cycle().take(256).collect();
        assert!(extract(&buffer).is_err());
    }

    #[test]
    fn test_hex_soup_is_not_plausible() {
        assert!(!is_plausible_run("fd b2 c9"));
        assert!(is_plausible_run("actual words"));
    }
}
