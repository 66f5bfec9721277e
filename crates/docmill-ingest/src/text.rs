//! Plain-text and web-page decoding.
//!
//! Text buffers are decoded with BOM-aware encoding detection and a
//! Windows-1252 fallback for bytes that are not valid UTF-8. HTML input
//! is additionally reduced to its visible text.

use docmill_core::{RawExtraction, StrategyFailure};

use crate::classify::extension;

pub fn decode_text(buffer: &[u8], file_name: &str, declared_mime: &str) -> Result<RawExtraction, StrategyFailure> {
    let (decoded, encoding) = decode_bytes(buffer);

    if decoded.trim().is_empty() {
        return Err(StrategyFailure::Extraction("file contains no text".into()));
    }

    let mut warnings = Vec::new();
    let text = if is_html(file_name, declared_mime, &decoded) {
        warnings.push("html markup stripped to visible text".to_string());
        strip_html(&decoded)
    } else {
        decoded
    };

    if text.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "markup contained no visible text".into(),
        ));
    }

    tracing::debug!(encoding, chars = text.len(), "decoded text content");

    if encoding != "utf-8" {
        warnings.push(format!("decoded as {encoding}"));
    }

    Ok(RawExtraction {
        text,
        pages: None,
        warnings,
    })
}

/// BOM-aware decode: UTF-16 BOMs first, then strict UTF-8, then
/// Windows-1252 which cannot fail.
fn decode_bytes(buffer: &[u8]) -> (String, &'static str) {
    if buffer.starts_with(&[0xFF, 0xFE]) || buffer.starts_with(&[0xFE, 0xFF]) {
        let encoding = if buffer[0] == 0xFF {
            encoding_rs::UTF_16LE
        } else {
            encoding_rs::UTF_16BE
        };
        let (decoded, _, _) = encoding.decode(buffer);
        return (decoded.into_owned(), encoding.name());
    }

    match std::str::from_utf8(buffer) {
        Ok(s) => (s.trim_start_matches('\u{FEFF}').to_string(), "utf-8"),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(buffer);
            (decoded.into_owned(), "windows-1252")
        }
    }
}

fn is_html(file_name: &str, declared_mime: &str, decoded: &str) -> bool {
    matches!(extension(file_name), Some("html") | Some("htm"))
        || declared_mime.contains("html")
        || decoded.trim_start().to_ascii_lowercase().starts_with("<!doctype html")
        || decoded.trim_start().to_ascii_lowercase().starts_with("<html")
}

fn strip_html(html: &str) -> String {
    static BODY: once_cell::sync::Lazy<scraper::Selector> =
        once_cell::sync::Lazy::new(|| scraper::Selector::parse("body").unwrap());

    let document = scraper::Html::parse_document(html);
    let texts: Vec<String> = match document.select(&BODY).next() {
        Some(body) => body.text().map(str::to_string).collect(),
        None => document.root_element().text().map(str::to_string).collect(),
    };

    let mut out = String::new();
    for text in texts {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let raw = decode_text("plain notes, nothing fancy".as_bytes(), "notes.txt", "text/plain").unwrap();
        assert_eq!(raw.text, "plain notes, nothing fancy");
        assert!(raw.warnings.is_empty());
    }

    #[test]
    fn test_windows_1252_fallback() {
        // 0x93/0x94 are curly quotes in Windows-1252 and invalid UTF-8.
        let bytes = b"he said \x93hello\x94 loudly";
        let raw = decode_text(bytes, "quote.txt", "text/plain").unwrap();
        assert!(raw.text.contains('\u{201C}'));
        assert!(raw.warnings.iter().any(|w| w.contains("windows-1252")));
    }

    #[test]
    fn test_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "wide text".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let raw = decode_text(&bytes, "wide.txt", "").unwrap();
        assert_eq!(raw.text, "wide text");
    }

    #[test]
    fn test_html_is_stripped_to_visible_text() {
        let html = "<!DOCTYPE html><html><head><title>T</title><style>body{}</style></head>\
                    <body><h1>Heading</h1><p>Paragraph text.</p></body></html>";
        let raw = decode_text(html.as_bytes(), "page.html", "text/html").unwrap();
        assert!(raw.text.contains("Heading"));
        assert!(raw.text.contains("Paragraph text."));
        assert!(!raw.text.contains("<p>"));
        assert!(!raw.text.contains("body{}"));
    }

    #[test]
    fn test_empty_file_fails() {
        assert!(decode_text(b"   ", "blank.txt", "").is_err());
    }
}
