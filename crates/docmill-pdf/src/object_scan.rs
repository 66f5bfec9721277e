//! Structured-object parser: fast, high-fidelity extraction that walks
//! the PDF text-object model.
//!
//! Decodes each page's content stream and collects the operands of the
//! text-showing operators (`Tj`, `TJ`, `'`, `"`). Per-page failures are
//! recorded as warnings and the remaining pages are kept.

use lopdf::content::Content;
use lopdf::{Document, Object};

use docmill_core::{RawExtraction, StrategyFailure};

const TEXT_SHOW_OPERATORS: [&str; 4] = ["Tj", "TJ", "'", "\""];

/// Negative kerning adjustments below this threshold represent an
/// inter-word gap rather than glyph spacing.
const KERNING_WORD_GAP: i64 = -100;

pub fn extract(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let doc = Document::load_mem(buffer).map_err(|e| StrategyFailure::Parse(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(StrategyFailure::Extraction("document is encrypted".into()));
    }

    let pages = doc.get_pages();
    let mut text = String::new();
    let mut warnings = Vec::new();

    for (&page_num, &page_id) in &pages {
        let content = match doc.get_page_content(page_id) {
            Ok(content) => content,
            Err(e) => {
                warnings.push(format!("page {page_num}: unreadable content stream: {e}"));
                continue;
            }
        };
        let operations = match Content::decode(&content) {
            Ok(decoded) => decoded.operations,
            Err(e) => {
                warnings.push(format!("page {page_num}: content decode failed: {e}"));
                continue;
            }
        };

        for op in &operations {
            if TEXT_SHOW_OPERATORS.contains(&op.operator.as_str()) {
                for operand in &op.operands {
                    decode_text_operand(operand, &mut text);
                }
            }
        }
        text.push('\n');
    }

    if text.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "no text objects found in any content stream".into(),
        ));
    }

    tracing::debug!(
        pages = pages.len(),
        chars = text.len(),
        "object scan recovered text"
    );

    Ok(RawExtraction {
        text,
        pages: Some(pages.len() as u32),
        warnings,
    })
}

/// Decode one text-showing operand into `out`.
///
/// PDF string objects carry no declared encoding; try UTF-16BE (BOM
/// marked), then UTF-8, then fall back to Latin-1, which cannot fail.
pub(crate) fn decode_text_operand(operand: &Object, out: &mut String) {
    match operand {
        Object::String(bytes, _) => out.push_str(&decode_string_bytes(bytes)),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::String(bytes, _) => out.push_str(&decode_string_bytes(bytes)),
                    Object::Integer(n) if *n < KERNING_WORD_GAP => out.push(' '),
                    Object::Real(r) if (*r as i64) < KERNING_WORD_GAP => out.push(' '),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn decode_string_bytes(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is é in Latin-1 and invalid as standalone UTF-8.
        assert_eq!(decode_string_bytes(&[0x63, 0x61, 0x66, 0xE9]), "café");
    }

    #[test]
    fn test_decode_utf16be_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_string_bytes(&bytes), "Hi");
    }

    #[test]
    fn test_kerning_gap_becomes_space() {
        let operand = Object::Array(vec![
            Object::String(b"Hello".to_vec(), StringFormat::Literal),
            Object::Integer(-250),
            Object::String(b"World".to_vec(), StringFormat::Literal),
        ]);
        let mut out = String::new();
        decode_text_operand(&operand, &mut out);
        assert_eq!(out, "Hello World");
    }

    #[test]
    fn test_small_kerning_is_not_a_gap() {
        let operand = Object::Array(vec![
            Object::String(b"ker".to_vec(), StringFormat::Literal),
            Object::Integer(-20),
            Object::String(b"ning".to_vec(), StringFormat::Literal),
        ]);
        let mut out = String::new();
        decode_text_operand(&operand, &mut out);
        assert_eq!(out, "kerning");
    }

    #[test]
    fn test_rejects_garbage_buffer() {
        assert!(extract(b"this is not a pdf at all").is_err());
    }
}
