//! Page-rendering parser: loads the document as a page tree and
//! concatenates positioned text runs per page.
//!
//! Delegates to `pdf-extract`, which is considerably more tolerant of
//! malformed cross-reference tables than the structured walks, but can
//! panic inside its font handling on certain embedded fonts. The panic
//! is caught at the strategy boundary and converted into a failure.

use std::panic::{catch_unwind, AssertUnwindSafe};

use docmill_core::{RawExtraction, StrategyFailure};

pub fn extract(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(buffer)
    }));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(StrategyFailure::Extraction(e.to_string())),
        Err(_) => {
            return Err(StrategyFailure::Panicked(
                "page renderer panicked, likely a malformed font or glyph table".into(),
            ))
        }
    };

    if text.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "page tree rendered no text, document may be image-only".into(),
        ));
    }

    // pdf-extract separates pages with form feeds when it can tell them
    // apart; use that as a page count hint.
    let pages = if text.contains('\x0C') {
        Some(text.split('\x0C').count() as u32)
    } else {
        None
    };

    tracing::debug!(chars = text.len(), "page tree rendering recovered text");

    Ok(RawExtraction {
        text,
        pages,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_buffer_fails_without_panicking() {
        let result = extract(b"not a pdf, just bytes");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_buffer_fails() {
        assert!(extract(b"").is_err());
    }
}
