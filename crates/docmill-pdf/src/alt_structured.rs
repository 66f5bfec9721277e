//! Alternate structured parser: a second configuration of the
//! structured walk with custom per-object text callbacks.
//!
//! Where [`crate::object_scan`] only collects text-showing operands,
//! this strategy tracks the full text-object state (`BT`/`ET` blocks,
//! line-positioning operators) and feeds every recovered run through a
//! callback that decides how it joins the output. The result keeps line
//! structure that the plain operand scan flattens, which is why this
//! strategy sits at the top of the priority order.

use lopdf::content::Content;
use lopdf::{Document, Object};

use docmill_core::{RawExtraction, StrategyFailure};

use crate::object_scan::decode_string_bytes;

/// A single text event emitted while walking a page's operators.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEvent {
    /// A run of glyphs shown by `Tj`/`TJ`/`'`/`"`.
    Run(String),
    /// A line-positioning operator (`Td`, `TD`, `T*`) or line-advancing
    /// show operator started a new line.
    LineBreak,
    /// The page's operator stream ended.
    PageEnd,
}

pub fn extract(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let doc = Document::load_mem(buffer).map_err(|e| StrategyFailure::Parse(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(StrategyFailure::Extraction("document is encrypted".into()));
    }

    let pages = doc.get_pages();
    let mut out = String::new();
    let mut warnings = Vec::new();

    for (&page_num, &page_id) in &pages {
        let result = walk_page_text(&doc, page_id, &mut |event| match event {
            TextEvent::Run(run) => out.push_str(&run),
            TextEvent::LineBreak => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            TextEvent::PageEnd => out.push_str("\n\n"),
        });
        if let Err(reason) = result {
            warnings.push(format!("page {page_num}: {reason}"));
        }
    }

    if out.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "operator walk produced no text".into(),
        ));
    }

    tracing::debug!(
        pages = pages.len(),
        chars = out.len(),
        "alternate structured walk recovered text"
    );

    Ok(RawExtraction {
        text: out,
        pages: Some(pages.len() as u32),
        warnings,
    })
}

/// Walk one page's content operators, emitting [`TextEvent`]s.
///
/// The callback owns all output policy; the walker only reports what it
/// sees. Unknown operators are ignored, so quirky producers degrade to
/// missing line breaks instead of failures.
pub fn walk_page_text(
    doc: &Document,
    page_id: (u32, u16),
    on_event: &mut dyn FnMut(TextEvent),
) -> Result<(), String> {
    let content = doc
        .get_page_content(page_id)
        .map_err(|e| format!("unreadable content stream: {e}"))?;
    let operations = Content::decode(&content)
        .map_err(|e| format!("content decode failed: {e}"))?
        .operations;

    let mut in_text_object = false;

    for op in &operations {
        match op.operator.as_str() {
            "BT" => in_text_object = true,
            "ET" => {
                in_text_object = false;
                on_event(TextEvent::LineBreak);
            }
            "Td" | "TD" | "T*" if in_text_object => on_event(TextEvent::LineBreak),
            "Tj" | "TJ" if in_text_object => {
                if let Some(run) = collect_run(&op.operands) {
                    on_event(TextEvent::Run(run));
                }
            }
            "'" | "\"" if in_text_object => {
                on_event(TextEvent::LineBreak);
                if let Some(run) = collect_run(&op.operands) {
                    on_event(TextEvent::Run(run));
                }
            }
            _ => {}
        }
    }

    on_event(TextEvent::PageEnd);
    Ok(())
}

fn collect_run(operands: &[Object]) -> Option<String> {
    let mut run = String::new();
    for operand in operands {
        crate::object_scan::decode_text_operand(operand, &mut run);
    }
    // The `"` operator carries word/char spacing numbers before its
    // string; decode_text_operand already skips them.
    if run.is_empty() {
        // Last resort for malformed operands stored as bare names.
        for operand in operands {
            if let Object::Name(name) = operand {
                run.push_str(&decode_string_bytes(name));
            }
        }
    }
    (!run.is_empty()).then_some(run)
}
