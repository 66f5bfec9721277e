//! Word-processor decoding.
//!
//! `.docx` body text is flattened via docx-rs: paragraph runs,
//! hyperlink runs, and table cells, in document order. Legacy binary
//! `.doc` has no decoder in this build and reports the capability as
//! unavailable — a normal failure outcome, not a startup error.

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};

use docmill_core::{RawExtraction, StrategyFailure};

pub fn decode_docx(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let doc = docx_rs::read_docx(buffer)
        .map_err(|e| StrategyFailure::Parse(format!("failed to parse document: {e}")))?;

    let mut text = String::new();
    for child in &doc.document.children {
        flatten_child(child, &mut text);
    }

    if text.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "document body contains no text".into(),
        ));
    }

    tracing::debug!(chars = text.len(), "decoded word document body");

    Ok(RawExtraction {
        text,
        pages: None,
        warnings: Vec::new(),
    })
}

pub fn decode_legacy_doc(_buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    Err(StrategyFailure::Unavailable(
        "legacy binary Word (.doc) decoding is not available in this build; \
         convert the file to .docx"
            .into(),
    ))
}

fn flatten_child(child: &DocumentChild, out: &mut String) {
    match child {
        DocumentChild::Paragraph(paragraph) => {
            for p_child in &paragraph.children {
                flatten_paragraph_child(p_child, out);
            }
            out.push('\n');
        }
        DocumentChild::Table(table) => {
            for TableChild::TableRow(row) in &table.rows {
                for TableRowChild::TableCell(cell) in &row.cells {
                    for content in &cell.children {
                        if let TableCellContent::Paragraph(paragraph) = content {
                            for p_child in &paragraph.children {
                                flatten_paragraph_child(p_child, out);
                            }
                            out.push_str(" | ");
                        }
                    }
                }
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn flatten_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for r_child in &run.children {
                match r_child {
                    RunChild::Text(text) => out.push_str(&text.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for l_child in &link.children {
                if let ParagraphChild::Run(run) = l_child {
                    for r_child in &run.children {
                        if let RunChild::Text(text) = r_child {
                            out.push_str(&text.text);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run, Table, TableCell, TableRow};

    fn docx_buffer(docx: Docx) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_paragraph_runs_flatten_in_document_order() {
        let buffer = docx_buffer(
            Docx::new()
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("The rollout starts on Monday")),
                )
                .add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("and finishes on Friday")),
                ),
        );
        let raw = decode_docx(&buffer).unwrap();
        let first = raw.text.find("rollout starts").unwrap();
        let second = raw.text.find("finishes on Friday").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_table_cells_join_with_separator() {
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("alpha"))),
            TableCell::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("beta"))),
        ])]);
        let buffer = docx_buffer(Docx::new().add_table(table));
        let raw = decode_docx(&buffer).unwrap();
        assert!(raw.text.contains("alpha | beta | "));
    }

    #[test]
    fn test_hyperlink_text_is_kept() {
        let buffer = docx_buffer(Docx::new().add_paragraph(
            Paragraph::new().add_hyperlink(
                Hyperlink::new("https://example.com/notes", HyperlinkType::External)
                    .add_run(Run::new().add_text("release notes")),
            ),
        ));
        let raw = decode_docx(&buffer).unwrap();
        assert!(raw.text.contains("release notes"));
    }

    #[test]
    fn test_garbage_buffer_is_a_parse_failure() {
        assert!(matches!(
            decode_docx(b"not a zip archive either"),
            Err(StrategyFailure::Parse(_))
        ));
    }

    #[test]
    fn test_legacy_doc_is_unavailable_not_a_panic() {
        assert!(matches!(
            decode_legacy_doc(b"\xD0\xCF\x11\xE0 legacy"),
            Err(StrategyFailure::Unavailable(_))
        ));
    }
}
