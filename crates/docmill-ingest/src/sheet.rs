//! Spreadsheet decoding via calamine.
//!
//! Every sheet is concatenated as a labeled text block; a sheet that
//! fails to open becomes a warning while the remaining sheets are kept.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xls, Xlsx};

use docmill_core::{RawExtraction, StrategyFailure};

/// Decode an Office Open XML workbook (`.xlsx`/`.xlsm`).
pub fn decode_xlsx(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(buffer))
        .map_err(|e| StrategyFailure::Parse(format!("failed to open workbook: {e}")))?;
    decode_workbook(workbook)
}

/// Decode a legacy binary workbook (`.xls`).
pub fn decode_xls(buffer: &[u8]) -> Result<RawExtraction, StrategyFailure> {
    let workbook: Xls<_> = Xls::new(Cursor::new(buffer))
        .map_err(|e| StrategyFailure::Parse(format!("failed to open workbook: {e}")))?;
    decode_workbook(workbook)
}

fn decode_workbook<RS, R>(mut workbook: R) -> Result<RawExtraction, StrategyFailure>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut text = String::new();
    let mut warnings = Vec::new();

    for name in &sheet_names {
        match workbook.worksheet_range(name) {
            Ok(range) => append_sheet(&mut text, name, &range),
            Err(e) => warnings.push(format!("sheet {name}: {e}")),
        }
    }

    if text.trim().is_empty() {
        return Err(StrategyFailure::Extraction(
            "workbook contains no readable cells".into(),
        ));
    }

    tracing::debug!(
        sheets = sheet_names.len(),
        chars = text.len(),
        "decoded workbook"
    );

    Ok(RawExtraction {
        text,
        pages: Some(sheet_names.len() as u32),
        warnings,
    })
}

/// Render one sheet as a labeled block, rows joined with ` | ` and
/// empty rows dropped.
fn append_sheet(text: &mut String, name: &str, range: &Range<Data>) {
    text.push_str(&format!("=== Sheet: {name} ===\n"));
    for row in range.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell.to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !cells.is_empty() {
            text.push_str(&cells.join(" | "));
            text.push('\n');
        }
    }
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_blocks_are_labeled_and_rows_joined() {
        let mut range = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("name".into()));
        range.set_value((0, 1), Data::String("count".into()));
        range.set_value((0, 2), Data::String("owner".into()));
        range.set_value((1, 0), Data::String("widgets".into()));
        range.set_value((1, 1), Data::Float(3.0));
        range.set_value((1, 2), Data::String("ops".into()));

        let mut text = String::new();
        append_sheet(&mut text, "Q1", &range);
        assert!(text.starts_with("=== Sheet: Q1 ===\n"));
        assert!(text.contains("name | count | owner"));
        assert!(text.contains("widgets | 3 | ops"));
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let mut range = Range::new((0, 0), (2, 0));
        range.set_value((0, 0), Data::String("top".into()));
        range.set_value((2, 0), Data::String("bottom".into()));

        let mut text = String::new();
        append_sheet(&mut text, "S", &range);
        assert_eq!(text, "=== Sheet: S ===\ntop\nbottom\n\n");
    }

    #[test]
    fn test_garbage_buffer_is_a_parse_failure() {
        assert!(matches!(
            decode_xlsx(b"definitely not a zip archive"),
            Err(StrategyFailure::Parse(_))
        ));
        assert!(matches!(
            decode_xls(b"definitely not an ole container"),
            Err(StrategyFailure::Parse(_))
        ));
    }
}
