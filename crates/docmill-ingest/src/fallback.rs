//! Fallback diagnostic generator.
//!
//! When no strategy produces accepted text, the pipeline still returns
//! a structurally valid, human-readable document. The diagnostic names
//! the file, what was attempted, the likely causes, and what the user
//! can do about it — never an empty string, never a panic.

/// Build the placeholder document returned with `success = false`.
pub fn diagnostic_document(
    file_name: &str,
    file_size_bytes: u64,
    elapsed_ms: u64,
    failure_reasons: &[String],
) -> String {
    let mut doc = String::new();

    doc.push_str("DOCUMENT EXTRACTION REPORT\n");
    doc.push_str("==========================\n\n");

    doc.push_str("File information:\n");
    doc.push_str(&format!("  Name: {file_name}\n"));
    doc.push_str(&format!(
        "  Size: {} ({file_size_bytes} bytes)\n",
        human_size(file_size_bytes)
    ));
    doc.push_str(&format!("  Processing time: {elapsed_ms} ms\n\n"));

    if !failure_reasons.is_empty() {
        doc.push_str("Extraction attempts:\n");
        for reason in failure_reasons {
            doc.push_str(&format!("  - {reason}\n"));
        }
        doc.push('\n');
    }

    doc.push_str("No readable text could be extracted. Probable causes:\n");
    doc.push_str("  - The document contains only scanned images with no text layer\n");
    doc.push_str("  - The document is encrypted or password protected\n");
    doc.push_str("  - The file is corrupted or was truncated during upload\n");
    doc.push_str("  - The internal structure uses features this pipeline does not support\n\n");

    doc.push_str("Suggested remediation:\n");
    doc.push_str("  - Re-export the document from its source application\n");
    doc.push_str("  - For scanned documents, run OCR before uploading\n");
    doc.push_str("  - Paste the text content directly if it is available\n\n");

    doc.push_str(
        "This report was generated automatically because extraction failed; \
         treat it as low-confidence file metadata, not document content.\n",
    );

    doc
}

/// Rejection text for buffers that match no supported magic header.
pub fn unsupported_format_document(file_name: &str, file_size_bytes: u64) -> String {
    format!(
        "UNSUPPORTED DOCUMENT FORMAT\n\
         ===========================\n\n\
         File information:\n  Name: {file_name}\n  Size: {} ({file_size_bytes} bytes)\n\n\
         The file's leading bytes match none of the supported formats \
         (PDF, Word document, spreadsheet, plain text). Convert the file \
         to one of those formats and upload it again.\n",
        human_size(file_size_bytes)
    )
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
