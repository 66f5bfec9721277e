//! Format classification from magic headers.
//!
//! Pure and O(1): only the leading bytes are inspected, cross-checked
//! against the declared MIME type and filename extension. Unknown
//! formats classify as [`DocumentCategory::Unsupported`] rather than
//! erroring; upstream converts that into a user-facing rejection.

/// Supported document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentCategory {
    Pdf,
    WordDocument,
    Spreadsheet,
    PlainText,
    Unsupported,
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: DocumentCategory,
    /// The declared type or extension disagrees with the detected magic.
    pub type_mismatch: bool,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

pub fn classify(buffer: &[u8], declared_mime: &str, file_name: &str) -> Classification {
    let declared = declared_category(declared_mime, file_name);
    let detected = detect_magic(buffer, file_name, declared);

    let type_mismatch = matches!(
        (declared, detected),
        (Some(d), detected) if d != detected && detected != DocumentCategory::Unsupported
    );

    Classification {
        category: detected,
        type_mismatch,
    }
}

fn detect_magic(
    buffer: &[u8],
    file_name: &str,
    declared: Option<DocumentCategory>,
) -> DocumentCategory {
    if buffer.starts_with(b"%PDF-") {
        return DocumentCategory::Pdf;
    }

    if buffer.starts_with(ZIP_MAGIC) {
        // Office Open XML containers share the zip magic; the extension
        // disambiguates docx from xlsx, with the declared type as the
        // fallback for extensionless uploads.
        return match extension(file_name) {
            Some("docx") => DocumentCategory::WordDocument,
            Some("xlsx") | Some("xlsm") => DocumentCategory::Spreadsheet,
            _ => match declared {
                Some(DocumentCategory::WordDocument) => DocumentCategory::WordDocument,
                Some(DocumentCategory::Spreadsheet) => DocumentCategory::Spreadsheet,
                _ => DocumentCategory::Unsupported,
            },
        };
    }

    if buffer.starts_with(OLE_MAGIC) {
        return match extension(file_name) {
            Some("xls") => DocumentCategory::Spreadsheet,
            Some("doc") => DocumentCategory::WordDocument,
            _ => match declared {
                Some(DocumentCategory::WordDocument) => DocumentCategory::WordDocument,
                Some(DocumentCategory::Spreadsheet) => DocumentCategory::Spreadsheet,
                _ => DocumentCategory::Unsupported,
            },
        };
    }

    if has_text_bom(buffer) || looks_like_text(buffer) {
        return DocumentCategory::PlainText;
    }

    DocumentCategory::Unsupported
}

fn has_text_bom(buffer: &[u8]) -> bool {
    buffer.starts_with(&[0xEF, 0xBB, 0xBF])
        || buffer.starts_with(&[0xFF, 0xFE])
        || buffer.starts_with(&[0xFE, 0xFF])
}

/// Heuristic for bare text: at least 90% of the leading window decodes
/// as printable characters or whitespace.
fn looks_like_text(buffer: &[u8]) -> bool {
    if buffer.is_empty() {
        return false;
    }
    let window = &buffer[..buffer.len().min(512)];
    let printable = window
        .iter()
        .filter(|&&b| b == b'\n' || b == b'\r' || b == b'\t' || (0x20..0x7F).contains(&b) || b >= 0x80)
        .count();
    printable * 10 >= window.len() * 9
}

/// What category the caller claims to be uploading, from the declared
/// MIME type first, then the filename extension.
fn declared_category(declared_mime: &str, file_name: &str) -> Option<DocumentCategory> {
    let mime = if declared_mime.is_empty() {
        mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    } else {
        declared_mime.to_ascii_lowercase()
    };

    if mime.contains("pdf") {
        return Some(DocumentCategory::Pdf);
    }
    if mime.contains("wordprocessingml") || mime.contains("msword") {
        return Some(DocumentCategory::WordDocument);
    }
    // CSV declares as a spreadsheet type but is bare text on the wire,
    // so it counts as PlainText here to avoid a false mismatch.
    if mime.contains("csv") {
        return Some(DocumentCategory::PlainText);
    }
    if mime.contains("spreadsheetml") || mime.contains("ms-excel") {
        return Some(DocumentCategory::Spreadsheet);
    }
    if mime.starts_with("text/") || mime.contains("html") || mime.contains("json") || mime.contains("xml") {
        return Some(DocumentCategory::PlainText);
    }

    match extension(file_name) {
        Some("pdf") => Some(DocumentCategory::Pdf),
        Some("doc") | Some("docx") => Some(DocumentCategory::WordDocument),
        Some("xls") | Some("xlsx") | Some("xlsm") => Some(DocumentCategory::Spreadsheet),
        Some("txt") | Some("md") | Some("csv") | Some("html") | Some("htm") | Some("json")
        | Some("xml") | Some("log") => Some(DocumentCategory::PlainText),
        _ => None,
    }
}

pub(crate) fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext).filter(|e| !e.is_empty())
}
