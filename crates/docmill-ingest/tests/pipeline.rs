//! End-to-end pipeline tests: buffer in, `ExtractionResult` out.

use docmill_core::{ExtractionMethod, QualityPolicy};
use docmill_ingest::{extract_document, truncate_for_storage};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object};

const BODY_TEXT: &str = "The migration plan describes each service, the owner responsible \
    for it, and the week during which traffic will be moved to the new cluster.";

/// Build a small, well-formed, uncompressed single-page PDF in memory.
fn sample_pdf(text_lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for line in text_lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content_id = doc.add_object(lopdf::Stream::new(
        dictionary! {},
        Content { operations }.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn pdf_with_real_text_extracts_successfully() {
    let buffer = sample_pdf(&[BODY_TEXT]);
    let result = extract_document(&buffer, "plan.pdf", "application/pdf");

    assert!(result.success);
    assert!(result.content.contains("migration plan"));
    assert!(result.metadata.has_text);
    assert!(result.metadata.word_count >= 10);
    assert_eq!(result.metadata.file_size_bytes, buffer.len() as u64);
    assert!(matches!(
        result.metadata.method,
        ExtractionMethod::AltStructured
            | ExtractionMethod::PageTree
            | ExtractionMethod::ObjectScan
            | ExtractionMethod::RawScan
    ));
}

#[test]
fn winning_method_is_the_highest_priority_accepted_strategy() {
    // A well-formed PDF is readable by every strategy; the alternate
    // structured walk must win on priority, not on completion order.
    let buffer = sample_pdf(&[BODY_TEXT]);
    let result = extract_document(&buffer, "plan.pdf", "application/pdf");
    assert_eq!(result.metadata.method, ExtractionMethod::AltStructured);
}

#[test]
fn extraction_is_deterministic() {
    let buffer = sample_pdf(&[BODY_TEXT]);
    let first = extract_document(&buffer, "plan.pdf", "application/pdf");
    let second = extract_document(&buffer, "plan.pdf", "application/pdf");
    assert_eq!(first.content, second.content);
    assert_eq!(first.metadata.method, second.metadata.method);
}

#[test]
fn corrupt_pdf_falls_back_with_diagnostic() {
    let mut buffer = b"%PDF-1.5\n".to_vec();
    buffer.extend(std::iter::repeat([0x00u8, 0xFF, 0x01, 0xFE]).take(200).flatten());

    let result = extract_document(&buffer, "broken.pdf", "application/pdf");

    assert!(!result.success);
    assert_eq!(result.metadata.method, ExtractionMethod::Fallback);
    assert!(!result.content.is_empty());
    assert!(result.content.contains("broken.pdf"));
    assert!(result.content.contains(&format!("{} bytes", buffer.len())));
    assert!(result.metadata.error.is_some());
    // Each strategy contributed a failure reason.
    assert!(result.metadata.warnings.iter().any(|w| w.contains("raw-scan")));
}

#[test]
fn plain_text_passes_downstream_quality() {
    let text = "Each quarterly report lists revenue, staffing, and product milestones \
                for every region, together with the owners and the dates on which the \
                numbers were finalized for executive review.";
    let result = extract_document(text.as_bytes(), "report.txt", "text/plain");

    assert!(result.success);
    assert_eq!(result.metadata.method, ExtractionMethod::DirectText);
    let verdict = result.assess_quality(&QualityPolicy::downstream());
    assert!(verdict.accepted);
}

#[test]
fn short_text_is_rejected_into_fallback() {
    let result = extract_document(b"too short", "stub.txt", "text/plain");
    assert!(!result.success);
    assert_eq!(result.metadata.method, ExtractionMethod::Fallback);
    assert!(result.content.contains("stub.txt"));
}

#[test]
fn unknown_magic_is_rejected_as_format_validation() {
    let buffer: Vec<u8> = vec![0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x00, 0x00];
    let result = extract_document(&buffer, "program.bin", "application/octet-stream");

    assert!(!result.success);
    assert_eq!(result.metadata.method, ExtractionMethod::FormatValidation);
    assert!(result.content.contains("program.bin"));
    assert!(!result.content.is_empty());
}

#[test]
fn declared_type_mismatch_becomes_a_warning() {
    let text = "This file claims to be a PDF but is ordinary prose, with more than \
                enough words to pass the lenient extraction acceptance policy easily.";
    let result = extract_document(text.as_bytes(), "fake.pdf", "application/pdf");

    assert!(result.success);
    assert_eq!(result.metadata.method, ExtractionMethod::DirectText);
    assert!(result
        .metadata
        .warnings
        .iter()
        .any(|w| w.contains("does not match")));
}

#[test]
fn legacy_doc_reports_capability_unavailable() {
    let mut buffer = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    buffer.extend_from_slice(&[0u8; 64]);
    let result = extract_document(&buffer, "memo.doc", "application/msword");

    assert!(!result.success);
    assert!(result
        .metadata
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("unavailable"));
}

#[test]
fn html_upload_is_reduced_to_visible_text() {
    let html = "<html><body><h1>Release notes</h1><p>The scheduler now retries failed \
                jobs with exponential backoff, and operators can cap the retry budget \
                per queue through the admin console settings page.</p></body></html>";
    let result = extract_document(html.as_bytes(), "notes.html", "text/html");

    assert!(result.success);
    assert!(result.content.contains("exponential backoff"));
    assert!(!result.content.contains("<p>"));
}

#[test]
fn upload_read_from_disk_round_trips() {
    // Mirrors the CLI path: bytes land on disk first, then get read
    // back into the pipeline as an owned buffer.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.pdf");
    std::fs::write(&path, sample_pdf(&[BODY_TEXT])).unwrap();

    let buffer = std::fs::read(&path).unwrap();
    let result = extract_document(&buffer, "upload.pdf", "application/pdf");
    assert!(result.success);
    assert!(result.content.contains("migration plan"));
}

#[test]
fn stored_content_obeys_the_truncation_law() {
    let text = "repeated filler words for the storage cap test ".repeat(3000);
    let result = extract_document(text.as_bytes(), "big.txt", "text/plain");
    assert!(result.success);

    let stored = truncate_for_storage(&result.content, result.metadata.method);
    assert!(stored.chars().count() <= 65_000);
    let again = truncate_for_storage(&stored, result.metadata.method);
    assert_eq!(stored, again);
}
