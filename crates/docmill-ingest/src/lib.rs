//! Unified document ingestion: classify a byte buffer, extract text
//! with the strategy appropriate to its format, and always hand back a
//! displayable [`ExtractionResult`].
//!
//! This is the only entry point the upload handler calls. It never
//! panics and never returns an error: when nothing readable can be
//! recovered the result carries `success = false` and a diagnostic
//! placeholder document instead.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use docmill_clean::clean_extracted_text;
use docmill_core::{
    assess, AcceptedExtraction, ExtractionMetadata, ExtractionMethod, ExtractionResult,
    QualityPolicy, RawExtraction, StrategyFailure,
};
use docmill_pdf::{default_strategies, run_chain};

pub mod classify;
pub mod fallback;
pub mod office;
pub mod sheet;
pub mod text;

pub use classify::{classify, Classification, DocumentCategory};
pub use docmill_core::{truncate_for_storage, QualityVerdict};

/// Extract machine-usable plain text from an uploaded document buffer.
///
/// `declared_mime` and `file_name` may be empty; they only refine
/// classification and diagnostics. Synchronous, purely local, and
/// infallible by contract: exactly one result per buffer, with
/// non-empty content even on failure.
pub fn extract_document(buffer: &[u8], file_name: &str, declared_mime: &str) -> ExtractionResult {
    let started = Instant::now();
    let classification = classify::classify(buffer, declared_mime, file_name);

    let mut warnings = Vec::new();
    if classification.type_mismatch {
        let warning = format!(
            "declared type {declared_mime:?} does not match the detected format"
        );
        tracing::warn!(file_name, %warning);
        warnings.push(warning);
    }

    tracing::debug!(
        file_name,
        category = ?classification.category,
        size = buffer.len(),
        "classified upload"
    );

    match classification.category {
        DocumentCategory::Pdf => extract_pdf(buffer, file_name, started, warnings),
        DocumentCategory::Spreadsheet => {
            let decoder = if buffer.starts_with(b"PK\x03\x04") {
                sheet::decode_xlsx
            } else {
                sheet::decode_xls
            };
            extract_single(
                buffer,
                file_name,
                started,
                warnings,
                ExtractionMethod::Spreadsheet,
                || decoder(buffer),
            )
        }
        DocumentCategory::WordDocument => {
            if buffer.starts_with(b"PK\x03\x04") {
                extract_single(
                    buffer,
                    file_name,
                    started,
                    warnings,
                    ExtractionMethod::WordDocument,
                    || office::decode_docx(buffer),
                )
            } else {
                extract_single(
                    buffer,
                    file_name,
                    started,
                    warnings,
                    ExtractionMethod::WordDocument,
                    || office::decode_legacy_doc(buffer),
                )
            }
        }
        DocumentCategory::PlainText => extract_single(
            buffer,
            file_name,
            started,
            warnings,
            ExtractionMethod::DirectText,
            || text::decode_text(buffer, file_name, declared_mime),
        ),
        DocumentCategory::Unsupported => {
            let content = fallback::unsupported_format_document(file_name, buffer.len() as u64);
            ExtractionResult {
                success: false,
                content,
                metadata: ExtractionMetadata {
                    method: ExtractionMethod::FormatValidation,
                    pages: None,
                    word_count: 0,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                    file_size_bytes: buffer.len() as u64,
                    has_text: false,
                    error: Some("buffer matches no supported magic header".into()),
                    warnings,
                },
            }
        }
    }
}

/// PDF category: run the full strategy chain and select by priority.
fn extract_pdf(
    buffer: &[u8],
    file_name: &str,
    started: Instant,
    mut warnings: Vec<String>,
) -> ExtractionResult {
    let outcome = run_chain(buffer, default_strategies());

    match outcome.winner {
        Some((method, accepted)) => {
            warnings.extend(accepted.warnings.iter().cloned());
            accepted_result(method, accepted, buffer, started, warnings)
        }
        None => {
            let reasons = outcome.failure_reasons();
            failed_result(buffer, file_name, started, warnings, reasons)
        }
    }
}

/// Non-PDF categories use a single direct decoder, still passing
/// through the cleaner and the lenient validator.
fn extract_single(
    buffer: &[u8],
    file_name: &str,
    started: Instant,
    mut warnings: Vec<String>,
    method: ExtractionMethod,
    decode: impl FnOnce() -> Result<RawExtraction, StrategyFailure>,
) -> ExtractionResult {
    match settle(method, decode) {
        Ok(accepted) => {
            warnings.extend(accepted.warnings.iter().cloned());
            accepted_result(method, accepted, buffer, started, warnings)
        }
        Err(failure) => {
            let reasons = vec![format!("{method}: {failure}")];
            failed_result(buffer, file_name, started, warnings, reasons)
        }
    }
}

/// Decode inside an error boundary, then clean and validate. Mirrors
/// the per-strategy settling the PDF chain applies.
fn settle(
    method: ExtractionMethod,
    decode: impl FnOnce() -> Result<RawExtraction, StrategyFailure>,
) -> Result<AcceptedExtraction, StrategyFailure> {
    let raw = match catch_unwind(AssertUnwindSafe(decode)) {
        Ok(result) => result?,
        Err(_) => {
            return Err(StrategyFailure::Panicked(format!(
                "{method} decoder panicked"
            )))
        }
    };

    let content = clean_extracted_text(&raw.text);
    let verdict = assess(&content, &QualityPolicy::extraction());
    if !verdict.accepted {
        return Err(StrategyFailure::QualityRejected(
            verdict.word_count,
            verdict.readable_ratio,
        ));
    }

    Ok(AcceptedExtraction {
        content,
        pages: raw.pages,
        verdict,
        warnings: raw.warnings,
    })
}

fn accepted_result(
    method: ExtractionMethod,
    accepted: AcceptedExtraction,
    buffer: &[u8],
    started: Instant,
    warnings: Vec<String>,
) -> ExtractionResult {
    ExtractionResult {
        success: true,
        content: accepted.content,
        metadata: ExtractionMetadata {
            method,
            pages: accepted.pages,
            word_count: accepted.verdict.word_count,
            processing_time_ms: started.elapsed().as_millis() as u64,
            file_size_bytes: buffer.len() as u64,
            has_text: true,
            error: None,
            warnings,
        },
    }
}

fn failed_result(
    buffer: &[u8],
    file_name: &str,
    started: Instant,
    mut warnings: Vec<String>,
    reasons: Vec<String>,
) -> ExtractionResult {
    let elapsed = started.elapsed().as_millis() as u64;
    tracing::warn!(file_name, ?reasons, "no strategy produced accepted text");

    let content =
        fallback::diagnostic_document(file_name, buffer.len() as u64, elapsed, &reasons);
    warnings.extend(reasons.iter().cloned());

    ExtractionResult {
        success: false,
        content,
        metadata: ExtractionMetadata {
            method: ExtractionMethod::Fallback,
            pages: None,
            word_count: 0,
            processing_time_ms: elapsed,
            file_size_bytes: buffer.len() as u64,
            has_text: false,
            error: Some(reasons.join("; ")),
            warnings,
        },
    }
}
