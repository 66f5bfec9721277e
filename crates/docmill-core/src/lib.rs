use serde::Serialize;
use thiserror::Error;

pub mod quality;
pub mod truncate;

pub use quality::{assess, QualityPolicy, QualityVerdict};
pub use truncate::{truncate_for_storage, STORAGE_CHAR_CAP};

/// How a piece of content was (or failed to be) extracted.
///
/// Recorded in [`ExtractionMetadata::method`]; descriptive only — nothing
/// downstream branches on it after the result is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Alternate structured parser: full content-operator walk with
    /// per-object text callbacks.
    AltStructured,
    /// Page-rendering parser: page tree loaded and positioned text runs
    /// concatenated per page.
    PageTree,
    /// Structured-object parser: text-showing operands collected from
    /// each page's content stream.
    ObjectScan,
    /// Raw byte/pattern scanner: readable runs recovered from the bytes
    /// under an encoding sweep, ignoring document structure.
    RawScan,
    /// Plain-text (or HTML) content decoded directly.
    DirectText,
    /// Spreadsheet sheets concatenated as labeled text blocks.
    Spreadsheet,
    /// Word-processor body text flattened.
    WordDocument,
    /// The buffer matched no supported magic header.
    FormatValidation,
    /// Every strategy failed; content is a diagnostic placeholder.
    Fallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::AltStructured => "alt-structured",
            ExtractionMethod::PageTree => "page-tree",
            ExtractionMethod::ObjectScan => "object-scan",
            ExtractionMethod::RawScan => "raw-scan",
            ExtractionMethod::DirectText => "direct-text",
            ExtractionMethod::Spreadsheet => "spreadsheet",
            ExtractionMethod::WordDocument => "word-document",
            ExtractionMethod::FormatValidation => "format-validation",
            ExtractionMethod::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata attached to every [`ExtractionResult`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    pub method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    pub word_count: usize,
    pub processing_time_ms: u64,
    pub file_size_bytes: u64,
    pub has_text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

/// The authoritative output of the pipeline. Immutable once produced.
///
/// `success = false` results always carry non-empty diagnostic content —
/// callers never receive an empty string or a panic.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub content: String,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Re-assess this result's content against a quality policy.
    ///
    /// Downstream generation features use [`QualityPolicy::downstream`]
    /// here to decide between content-derived and metadata-derived
    /// generation.
    pub fn assess_quality(&self, policy: &QualityPolicy) -> QualityVerdict {
        quality::assess(&self.content, policy)
    }
}

/// Why a single extraction strategy did not produce usable text.
#[derive(Error, Debug, Clone)]
pub enum StrategyFailure {
    #[error("failed to parse document structure: {0}")]
    Parse(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("extraction capability unavailable: {0}")]
    Unavailable(String),
    #[error("extraction panicked: {0}")]
    Panicked(String),
    #[error("output rejected by quality check: {0} words, ratio {1:.2}")]
    QualityRejected(usize, f64),
}

/// Raw output of one strategy before cleaning and validation.
#[derive(Debug, Clone, Default)]
pub struct RawExtraction {
    pub text: String,
    pub pages: Option<u32>,
    pub warnings: Vec<String>,
}

/// One strategy's settled outcome within a single chain invocation.
///
/// Transient: owned by the chain aggregator and discarded once the
/// winning attempt is selected.
#[derive(Debug, Clone)]
pub struct StrategyAttempt {
    pub method: ExtractionMethod,
    pub priority: u8,
    pub outcome: Result<AcceptedExtraction, StrategyFailure>,
}

/// A cleaned, validated extraction that passed the lenient policy.
#[derive(Debug, Clone)]
pub struct AcceptedExtraction {
    pub content: String,
    pub pages: Option<u32>,
    pub verdict: QualityVerdict,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_are_stable() {
        assert_eq!(ExtractionMethod::AltStructured.as_str(), "alt-structured");
        assert_eq!(ExtractionMethod::RawScan.as_str(), "raw-scan");
        assert_eq!(
            ExtractionMethod::FormatValidation.as_str(),
            "format-validation"
        );
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = ExtractionResult {
            success: true,
            content: "hello".to_string(),
            metadata: ExtractionMetadata {
                method: ExtractionMethod::DirectText,
                pages: None,
                word_count: 1,
                processing_time_ms: 3,
                file_size_bytes: 5,
                has_text: true,
                error: None,
                warnings: vec![],
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"direct-text\""));
        assert!(!json.contains("\"pages\""));
    }
}
