use std::io::Write;

use docmill_core::{ExtractionResult, QualityVerdict};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the extraction report: metadata header, then the content.
pub fn print_extraction_report(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);

    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        if result.success {
            writeln!(w, "{} {}", "EXTRACTED:".bold().green(), file_name.bold())?;
        } else {
            writeln!(w, "{} {}", "EXTRACTION FAILED:".bold().red(), file_name.bold())?;
        }
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        if result.success {
            writeln!(w, "EXTRACTED: {}", file_name)?;
        } else {
            writeln!(w, "EXTRACTION FAILED: {}", file_name)?;
        }
        writeln!(w, "{}", sep)?;
    }

    let meta = &result.metadata;
    writeln!(w, "  Method:     {}", meta.method)?;
    if let Some(pages) = meta.pages {
        writeln!(w, "  Pages:      {}", pages)?;
    }
    writeln!(w, "  Words:      {}", meta.word_count)?;
    writeln!(w, "  Input size: {} bytes", meta.file_size_bytes)?;
    writeln!(w, "  Elapsed:    {} ms", meta.processing_time_ms)?;

    if let Some(ref error) = meta.error {
        if color.enabled() {
            writeln!(w, "  {} {}", "Error:".red(), error)?;
        } else {
            writeln!(w, "  Error:      {}", error)?;
        }
    }
    for warning in &meta.warnings {
        if color.enabled() {
            writeln!(w, "  {} {}", "Warning:".yellow(), warning)?;
        } else {
            writeln!(w, "  Warning:    {}", warning)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}", result.content)?;
    Ok(())
}

/// Print whether the content clears the strict downstream policy.
pub fn print_strict_verdict(
    w: &mut dyn Write,
    verdict: &QualityVerdict,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let detail = format!(
        "{} words, readable ratio {:.2}",
        verdict.word_count, verdict.readable_ratio
    );
    if verdict.accepted {
        if color.enabled() {
            writeln!(w, "{} {}", "DOWNSTREAM QUALITY: PASS".green().bold(), detail.dimmed())?;
        } else {
            writeln!(w, "DOWNSTREAM QUALITY: PASS ({})", detail)?;
        }
    } else {
        let reason = if verdict.has_structural_artifacts {
            "structural artifacts remain in the text".to_string()
        } else {
            detail.clone()
        };
        if color.enabled() {
            writeln!(w, "{} {}", "DOWNSTREAM QUALITY: FAIL".red().bold(), reason)?;
        } else {
            writeln!(w, "DOWNSTREAM QUALITY: FAIL ({})", reason)?;
        }
    }
    Ok(())
}
