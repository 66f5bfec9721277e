use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docmill_core::QualityPolicy;
use docmill_ingest::{classify, extract_document, truncate_for_storage};

mod output;

use output::ColorMode;

/// Document text extraction - Pull machine-usable plain text out of
/// uploaded PDF, Office, and text files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract plain text from a document file
    Extract {
        /// Path to the document to extract
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Emit the full result as JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Apply the storage truncation cap to the extracted content
        #[arg(long)]
        storage: bool,

        /// Also report whether the text passes the strict downstream
        /// quality policy
        #[arg(long)]
        strict: bool,

        /// Path to write the extracted content to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// MIME type to declare for the file (default: guessed from
        /// the extension)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show how a file would be classified, without extracting
    Classify {
        /// Path to the document to classify
        file_path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            no_color,
            json,
            storage,
            strict,
            output,
            mime,
        } => extract(file_path, no_color, json, storage, strict, output, mime),
        Command::Classify { file_path } => classify_file(file_path),
    }
}

fn extract(
    file_path: PathBuf,
    no_color: bool,
    json: bool,
    storage: bool,
    strict: bool,
    output: Option<PathBuf>,
    mime: Option<String>,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let buffer = std::fs::read(&file_path)?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());
    let declared_mime = mime.unwrap_or_else(|| {
        mime_guess::from_path(&file_path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string()
    });

    let mut result = extract_document(&buffer, &file_name, &declared_mime);
    if storage {
        result.content = truncate_for_storage(&result.content, result.metadata.method);
    }

    let use_color = !no_color && output.is_none();
    let color = ColorMode(use_color);

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    if json {
        serde_json::to_writer_pretty(&mut writer, &result)?;
        writeln!(writer)?;
        return Ok(());
    }

    output::print_extraction_report(&mut writer, &file_name, &result, color)?;

    if strict {
        let verdict = result.assess_quality(&QualityPolicy::downstream());
        output::print_strict_verdict(&mut writer, &verdict, color)?;
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn classify_file(file_path: PathBuf) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let buffer = std::fs::read(&file_path)?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());
    let declared_mime = mime_guess::from_path(&file_path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    let classification = classify::classify(&buffer, &declared_mime, &file_name);

    println!("File:          {}", file_name);
    println!("Size:          {} bytes", buffer.len());
    println!("Declared MIME: {}", declared_mime);
    println!("Detected:      {:?}", classification.category);
    if classification.type_mismatch {
        println!("Note:          declared type does not match detected format");
    }
    Ok(())
}
