use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use hocrize::adapter::{AbbyyAdapter, PdfTextAdapter, SourceAdapter};
use hocrize::compose::ComposeOptions;
use hocrize::pipeline::{convert, ConvertConfig};

#[derive(Parser, Debug)]
#[command(name = "hocrize")]
#[command(version, about = "Normalize OCR and PDF text-layer output into hOCR markup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a source document to hOCR
    Convert {
        /// Input file (ABBYY XML or JSON text dump)
        input: PathBuf,

        /// Output file (default: <input_name>.hocr)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source format (default: detected from the file extension)
        #[arg(short, long, value_enum)]
        source: Option<SourceKind>,

        /// Scale factor applied to all source coordinates
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Combine exposed surrogate-pair halves into one character
        #[arg(long)]
        salvage: bool,

        /// Omit per-character geometry/confidence spans
        #[arg(long)]
        no_char_info: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show information about a source document
    Info {
        /// Input file path
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum SourceKind {
    Abbyy,
    Pdftext,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            source,
            scale,
            salvage,
            no_char_info,
            quiet,
        } => convert_single(input, output, source, scale, salvage, no_char_info, quiet),
        Commands::Info { input } => show_info(input),
    }
}

fn detect_source(input: &Path, requested: Option<SourceKind>) -> Result<SourceKind> {
    if let Some(kind) = requested {
        return Ok(kind);
    }
    match input.extension().and_then(|e| e.to_str()) {
        Some("xml") => Ok(SourceKind::Abbyy),
        Some("json") => Ok(SourceKind::Pdftext),
        _ => anyhow::bail!(
            "Cannot detect source format of {}; pass --source",
            input.display()
        ),
    }
}

fn open_adapter(input: &Path, kind: SourceKind) -> Result<Box<dyn SourceAdapter>> {
    Ok(match kind {
        SourceKind::Abbyy => Box::new(AbbyyAdapter::open(input)?),
        SourceKind::Pdftext => Box::new(PdfTextAdapter::open(input)?),
    })
}

#[allow(clippy::too_many_arguments)]
fn convert_single(
    input: PathBuf,
    output: Option<PathBuf>,
    source: Option<SourceKind>,
    scale: f64,
    salvage: bool,
    no_char_info: bool,
    quiet: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }

    let kind = detect_source(&input, source)?;
    let output_path = output.unwrap_or_else(|| input.with_extension("hocr"));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_path.display());
    }

    let mut adapter = open_adapter(&input, kind)
        .with_context(|| format!("Failed to open source: {}", input.display()))?;

    let title = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "OCR output".to_string());
    let config = ConvertConfig {
        document_title: title,
        compose: ComposeOptions {
            scale,
            salvage_surrogates: salvage,
            char_details: !no_char_info,
        },
    };

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let stats = convert(adapter.as_mut(), &config, BufWriter::new(file))
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    if !quiet {
        println!(
            "[✓] Done! {} page(s), {} word(s), {} warning(s)",
            stats.pages, stats.words, stats.warnings
        );
    }

    Ok(())
}

fn show_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let kind = detect_source(&input, None)?;
    let mut adapter = open_adapter(&input, kind)
        .with_context(|| format!("Failed to open source: {}", input.display()))?;

    println!("Source Information");
    println!("==================");
    println!("File: {}", input.display());
    println!("Format: {:?}", kind);

    let mut pages = 0;
    while let Some(page) = adapter.next_page()? {
        println!(
            "Page {}: {}x{} px, {} block(s), dpi {}",
            page.index,
            page.width,
            page.height,
            page.blocks.len(),
            page.dpi.map_or_else(|| "unknown".to_string(), |d| d.to_string()),
        );
        pages += 1;
    }
    println!("Pages: {}", pages);

    Ok(())
}
