use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pdf_ocr_batch::core::config::{
    DEFAULT_COMPRESS_TOOL, DEFAULT_INPUT_DIR, DEFAULT_OCR_TOOL, DEFAULT_OUTPUT_DIR,
};
use pdf_ocr_batch::prelude::*;

#[derive(Parser)]
#[command(name = "pdf_ocr_batch")]
#[command(about = "OCR a folder of PDFs to PDF/A and compress the results", long_about = None)]
struct Cli {
    /// Directory containing the PDFs to convert
    #[arg(env = "PDF_OCR_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Directory receiving the *_ocr.pdf and *_ocr_compressed.pdf files
    #[arg(env = "PDF_OCR_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// OCR program, called as `<tool> --output-type pdfa <in> <out>`
    #[arg(long, env = "PDF_OCR_OCR_TOOL", default_value = DEFAULT_OCR_TOOL)]
    ocr_tool: String,

    /// Ghostscript-compatible compression program
    #[arg(long, env = "PDF_OCR_COMPRESS_TOOL", default_value = DEFAULT_COMPRESS_TOOL)]
    compress_tool: String,

    /// Compression quality preset
    #[arg(long, env = "PDF_OCR_PRESET", value_enum, default_value_t = PdfPreset::Ebook)]
    preset: PdfPreset,

    /// What to do with a file whose OCR step failed
    #[arg(long, env = "PDF_OCR_ON_OCR_FAILURE", value_enum, default_value_t = OcrFailurePolicy::Skip)]
    on_ocr_failure: OcrFailurePolicy,

    /// Scan directories recursively, mirroring them in the output directory
    #[arg(short, long)]
    recursive: bool,

    /// Write a text report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(long)]
    json_report: Option<PathBuf>,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> BatchConfig {
        let mut config = BatchConfig::new(&self.input_dir, &self.output_dir);
        config.recursive = self.recursive;
        config.ocr.program = self.ocr_tool.clone();
        config.compress.program = self.compress_tool.clone();
        config.compress.preset = self.preset;
        config.on_ocr_failure = self.on_ocr_failure;
        config
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();

    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  Shutdown requested. Stopping after the current step...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let config = cli.to_config();

    println!("PDF OCR Batch Converter");
    println!("Input:  {}", config.input_dir.display());
    println!("Output: {}", config.output_dir.display());
    println!(
        "Tools:  {} (OCR), {} (compression, /{} preset)",
        config.ocr.program, config.compress.program, config.compress.preset
    );
    println!();

    for tool in find_missing_tools(&config) {
        warn!(tool = %tool, "tool not found on PATH; every file will fail at this step");
    }

    // Set up progress bar (skip in batch mode)
    let progress = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let report = run_batch(&config, &SystemToolRunner, &progress, &shutdown_requested)
        .context("Batch conversion failed")?;

    if report.interrupted {
        progress.finish_and_clear();
        eprintln!("\n⏹️  Graceful shutdown complete");
    } else {
        progress.finish_with_message("Conversion complete!");
    }

    if report.results.is_empty() && !report.interrupted {
        println!("No PDF files found in {}", config.input_dir.display());
    }

    // Print summary
    println!();
    println!("==================================================");
    println!("CONVERSION COMPLETE");
    println!("==================================================");
    println!("Converted PDF files: {}", report.succeeded());
    println!("Failed PDF files: {}", report.failed());
    println!();

    if let Some(ref path) = cli.report {
        write_report(path, &report)?;
        println!("Detailed report saved to: {}", path.display());
    }
    if let Some(ref path) = cli.json_report {
        write_json_report(path, &report)?;
        println!("JSON report saved to: {}", path.display());
    }

    Ok(ExitCode::from(report.exit_status()))
}
