//! The per-file OCR + compression pipeline and the batch loop around it

use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::config::{BatchConfig, OcrFailurePolicy};
use super::error::ConvertError;
use super::tools::{compress_invocation, ocr_invocation, ToolRunner};
use crate::scanner::file_scanner::{
    base_name, ensure_output_directory, exclude_generated_outputs, final_path, intermediate_path,
    list_pdf_files, output_dir_for,
};

/// Process exit status when a shutdown request cut the batch short
pub const EXIT_INTERRUPTED: u8 = 130;
/// Process exit status when at least one file failed
pub const EXIT_FILE_FAILED: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Preparing the file's output directory
    Setup,
    Ocr,
    Compress,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Setup => f.write_str("setup"),
            Step::Ocr => f.write_str("ocr"),
            Step::Compress => f.write_str("compress"),
        }
    }
}

/// Why one step of one file did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: Step,
    pub reason: String,
    pub exit_code: Option<i32>,
}

impl StepFailure {
    fn from_error(step: Step, err: &ConvertError) -> Self {
        Self {
            step,
            reason: err.to_string(),
            exit_code: err.exit_code(),
        }
    }

    fn interrupted(step: Step) -> Self {
        Self {
            step,
            reason: format!("interrupted before the {} step", step),
            exit_code: None,
        }
    }
}

/// Outcome of processing a single source PDF
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub source: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
    pub failures: Vec<StepFailure>,
    /// Size of the intermediate file, recorded only when the OCR step succeeded
    pub intermediate_bytes: Option<u64>,
    /// Size of the final file after the compression step, if it exists
    pub output_bytes: Option<u64>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Final size as a fraction of the intermediate size
    pub fn compression_ratio(&self) -> Option<f64> {
        match (self.intermediate_bytes, self.output_bytes) {
            (Some(before), Some(after)) if before > 0 => Some(after as f64 / before as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub results: Vec<FileResult>,
    /// Set when a shutdown request stopped the batch before every file ran
    pub interrupted: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Process exit status for this run
    ///
    /// 0 when every file converted (an empty batch included), 1 when any file
    /// failed, 130 when interrupted, regardless of failures.
    pub fn exit_status(&self) -> u8 {
        if self.interrupted {
            EXIT_INTERRUPTED
        } else if self.has_failures() {
            EXIT_FILE_FAILED
        } else {
            0
        }
    }
}

/// Print a status line without tearing the progress bar
fn announce(progress: &ProgressBar, message: String) {
    if progress.is_hidden() {
        println!("{}", message);
    } else {
        progress.println(message);
    }
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}

/// OCR then compress a single PDF
///
/// Writes `{base}_ocr.pdf` and `{base}_ocr_compressed.pdf` into `output_dir`.
/// Tool failures are recorded in the returned [`FileResult`]; they never
/// become an `Err`, so one bad file cannot stop a batch. A Ctrl-C reaches the
/// running tool as well, so once `shutdown` is set the compression step is
/// not started.
pub fn process_file(
    source: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    runner: &dyn ToolRunner,
    progress: &ProgressBar,
    shutdown: &AtomicBool,
) -> FileResult {
    let base = base_name(source);
    let mut result = FileResult {
        source: source.to_path_buf(),
        intermediate: intermediate_path(output_dir, &base),
        output: final_path(output_dir, &base),
        failures: Vec::new(),
        intermediate_bytes: None,
        output_bytes: None,
    };

    announce(progress, format!("🔍 Processing: {}", source.display()));

    // Mirrored subdirectories in recursive mode; the root already exists
    if let Err(e) = ensure_output_directory(output_dir) {
        warn!(file = %source.display(), error = %e, "cannot create output subdirectory");
        result.failures.push(StepFailure::from_error(Step::Setup, &e));
        announce(progress, format!("❌ Failed: {}: {}", source.display(), e));
        return result;
    }

    let ocr = ocr_invocation(&config.ocr, source, &result.intermediate);
    match runner.run(&ocr) {
        Ok(()) => result.intermediate_bytes = file_size(&result.intermediate),
        Err(e) => {
            warn!(
                tool = %config.ocr.program,
                file = %source.display(),
                exit_code = ?e.exit_code(),
                "OCR step failed"
            );
            result.failures.push(StepFailure::from_error(Step::Ocr, &e));
        }
    }

    let skip_compress =
        !result.failures.is_empty() && config.on_ocr_failure == OcrFailurePolicy::Skip;

    if shutdown.load(Ordering::SeqCst) {
        debug!(file = %source.display(), "shutdown requested; not compressing");
        result.failures.push(StepFailure::interrupted(Step::Compress));
    } else if skip_compress {
        debug!(file = %source.display(), "skipping compression after OCR failure");
    } else {
        let compress = compress_invocation(&config.compress, &result.intermediate, &result.output);
        if let Err(e) = runner.run(&compress) {
            warn!(
                tool = %config.compress.program,
                file = %result.intermediate.display(),
                exit_code = ?e.exit_code(),
                "compression step failed"
            );
            result.failures.push(StepFailure::from_error(Step::Compress, &e));
        }
        result.output_bytes = file_size(&result.output);
    }

    if result.is_success() {
        announce(progress, format!("✅ Saved: {}", result.output.display()));
    } else {
        let reasons: Vec<&str> = result.failures.iter().map(|f| f.reason.as_str()).collect();
        announce(
            progress,
            format!("❌ Failed: {}: {}", source.display(), reasons.join("; ")),
        );
    }

    result
}

/// Convert every PDF in `config.input_dir`
///
/// Creates the output directory, lists the inputs in sorted order and runs
/// [`process_file`] on each. Only directory setup and listing errors are
/// returned as `Err`. When `shutdown` becomes true the file in progress stops
/// after its current step, the remaining files are left untouched and the
/// report is marked interrupted.
pub fn run_batch(
    config: &BatchConfig,
    runner: &dyn ToolRunner,
    progress: &ProgressBar,
    shutdown: &AtomicBool,
) -> Result<BatchReport, ConvertError> {
    ensure_output_directory(&config.output_dir)?;
    let listed = list_pdf_files(&config.input_dir, config.recursive)?;
    let listed_count = listed.len();
    let pdf_files = exclude_generated_outputs(listed, &config.input_dir, &config.output_dir);
    if pdf_files.len() < listed_count {
        debug!(
            skipped = listed_count - pdf_files.len(),
            "ignoring earlier outputs found in the input directory"
        );
    }

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        files = pdf_files.len(),
        "starting batch"
    );

    progress.set_length(pdf_files.len() as u64);

    let mut report = BatchReport {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        results: Vec::with_capacity(pdf_files.len()),
        interrupted: false,
    };

    for source in &pdf_files {
        if shutdown.load(Ordering::SeqCst) {
            report.interrupted = true;
            break;
        }

        let output_dir = output_dir_for(source, &config.input_dir, &config.output_dir);
        let result = process_file(source, &output_dir, config, runner, progress, shutdown);
        report.results.push(result);
        progress.inc(1);

        if shutdown.load(Ordering::SeqCst) {
            report.interrupted = true;
            break;
        }
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        interrupted = report.interrupted,
        "batch finished"
    );

    Ok(report)
}
