//! Report writing functionality

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::core::error::ConvertError;
use crate::core::pipeline::BatchReport;

/// Write a human-readable batch report
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `report` - Results of the batch run
pub fn write_report(output_path: &Path, report: &BatchReport) -> Result<(), ConvertError> {
    write_report_inner(output_path, report).map_err(|source| ConvertError::Report {
        path: output_path.to_path_buf(),
        source,
    })
}

fn write_report_inner(output_path: &Path, report: &BatchReport) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(output_path)?);

    let now = std::time::SystemTime::now();
    writeln!(file, "PDF OCR Batch Report")?;
    writeln!(file, "====================")?;
    writeln!(file, "Generated: {:?}", now)?;
    writeln!(file, "Input directory: {}", report.input_dir.display())?;
    writeln!(file, "Output directory: {}", report.output_dir.display())?;
    writeln!(file)?;

    let succeeded = report.succeeded();
    let failed = report.failed();

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Total files processed: {}", report.results.len())?;
    writeln!(file, "  Converted: {}", succeeded)?;
    writeln!(file, "  Failed: {}", failed)?;
    if report.interrupted {
        writeln!(file, "  Interrupted before all files were processed")?;
    }

    let (before, after) = report
        .results
        .iter()
        .filter(|r| r.is_success())
        .filter_map(|r| Some((r.intermediate_bytes?, r.output_bytes?)))
        .fold((0u64, 0u64), |(b, a), (rb, ra)| (b + rb, a + ra));
    if before > 0 {
        let saved_pct = (1.0 - after as f64 / before as f64) * 100.0;
        writeln!(
            file,
            "  Compressed size: {} -> {} bytes ({:.1}% saved)",
            before, after, saved_pct
        )?;
    }
    writeln!(file)?;

    if failed > 0 {
        writeln!(file, "Failed Files:")?;
        writeln!(file, "-------------")?;
        for result in report.results.iter().filter(|r| !r.is_success()) {
            writeln!(file, "  {}", result.source.display())?;
            for failure in &result.failures {
                writeln!(file, "    [{}] {}", failure.step, failure.reason)?;
            }
        }
        writeln!(file)?;
    }

    writeln!(file, "Converted Files:")?;
    writeln!(file, "----------------")?;
    for result in report.results.iter().filter(|r| r.is_success()) {
        match result.compression_ratio() {
            Some(ratio) => writeln!(
                file,
                "  {} -> {} ({:.0}% of OCR size)",
                result.source.display(),
                result.output.display(),
                ratio * 100.0
            )?,
            None => writeln!(
                file,
                "  {} -> {}",
                result.source.display(),
                result.output.display()
            )?,
        }
    }

    file.flush()
}

/// Write the batch report as pretty-printed JSON
pub fn write_json_report(output_path: &Path, report: &BatchReport) -> Result<(), ConvertError> {
    let report_error = |source: io::Error| ConvertError::Report {
        path: output_path.to_path_buf(),
        source,
    };

    let file = File::create(output_path).map_err(report_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| report_error(e.into()))?;
    writer.flush().map_err(report_error)
}
