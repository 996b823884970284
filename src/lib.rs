//! PDF OCR Batch Library
//!
//! Runs a folder of PDFs through an external OCR engine (searchable PDF/A
//! output) and then an external compressor, one file at a time.

pub mod core;
pub mod scanner;
pub mod reporting;

pub use crate::core::pipeline;
pub use crate::scanner::file_scanner;
pub use crate::reporting::report_writer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::config::{
        BatchConfig, CompressSettings, OcrFailurePolicy, OcrSettings, PdfPreset,
    };
    pub use crate::core::error::ConvertError;
    pub use crate::core::pipeline::{
        process_file, run_batch, BatchReport, FileResult, Step, StepFailure,
    };
    pub use crate::core::tools::{find_missing_tools, SystemToolRunner, ToolInvocation, ToolRunner};
    pub use crate::scanner::file_scanner::{
        base_name, ensure_output_directory, list_pdf_files,
    };
    pub use crate::reporting::report_writer::{write_json_report, write_report};
}
