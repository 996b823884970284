//! Batch conversion: configuration, external tools and the per-file pipeline

pub mod config;
pub mod error;
pub mod pipeline;
pub mod tools;

pub use config::{BatchConfig, CompressSettings, OcrFailurePolicy, OcrSettings, PdfPreset};
pub use error::ConvertError;
pub use pipeline::{process_file, run_batch, BatchReport, FileResult, Step, StepFailure};
pub use tools::{find_missing_tools, SystemToolRunner, ToolInvocation, ToolRunner};
