//! Batch configuration
//!
//! Everything the converter needs is carried in a [`BatchConfig`] that the
//! caller builds and passes in; nothing is read from globals.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR: &str = "input_pdfs";
pub const DEFAULT_OUTPUT_DIR: &str = "output_pdfs";
pub const DEFAULT_OCR_TOOL: &str = "ocrmypdf";
pub const DEFAULT_COMPRESS_TOOL: &str = "gs";

/// Ghostscript `-dPDFSETTINGS` quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPreset {
    /// 72 dpi, smallest output
    Screen,
    /// 150 dpi, screen reading quality
    #[default]
    Ebook,
    /// 300 dpi
    Printer,
    /// 300 dpi, colour preserving
    Prepress,
    Default,
}

impl PdfPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfPreset::Screen => "screen",
            PdfPreset::Ebook => "ebook",
            PdfPreset::Printer => "printer",
            PdfPreset::Prepress => "prepress",
            PdfPreset::Default => "default",
        }
    }
}

impl fmt::Display for PdfPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a file whose OCR step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrFailurePolicy {
    /// Do not run the compressor; record the file as failed
    #[default]
    Skip,
    /// Run the compressor anyway on whatever intermediate file exists
    Compress,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub program: String,
    /// Passed as `--output-type`
    pub output_type: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_OCR_TOOL.to_string(),
            output_type: "pdfa".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressSettings {
    pub program: String,
    pub preset: PdfPreset,
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPRESS_TOOL.to_string(),
            preset: PdfPreset::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Descend into subdirectories, mirroring them under `output_dir`
    pub recursive: bool,
    pub ocr: OcrSettings,
    pub compress: CompressSettings,
    pub on_ocr_failure: OcrFailurePolicy,
}

impl BatchConfig {
    /// Config with default tools and policy for the given directories
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            recursive: false,
            ocr: OcrSettings::default(),
            compress: CompressSettings::default(),
            on_ocr_failure: OcrFailurePolicy::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("input_pdfs"));
        assert_eq!(config.output_dir, PathBuf::from("output_pdfs"));
        assert_eq!(config.ocr.program, "ocrmypdf");
        assert_eq!(config.ocr.output_type, "pdfa");
        assert_eq!(config.compress.program, "gs");
        assert_eq!(config.compress.preset, PdfPreset::Ebook);
        assert_eq!(config.on_ocr_failure, OcrFailurePolicy::Skip);
        assert!(!config.recursive);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(PdfPreset::Ebook.to_string(), "ebook");
        assert_eq!(PdfPreset::Screen.as_str(), "screen");
        assert_eq!(PdfPreset::from_str("prepress", true).unwrap(), PdfPreset::Prepress);
    }
}
