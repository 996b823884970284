//! External tool invocation
//!
//! The OCR engine and the compressor are plain subprocesses. Command lines are
//! built as [`ToolInvocation`] values and executed through a [`ToolRunner`], so
//! the pipeline can be driven by a fake runner in tests.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use super::config::{BatchConfig, CompressSettings, OcrSettings};
use super::error::ConvertError;

/// A fully built command line for one tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// The file the tool reads, used when reporting failures
    pub input: PathBuf,
}

impl ToolInvocation {
    /// Render the command line for logging
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// `<ocr-tool> --output-type pdfa <input> <output>`
pub fn ocr_invocation(settings: &OcrSettings, input: &Path, output: &Path) -> ToolInvocation {
    ToolInvocation {
        program: settings.program.clone(),
        args: vec![
            OsString::from("--output-type"),
            OsString::from(&settings.output_type),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ],
        input: input.to_path_buf(),
    }
}

/// `<gs> -sDEVICE=pdfwrite -dPDFSETTINGS=/<preset> -dNOPAUSE -dQUIET -dBATCH -sOutputFile=<output> <input>`
pub fn compress_invocation(
    settings: &CompressSettings,
    input: &Path,
    output: &Path,
) -> ToolInvocation {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output.as_os_str());

    ToolInvocation {
        program: settings.program.clone(),
        args: vec![
            OsString::from("-sDEVICE=pdfwrite"),
            OsString::from(format!("-dPDFSETTINGS=/{}", settings.preset)),
            OsString::from("-dNOPAUSE"),
            OsString::from("-dQUIET"),
            OsString::from("-dBATCH"),
            output_arg,
            input.as_os_str().to_owned(),
        ],
        input: input.to_path_buf(),
    }
}

/// Runs a tool to completion
pub trait ToolRunner {
    /// Block until the tool exits. A non-zero exit is `ConvertError::ToolExit`,
    /// a process that cannot be spawned is `ConvertError::ToolLaunch`.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ConvertError>;
}

/// Runs tools as real child processes resolved through `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ConvertError> {
        debug!(command = %invocation.display(), "running tool");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ConvertError::ToolLaunch {
                tool: invocation.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(tool = %invocation.program, stderr = %stderr.trim(), "tool stderr");
        }

        Err(ConvertError::ToolExit {
            tool: invocation.program.clone(),
            file: invocation.input.clone(),
            code: output.status.code(),
        })
    }
}

/// Names of configured tools that cannot be found on `PATH`
pub fn find_missing_tools(config: &BatchConfig) -> Vec<String> {
    [&config.ocr.program, &config.compress.program]
        .into_iter()
        .filter(|program| which::which(program.as_str()).is_err())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PdfPreset;

    fn args_of(invocation: &ToolInvocation) -> Vec<String> {
        invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_ocr_command_line() {
        let invocation = ocr_invocation(
            &OcrSettings::default(),
            Path::new("in/scan.pdf"),
            Path::new("out/scan_ocr.pdf"),
        );
        assert_eq!(invocation.program, "ocrmypdf");
        assert_eq!(
            args_of(&invocation),
            vec!["--output-type", "pdfa", "in/scan.pdf", "out/scan_ocr.pdf"]
        );
        assert_eq!(invocation.input, PathBuf::from("in/scan.pdf"));
    }

    #[test]
    fn test_compress_command_line() {
        let invocation = compress_invocation(
            &CompressSettings::default(),
            Path::new("out/scan_ocr.pdf"),
            Path::new("out/scan_ocr_compressed.pdf"),
        );
        assert_eq!(invocation.program, "gs");
        assert_eq!(
            args_of(&invocation),
            vec![
                "-sDEVICE=pdfwrite",
                "-dPDFSETTINGS=/ebook",
                "-dNOPAUSE",
                "-dQUIET",
                "-dBATCH",
                "-sOutputFile=out/scan_ocr_compressed.pdf",
                "out/scan_ocr.pdf",
            ]
        );
    }

    #[test]
    fn test_compress_uses_configured_preset() {
        let settings = CompressSettings {
            program: "gswin64c".to_string(),
            preset: PdfPreset::Screen,
        };
        let invocation = compress_invocation(&settings, Path::new("a.pdf"), Path::new("b.pdf"));
        assert_eq!(invocation.program, "gswin64c");
        assert!(args_of(&invocation).contains(&"-dPDFSETTINGS=/screen".to_string()));
    }

    #[test]
    fn test_display_joins_program_and_args() {
        let invocation = ocr_invocation(
            &OcrSettings::default(),
            Path::new("a.pdf"),
            Path::new("b.pdf"),
        );
        assert_eq!(invocation.display(), "ocrmypdf --output-type pdfa a.pdf b.pdf");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let invocation = ToolInvocation {
            program: "definitely-not-a-real-tool-4f2a9c".to_string(),
            args: Vec::new(),
            input: PathBuf::from("x.pdf"),
        };
        let err = SystemToolRunner.run(&invocation).unwrap_err();
        assert!(matches!(err, ConvertError::ToolLaunch { .. }));
    }

    #[test]
    fn test_find_missing_tools_reports_unknown_programs() {
        let mut config = BatchConfig::default();
        config.ocr.program = "definitely-not-a-real-tool-4f2a9c".to_string();
        config.compress.program = "definitely-not-a-real-tool-7b1e0d".to_string();
        assert_eq!(find_missing_tools(&config).len(), 2);
    }
}
