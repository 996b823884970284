//! Error types for the batch converter

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The output directory (or one of its ancestors) could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input directory {}: {source}", path.display())]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool could not be started at all, usually because it is not on PATH.
    #[error("could not launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// `code` is `None` when the process was killed by a signal.
    #[error("{tool} failed on {} ({})", file.display(), describe_code(*code))]
    ToolExit {
        tool: String,
        file: PathBuf,
        code: Option<i32>,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    /// Exit code of the failed tool, when there is one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ConvertError::ToolExit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_exit_message_names_tool_file_and_code() {
        let err = ConvertError::ToolExit {
            tool: "ocrmypdf".to_string(),
            file: PathBuf::from("in/scan.pdf"),
            code: Some(6),
        };
        assert_eq!(err.to_string(), "ocrmypdf failed on in/scan.pdf (exit code 6)");
        assert_eq!(err.exit_code(), Some(6));
    }

    #[test]
    fn test_signal_termination_has_no_exit_code() {
        let err = ConvertError::ToolExit {
            tool: "gs".to_string(),
            file: PathBuf::from("a.pdf"),
            code: None,
        };
        assert!(err.to_string().ends_with("(terminated by signal)"));
        assert_eq!(err.exit_code(), None);
    }
}
