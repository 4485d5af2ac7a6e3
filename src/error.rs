//! Error types for opcode-tools.
//!
//! Every fallible operation in the library returns [`ToolError`], so the
//! binary can report the failing step (directory walk, disassembler,
//! report arithmetic, or conversion input) with a single message.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for the reporter and the converter.
#[derive(Debug, Error)]
pub enum ToolError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed part way through.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The directory to scan does not exist or is not a directory.
    #[error("Root directory not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// The external disassembler could not be run.
    #[error("Disassembler `{tool}` failed: {message}")]
    Disassembler { tool: String, message: String },

    /// A scanned file produced no instructions, so its frequencies are undefined.
    #[error("No instructions disassembled from {file}: cannot compute frequencies")]
    NoInstructions { file: String },

    /// A hex array token is not a valid byte.
    #[error("Invalid hex byte `{token}`")]
    InvalidHexToken { token: String },

    /// A hex array contained no bytes at all.
    #[error("Empty hex array: no byte tokens found")]
    EmptyHexArray,

    /// A binary opcode did not have exactly 32 digits.
    #[error("Invalid binary length: expected 32 digits, got {actual}")]
    InvalidBinaryLength { actual: usize },

    /// A binary opcode contained something other than `0` or `1`.
    #[error("Invalid binary digit `{digit}`")]
    InvalidBinaryDigit { digit: char },

    /// Report serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An invocation setting is unusable, such as an empty section name.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Result type alias for opcode-tools operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an IO error, keeping other errors unchanged.
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| match e {
            ToolError::Io(io) => ToolError::Io(std::io::Error::new(
                io.kind(),
                format!("{}: {}", msg.into(), io),
            )),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToolError::InvalidBinaryLength { actual: 31 };
        let msg = err.to_string();
        assert!(msg.contains("Invalid binary length"));
        assert!(msg.contains("31"));
    }

    #[test]
    fn test_no_instructions_names_file() {
        let err = ToolError::NoInstructions {
            file: "sub/empty.elf".to_string(),
        };
        assert!(err.to_string().contains("sub/empty.elf"));
    }

    #[test]
    fn test_context_wraps_io() {
        let result: Result<()> = Err(ToolError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        )));
        let err = result.context("writing frequency.csv").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("writing frequency.csv"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_context_keeps_other_errors() {
        let result: Result<()> = Err(ToolError::InvalidHexToken {
            token: "zz".to_string(),
        });
        let err = result.context("ignored").unwrap_err();
        assert!(matches!(err, ToolError::InvalidHexToken { .. }));
    }
}
