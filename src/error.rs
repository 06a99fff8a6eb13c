//! Error types and handling for the complaint assembler
//! Created: 2025-06-03 11:31:05 UTC
//! Author: kartik4905

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for assembly operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for assembly operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Precondition failed: {0}")]
    PreconditionError(String),

    #[error("Form template not found: {}", .0.display())]
    TemplateMissingError(PathBuf),

    #[error("External tool error: {0}")]
    ExternalToolError(#[from] ExternalToolError),

    #[error("Redaction error: {0}")]
    RedactionError(#[from] RedactionError),

    #[error("Invalid complaint record: {0}")]
    InvalidRecord(String),

    #[error("Evidence file not found: {}", .0.display())]
    EvidenceMissing(PathBuf),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Merge error: {0}")]
    MergeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Assembly cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// True for failures the redaction failure policy is allowed to absorb
    pub fn is_redaction(&self) -> bool {
        matches!(self, Error::RedactionError(_))
    }
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExternalToolError {
    #[error("could not start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} reported success but produced no output at {}", .path.display())]
    MissingOutput { program: String, path: PathBuf },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RedactionError {
    #[error("cannot parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{} is encrypted", .0.display())]
    Encrypted(PathBuf),

    #[error("cannot rewrite content of {}: {reason}", .path.display())]
    Content { path: PathBuf, reason: String },

    #[error("cannot write redacted copy of {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    #[error("invalid redaction pattern: {0}")]
    Pattern(String),
}

impl RedactionError {
    /// Attaches an evidence path to a content failure raised below file level
    pub fn content(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        RedactionError::Content {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_errors_are_classified() {
        let err: Error = RedactionError::Encrypted(PathBuf::from("a.pdf")).into();
        assert!(err.is_redaction());
        assert!(!Error::Cancelled.is_redaction());
    }

    #[test]
    fn test_messages_name_the_file() {
        let err = Error::TemplateMissingError(PathBuf::from("data/F700-200-000.pdf"));
        assert_eq!(
            err.to_string(),
            "Form template not found: data/F700-200-000.pdf"
        );

        let err: Error = ExternalToolError::Failed {
            program: "pdftk".into(),
            status: "exit status: 1".into(),
            stderr: "Error: Unable to find file.".into(),
        }
        .into();
        assert!(err.to_string().contains("pdftk exited with exit status: 1"));
    }
}
