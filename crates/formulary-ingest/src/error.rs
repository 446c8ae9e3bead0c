//! Error types for formulary ingestion.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One failed decoding strategy, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    pub strategy: String,
    pub error: String,
}

impl fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

fn format_attempts(attempts: &[DecodeAttempt]) -> String {
    if attempts.is_empty() {
        return "no decoding strategy configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while reading formulary sources.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Source Errors ===
    /// Required input file is absent.
    #[error("source file not found: {path}")]
    SourceMissing { path: PathBuf },

    /// The file holds HTML markup (typically a saved error page) instead of
    /// a spreadsheet.
    #[error(
        "{path} contains HTML, not a spreadsheet (download failed or was redirected); \
         re-download the file and replace it"
    )]
    SourceIsNotTabular { path: PathBuf },

    /// Every decoding strategy failed.
    #[error("cannot read spreadsheet {path}: {}", format_attempts(.attempts))]
    SourceUnreadable {
        path: PathBuf,
        attempts: Vec<DecodeAttempt>,
    },

    // === File System Errors ===
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Decoding Errors ===
    /// A single decoding strategy rejected the file.
    #[error("{message}")]
    Decode {
        strategy: &'static str,
        message: String,
    },

    /// The paginated document could not be opened or read.
    #[error("failed to read document {path}: {message}")]
    Document { path: PathBuf, message: String },
}

impl IngestError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::SourceMissing { path }
        } else {
            Self::FileRead { path, source }
        }
    }

    pub(crate) fn decode(strategy: &'static str, message: impl fmt::Display) -> Self {
        Self::Decode {
            strategy,
            message: message.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
