//! Error types for the splitter
//!
//! Page-level problems are `ExtractionError`s: they are carried inside the
//! classifier's result, logged as warnings and never stop a run.
//! `SplitError` covers everything outside the per-page loop.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single page could not be turned into an artifact key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No line containing the name marker (followed by another line)
    #[error("no name marker found")]
    MissingNameMarker,

    /// Single-token name line without an uppercase run
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Name line is empty or absent
    #[error("no name found")]
    MissingName,

    #[error("no period marker found")]
    MissingPeriodMarker,

    #[error("no trailing date found")]
    MissingTrailingDate,

    #[error("could not parse date {0}")]
    DateParseError(String),

    /// Continuation page seen before any artifact was created
    #[error("continuation page without a preceding document")]
    PageContinuationWithoutPredecessor,
}

/// Failures that abort (or would abort) a whole run
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("invalid source path: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker thread panicked")]
    WorkerPanicked,
}

impl SplitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<lopdf::Error> for SplitError {
    fn from(e: lopdf::Error) -> Self {
        SplitError::Pdf(e.to_string())
    }
}
