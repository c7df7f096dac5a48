//! Error types for the directory library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the directory library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid pagination configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Block kind name that matches no [`BlockKind`](crate::block::BlockKind)
    #[error("Unknown block kind: {0}")]
    UnknownKind(String),

    /// A block that cannot be placed
    #[error("Malformed block at index {index}: {reason}")]
    MalformedBlock { index: usize, reason: String },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Sheet without a header row
    #[error("Sheet has no header row: {}", .0.display())]
    EmptySheet(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedBlock {
            index,
            reason: reason.into(),
        }
    }
}
