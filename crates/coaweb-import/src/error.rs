//! Error types for coaweb-import

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Snapshot not found: {path}")]
    NotFound { path: String },

    #[error("Invalid JSON in {source_name}: {message}")]
    InvalidJson { source_name: String, message: String },

    #[error("Invalid sheet: {0}")]
    Sheet(#[from] csv::Error),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Bad row {row} in {source_name}: {message}")]
    BadRow {
        source_name: String,
        row: usize,
        message: String,
    },

    #[error("Unsupported snapshot format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("IO error")]
    IoError(#[from] io::Error),
}

impl ImportError {
    /// True when the snapshot file simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportError::NotFound { .. })
    }
}
