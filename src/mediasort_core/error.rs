use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SortError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to transfer files:\n{0}")]
    TransferFailed(TransferFailures),

    // Filesystem errors
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    // Metadata errors
    #[error("Exiftool error: {0}")]
    Exiftool(String),

    #[error("Exiftool is unavailable: {0}")]
    ExiftoolUnavailable(String),

    #[error("Exiftool could not find file: {0}")]
    MetadataFileNotFound(PathBuf),

    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),
}

/// Details about files that failed to copy or move.
#[derive(Debug, Default)]
pub struct TransferFailures {
    pub failures: Vec<TransferFailure>,
}

#[derive(Debug)]
pub struct TransferFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: std::io::Error,
}

impl std::fmt::Display for TransferFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for failure in &self.failures {
            writeln!(
                f,
                "  {} -> {}: {}",
                failure.source.display(),
                failure.destination.display(),
                failure.error
            )?;
        }
        Ok(())
    }
}

impl TransferFailures {
    pub fn add(&mut self, source: PathBuf, destination: PathBuf, error: std::io::Error) {
        self.failures.push(TransferFailure {
            source,
            destination,
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

/// Result type for mediasort operations.
pub type Result<T> = std::result::Result<T, SortError>;
