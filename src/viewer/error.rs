use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while exporting a snapshot of the display
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Nothing has been rendered yet
    #[error("No rendered frame to save")]
    NoFrame,

    /// PNG encoding failed
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),

    /// Atomic write of the snapshot file failed
    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
