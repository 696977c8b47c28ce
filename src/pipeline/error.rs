use std::time::Duration;
use thiserror::Error;

/// Errors raised by frame sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No frame arrived within the timeout. Recoverable: skip the tick.
    #[error("No frame within {0:?}")]
    Timeout(Duration),

    /// The producer went away
    #[error("Frame source disconnected: {0}")]
    Disconnected(String),

    /// Delivered frame does not have the session's shape
    #[error("Frame shape {found:?} does not match source shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Raw file holds fewer or more bytes than one frame
    #[error("Frame file has {found} bytes, expected {expected}")]
    Truncated { expected: usize, found: usize },

    /// Generic I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File watcher could not be set up
    #[error("File watch failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Errors raised by the frame pipeline and its crop model.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Zoom level outside `0..=max`
    #[error("Invalid zoom level {level}: must be between 0 and {max}")]
    InvalidZoomLevel { level: u32, max: u32 },

    /// Display bounds collapse to a single value (flat frame)
    #[error("Degenerate scale range: low {low} and high {high} map to the same value")]
    DegenerateScaleRange { low: f32, high: f32 },

    /// Colormap index outside the palette set
    #[error("Invalid colormap {index}: {count} palettes loaded")]
    InvalidColormap { index: usize, count: usize },

    /// Two arrays that must match in shape do not
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Pipeline was built with no palettes
    #[error("At least one palette is required")]
    NoPalettes,

    /// Non-recoverable frame source error
    #[error(transparent)]
    Source(#[from] SourceError),
}
