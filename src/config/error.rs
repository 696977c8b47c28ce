use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a viewer config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Configuration file is not valid JSON for `ViewerConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Zoom depth leaves the deepest crop window without a single pixel.
    #[error("max_zoom {max_zoom} is too deep for a {rows}x{cols} frame (at most {limit})")]
    ZoomTooDeep {
        max_zoom: u32,
        rows: usize,
        cols: usize,
        limit: u32,
    },
    /// Palette name with no built-in colormap.
    #[error("Unknown colormap '{0}'")]
    UnknownColormap(String),
    /// Empty palette list.
    #[error("At least one colormap must be configured")]
    NoColormaps,
    /// Startup palette index outside the palette list.
    #[error("initial_colormap {index} is out of range ({count} colormaps)")]
    InvalidInitialColormap { index: usize, count: usize },
    /// Clip bounds that leave nothing to display.
    #[error("Invalid clip range: low {low} must be below high {high}")]
    InvalidClip { low: f32, high: f32 },
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
