//! Viewer configuration
//!
//! Settings are plain JSON, every field optional:
//!
//! ```json
//! {
//!   "max_zoom": 4,
//!   "colormaps": ["gray", "inferno", "magma", "viridis"],
//!   "initial_colormap": 1,
//!   "scale_mode": "root",
//!   "clip_low": null,
//!   "clip_high": 4000.0,
//!   "timeout_ms": 1000,
//!   "crop_center": [128.0, 128.0],
//!   "snapshot_dir": "~/snapshots"
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use camview::config::load_config;
//!
//! let config = load_config("~/.config/camview/viewer.json")?;
//! config.validate_for_shape(256, 256)?;
//! println!("{} colormaps", config.colormaps.len());
//! # Ok::<(), camview::config::ConfigError>(())
//! ```

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::{
    ClipRange, Colormap, FramePipeline, FramePipelineBuilder, FrameSource, Palette, ScaleMode,
    DEFAULT_MAX_ZOOM,
};

/// Display settings applied when a viewer starts.
///
/// Nothing is written back: changes made with shortcuts last for the
/// session only.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Deepest zoom level; level z shows 1/2^z of each axis
    pub max_zoom: u32,
    /// Palette names, in the order `m` cycles through them
    pub colormaps: Vec<String>,
    /// Index into `colormaps` used at startup
    pub initial_colormap: usize,
    pub scale_mode: ScaleMode,
    pub clip_low: Option<f32>,
    pub clip_high: Option<f32>,
    /// Frame wait before a tick is skipped
    pub timeout_ms: u64,
    /// Initial (row, col) pan center; frame center if absent
    pub crop_center: Option<(f64, f64)>,
    /// Where `SnapshotPlugin` writes PNGs (`~` is expanded)
    pub snapshot_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_zoom: DEFAULT_MAX_ZOOM,
            colormaps: ["gray", "inferno", "magma", "viridis"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            initial_colormap: 1,
            scale_mode: ScaleMode::Linear,
            clip_low: None,
            clip_high: None,
            timeout_ms: 1000,
            crop_center: None,
            snapshot_dir: PathBuf::from("."),
        }
    }
}

impl ViewerConfig {
    /// Checks everything that does not depend on the frame shape
    ///
    /// # Errors
    ///
    /// * `NoColormaps` - empty palette list
    /// * `UnknownColormap` - a palette name has no built-in colormap
    /// * `InvalidInitialColormap` - startup index out of range
    /// * `InvalidClip` - both clip bounds set and `low >= high`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colormaps.is_empty() {
            return Err(ConfigError::NoColormaps);
        }

        if let Some(unknown) = self
            .colormaps
            .iter()
            .find(|name| Colormap::from_name(name).is_none())
        {
            return Err(ConfigError::UnknownColormap(unknown.clone()));
        }

        if self.initial_colormap >= self.colormaps.len() {
            return Err(ConfigError::InvalidInitialColormap {
                index: self.initial_colormap,
                count: self.colormaps.len(),
            });
        }

        if let (Some(low), Some(high)) = (self.clip_low, self.clip_high) {
            if low >= high {
                return Err(ConfigError::InvalidClip { low, high });
            }
        }

        Ok(())
    }

    /// Full validation for frames of `rows` x `cols`
    ///
    /// The crop model requires the deepest window to keep at least one
    /// pixel per axis: `min(rows, cols) / 2^(max_zoom + 1) >= 1`.
    ///
    /// # Errors
    ///
    /// Everything `validate` reports, plus `ZoomTooDeep`.
    pub fn validate_for_shape(&self, rows: usize, cols: usize) -> Result<(), ConfigError> {
        self.validate()?;

        let limit = max_zoom_for(rows.min(cols));
        if limit.map_or(true, |limit| self.max_zoom > limit) {
            return Err(ConfigError::ZoomTooDeep {
                max_zoom: self.max_zoom,
                rows,
                cols,
                limit: limit.unwrap_or(0),
            });
        }

        Ok(())
    }

    /// Palettes named by `colormaps`, in order
    pub fn palettes(&self) -> Result<Vec<Box<dyn Palette>>, ConfigError> {
        self.colormaps
            .iter()
            .map(|name| {
                Colormap::from_name(name)
                    .map(|c| Box::new(c) as Box<dyn Palette>)
                    .ok_or_else(|| ConfigError::UnknownColormap(name.clone()))
            })
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn clip(&self) -> ClipRange {
        ClipRange::new(self.clip_low, self.clip_high)
    }

    /// Snapshot directory with `~` expanded
    pub fn snapshot_dir(&self) -> PathBuf {
        expand_path(&self.snapshot_dir.to_string_lossy())
    }

    /// Validates against the source's shape and returns a pipeline builder
    /// carrying every setting
    pub fn pipeline_builder(&self, source: Box<dyn FrameSource>) -> Result<FramePipelineBuilder, ConfigError> {
        let (rows, cols) = source.shape();
        self.validate_for_shape(rows, cols)?;

        let mut builder = FramePipeline::builder(source)
            .palettes(self.palettes()?)
            .colormap(self.initial_colormap)
            .max_zoom(self.max_zoom)
            .scale_mode(self.scale_mode)
            .clip(self.clip())
            .timeout(self.timeout());

        if let Some(center) = self.crop_center {
            builder = builder.center(center);
        }

        Ok(builder)
    }
}

/// Deepest zoom that keeps a window of at least one pixel on an axis of
/// `extent` pixels, or `None` if even level 0 has no half-window
fn max_zoom_for(extent: usize) -> Option<u32> {
    // extent / 2^(z+1) >= 1  <=>  z + 1 <= floor(log2(extent))
    extent.checked_ilog2().and_then(|bits| bits.checked_sub(1))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Loads and validates a config file
///
/// `~` in the path is expanded.
///
/// # Errors
///
/// * `NotFound` - no file at the expanded path
/// * `Io` - the file could not be read
/// * `Parse` - not valid JSON or unknown fields
/// * anything `ViewerConfig::validate` reports
pub fn load_config(path: impl AsRef<Path>) -> Result<ViewerConfig, ConfigError> {
    let path = expand_path(&path.as_ref().to_string_lossy());
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }

    let content = fs::read_to_string(&path)?;
    let config: ViewerConfig = serde_json::from_str(&content)?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
