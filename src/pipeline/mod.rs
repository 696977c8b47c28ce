// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-frame transform pipeline
//!
//! Each call to `FramePipeline::advance` runs five stages in order:
//!
//! 1. **Grab**: pull a frame from the source, or blend it into the running
//!    average when averaging is on
//! 2. **Reference**: dark / bias correction
//! 3. **Crop + stats**: uncropped statistics, then cut out the crop window
//! 4. **Z-scale**: non-linear intensity mapping to `[0, 1]`
//! 5. **Colorize**: palette lookup into an RGB image
//!
//! Recoverable conditions never surface as errors: a source timeout skips
//! the tick and keeps the previous output, a flat frame renders uniform
//! mid-gray.
//!
//! # Example
//!
//! ```no_run
//! use camview::pipeline::{channel_source, Colormap, FramePipeline, Frame, Palette};
//! use std::time::Duration;
//!
//! let (tx, source) = channel_source((128, 128));
//! let palettes: Vec<Box<dyn Palette>> = Colormap::DEFAULT_SET
//!     .iter()
//!     .map(|c| Box::new(*c) as Box<dyn Palette>)
//!     .collect();
//!
//! let mut pipeline = FramePipeline::builder(Box::new(source))
//!     .palettes(palettes)
//!     .timeout(Duration::from_millis(100))
//!     .build()?;
//!
//! tx.send(Frame::filled(128, 128, 1.0)).ok();
//! let outcome = pipeline.advance()?;
//! println!("{:?}", outcome);
//! # Ok::<(), camview::pipeline::PipelineError>(())
//! ```

pub mod crop;
pub mod error;
pub mod frame;
pub mod palette;
pub mod reference;
pub mod source;
pub mod zscale;

use image::RgbImage;
use std::time::Duration;

pub use crop::{CropState, CropWindow, Direction};
pub use error::{PipelineError, SourceError};
pub use frame::{Frame, FrameStats};
pub use palette::{colorize, Colormap, Palette};
pub use reference::{DarkReference, Passthrough, ReferenceProvider};
pub use source::{
    average_frames, channel_source, ChannelSource, FileFrameSource, FrameSender, FrameSource,
    SampleFormat,
};
pub use zscale::{zscale, ClipRange, ScaleMode};

/// Default deepest zoom level (16x)
pub const DEFAULT_MAX_ZOOM: u32 = 4;

/// Default frame wait, matching the camera SHM readers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Normalized value used for every pixel of a degenerate (flat) frame
pub const DEGENERATE_FILL: f32 = 0.5;

/// What one call to `advance` did
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// All five stages ran
    Rendered,
    /// All five stages ran, but the scale range was degenerate and the
    /// output is a uniform mid-scale image
    Degenerate,
    /// No frame arrived in time; previous output kept
    Skipped,
}

/// Running-average state
///
/// The running frame itself is the pipeline's raw buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AverageAccumulator {
    enabled: bool,
    count: u32,
}

impl AverageAccumulator {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Frames blended since averaging was switched on
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Flips averaging; the counter restarts only when switching on
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        if self.enabled {
            self.count = 0;
        }
    }

    /// `running = running * n/(n+1) + incoming/(n+1)`, then `n += 1`
    pub fn blend(&mut self, running: &mut Frame, incoming: &Frame) {
        let n = self.count as f32;
        let keep = n / (n + 1.0);
        let add = 1.0 / (n + 1.0);

        for (r, v) in running.data_mut().iter_mut().zip(incoming.data()) {
            *r = *r * keep + v * add;
        }
        self.count += 1;
    }
}

/// Statistics of the last rendered frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplayStats {
    /// Raw uncropped interior statistics
    pub raw: FrameStats,
    /// Interior min/max of the cropped data
    pub plot_min: f32,
    pub plot_max: f32,
    /// Display bounds used by the z-scale stage
    pub low: f32,
    pub high: f32,
}

/// Builder for `FramePipeline`
pub struct FramePipelineBuilder {
    source: Box<dyn FrameSource>,
    reference: Box<dyn ReferenceProvider>,
    palettes: Vec<Box<dyn Palette>>,
    colormap: usize,
    max_zoom: u32,
    center: Option<(f64, f64)>,
    scale_mode: ScaleMode,
    clip: ClipRange,
    timeout: Duration,
}

impl FramePipelineBuilder {
    pub fn reference(mut self, reference: Box<dyn ReferenceProvider>) -> Self {
        self.reference = reference;
        self
    }

    pub fn palettes(mut self, palettes: Vec<Box<dyn Palette>>) -> Self {
        self.palettes = palettes;
        self
    }

    /// Index of the startup palette
    pub fn colormap(mut self, index: usize) -> Self {
        self.colormap = index;
        self
    }

    pub fn max_zoom(mut self, max_zoom: u32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Initial (row, col) pan center
    pub fn center(mut self, center: (f64, f64)) -> Self {
        self.center = Some(center);
        self
    }

    pub fn scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    pub fn clip(mut self, clip: ClipRange) -> Self {
        self.clip = clip;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// * `NoPalettes` - the palette list is empty
    /// * `InvalidColormap` - the startup index is out of range
    pub fn build(self) -> Result<FramePipeline, PipelineError> {
        if self.palettes.is_empty() {
            return Err(PipelineError::NoPalettes);
        }
        if self.colormap >= self.palettes.len() {
            return Err(PipelineError::InvalidColormap {
                index: self.colormap,
                count: self.palettes.len(),
            });
        }

        let shape = self.source.shape();
        let crop = match self.center {
            Some(center) => CropState::with_center(shape, self.max_zoom, center),
            None => CropState::new(shape, self.max_zoom),
        };

        Ok(FramePipeline {
            source: self.source,
            reference: self.reference,
            palettes: self.palettes,
            colormap: self.colormap,
            crop,
            scale_mode: self.scale_mode,
            clip: self.clip,
            timeout: self.timeout,
            averaging: AverageAccumulator::default(),
            initialized: false,
            raw: Frame::filled(shape.0, shape.1, 0.0),
            debiased: None,
            cropped: None,
            zmapped: None,
            rgb: None,
            stats: DisplayStats::default(),
            frames_rendered: 0,
        })
    }
}

/// The five-stage frame transform and its display state
pub struct FramePipeline {
    source: Box<dyn FrameSource>,
    reference: Box<dyn ReferenceProvider>,
    palettes: Vec<Box<dyn Palette>>,
    colormap: usize,
    crop: CropState,
    scale_mode: ScaleMode,
    clip: ClipRange,
    timeout: Duration,
    averaging: AverageAccumulator,
    /// Set after the first full pass; averaging blends only once set
    initialized: bool,

    raw: Frame,
    debiased: Option<Frame>,
    cropped: Option<Frame>,
    zmapped: Option<Frame>,
    rgb: Option<RgbImage>,

    stats: DisplayStats,
    frames_rendered: u64,
}

impl FramePipeline {
    /// Starts a builder with pass-through reference, grayscale palette,
    /// default zoom depth and timeout
    pub fn builder(source: Box<dyn FrameSource>) -> FramePipelineBuilder {
        FramePipelineBuilder {
            source,
            reference: Box::new(Passthrough),
            palettes: vec![Box::new(Colormap::Gray)],
            colormap: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            center: None,
            scale_mode: ScaleMode::default(),
            clip: ClipRange::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Runs one full pass of the pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(TickOutcome::Rendered)` - new output available
    /// * `Ok(TickOutcome::Degenerate)` - new uniform output (flat frame)
    /// * `Ok(TickOutcome::Skipped)` - source timed out, output unchanged
    /// * `Err(PipelineError::Source)` - source failed for another reason
    pub fn advance(&mut self) -> Result<TickOutcome, PipelineError> {
        match self.grab() {
            Ok(()) => {}
            Err(SourceError::Timeout(waited)) => {
                tracing::warn!(?waited, "no frame within timeout, skipping tick");
                return Ok(TickOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        }

        self.reference_stage();
        self.crop_stage();
        let outcome = self.zscale_stage();
        self.colorize_stage();

        self.initialized = true;
        self.frames_rendered += 1;
        tracing::debug!(frame = self.frames_rendered, ?outcome, "pipeline pass complete");
        Ok(outcome)
    }

    /// Re-runs reference, crop, z-scale and colorize on the held frame
    ///
    /// Shows mode, zoom and palette changes without waiting for the source.
    /// Returns `TickOutcome::Skipped` until a first frame has been rendered.
    pub fn redraw(&mut self) -> TickOutcome {
        if !self.initialized {
            return TickOutcome::Skipped;
        }

        self.reference_stage();
        self.crop_stage();
        let outcome = self.zscale_stage();
        self.colorize_stage();
        outcome
    }

    fn grab(&mut self) -> Result<(), SourceError> {
        let incoming = self.source.next_frame(self.timeout)?;
        if incoming.shape() != self.raw.shape() {
            return Err(SourceError::ShapeMismatch {
                expected: self.raw.shape(),
                found: incoming.shape(),
            });
        }

        if self.averaging.enabled() && self.initialized {
            self.averaging.blend(&mut self.raw, &incoming);
        } else {
            self.raw = incoming;
        }
        Ok(())
    }

    fn reference_stage(&mut self) {
        self.debiased = Some(self.reference.correct(self.raw.clone()));
    }

    fn crop_stage(&mut self) {
        self.stats.raw = self.raw.interior_stats();

        let window = self.crop.window();
        self.cropped = self
            .debiased
            .as_ref()
            .map(|frame| frame.region(window.rows.clone(), window.cols.clone()));
    }

    fn zscale_stage(&mut self) -> TickOutcome {
        let Some(cropped) = self.cropped.as_ref() else {
            return TickOutcome::Skipped;
        };

        match zscale(cropped, self.scale_mode, self.clip) {
            Ok(scaled) => {
                self.stats.plot_min = scaled.plot_min;
                self.stats.plot_max = scaled.plot_max;
                self.stats.low = scaled.low;
                self.stats.high = scaled.high;
                self.zmapped = Some(scaled.data);
                TickOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!(error = %e, "rendering uniform frame");
                let plot = cropped.interior_stats();
                self.stats.plot_min = plot.min;
                self.stats.plot_max = plot.max;
                if let PipelineError::DegenerateScaleRange { low, high } = e {
                    self.stats.low = low;
                    self.stats.high = high;
                }
                self.zmapped = Some(Frame::filled(cropped.rows(), cropped.cols(), DEGENERATE_FILL));
                TickOutcome::Degenerate
            }
        }
    }

    fn colorize_stage(&mut self) {
        if let Some(zmapped) = &self.zmapped {
            let palette = self.palettes[self.colormap].as_ref();
            self.rgb = Some(colorize(zmapped, palette));
        }
    }

    // --- mode toggles -----------------------------------------------------

    /// Cycles to the next palette, or selects `index` directly
    pub fn set_colormap(&mut self, index: Option<usize>) -> Result<(), PipelineError> {
        let count = self.palettes.len();
        self.colormap = match index {
            None => (self.colormap + 1) % count,
            Some(i) if i < count => i,
            Some(i) => return Err(PipelineError::InvalidColormap { index: i, count }),
        };

        tracing::info!(colormap = self.palettes[self.colormap].name(), "colormap changed");
        Ok(())
    }

    /// Cycles Linear → Root → Log, or selects `mode` directly
    pub fn set_scale_mode(&mut self, mode: Option<ScaleMode>) {
        self.scale_mode = mode.unwrap_or_else(|| self.scale_mode.next());
        tracing::info!(mode = %self.scale_mode, "scale mode changed");
    }

    /// Sets persistent clip bounds; `None` derives that bound per frame
    pub fn set_clip(&mut self, low: Option<f32>, high: Option<f32>) {
        self.clip = ClipRange::new(low, high);
        tracing::info!(?low, ?high, "clip changed");
    }

    /// Toggles running averaging; the counter restarts when switched on
    pub fn toggle_averaging(&mut self) {
        self.averaging.toggle();
        tracing::info!(enabled = self.averaging.enabled(), "averaging toggled");
    }

    pub fn set_zoom(&mut self, level: Option<u32>) -> Result<(), PipelineError> {
        self.crop.set_zoom(level)
    }

    pub fn steer(&mut self, direction: Direction) {
        self.crop.steer(direction);
    }

    // --- read access --------------------------------------------------------

    pub fn shape(&self) -> (usize, usize) {
        self.raw.shape()
    }

    pub fn crop(&self) -> &CropState {
        &self.crop
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn clip(&self) -> ClipRange {
        self.clip
    }

    pub fn colormap(&self) -> usize {
        self.colormap
    }

    pub fn colormap_name(&self) -> &str {
        self.palettes[self.colormap].name()
    }

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    pub fn averaging(&self) -> AverageAccumulator {
        self.averaging
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Raw (or running-average) frame
    pub fn raw(&self) -> &Frame {
        &self.raw
    }

    pub fn cropped(&self) -> Option<&Frame> {
        self.cropped.as_ref()
    }

    /// Normalized output of the z-scale stage
    pub fn zmapped(&self) -> Option<&Frame> {
        self.zmapped.as_ref()
    }

    /// Latest colorized output
    pub fn rgb(&self) -> Option<&RgbImage> {
        self.rgb.as_ref()
    }

    pub fn stats(&self) -> DisplayStats {
        self.stats
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

#[cfg(test)]
pub(crate) mod tests;
