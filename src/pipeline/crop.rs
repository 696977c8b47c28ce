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

//! Pan/zoom model
//!
//! Zoom level `z` shows `1 / 2^z` of the frame on each axis: the crop
//! window's half-extent is `extent / 2^(z+1)`. Level 0 is the whole frame.
//!
//! The window is kept inside the frame by clamping the *center*, never by
//! trimming the window, so the window size only depends on the zoom level.
//!
//! # Precondition
//! `max_zoom` must be small enough that `min(rows, cols) / 2^(max_zoom+1)`
//! is at least one pixel. `CropState` does not check this; see
//! `ViewerConfig::validate_for_shape`.

use std::ops::Range;

use crate::pipeline::error::PipelineError;

/// Pan direction for `CropState::steer`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Toward row 0
    Up,
    Down,
    /// Toward column 0
    Left,
    Right,
}

/// Half-open index ranges of the visible part of the frame
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CropWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl CropWindow {
    /// (rows, cols) of the window
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }
}

/// Current zoom level and pan center over a fixed-shape frame
#[derive(Clone, Debug)]
pub struct CropState {
    shape: (usize, usize),
    center: (f64, f64),
    zoom_level: u32,
    max_zoom: u32,
    window: CropWindow,
}

impl CropState {
    /// Full-frame view centered on the frame
    pub fn new(shape: (usize, usize), max_zoom: u32) -> Self {
        let center = (shape.0 as f64 / 2.0, shape.1 as f64 / 2.0);
        Self::with_center(shape, max_zoom, center)
    }

    /// Full-frame view with a custom pan center, used once zoomed in
    pub fn with_center(shape: (usize, usize), max_zoom: u32, center: (f64, f64)) -> Self {
        let mut state = Self {
            shape,
            center,
            zoom_level: 0,
            max_zoom,
            window: CropWindow {
                rows: 0..shape.0,
                cols: 0..shape.1,
            },
        };
        state.recompute();
        state
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// (row, col) pan center
    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn window(&self) -> &CropWindow {
        &self.window
    }

    /// Half-extent of the window on each axis at the current zoom level
    pub fn half_extent(&self) -> (f64, f64) {
        let divisor = 2f64.powi(self.zoom_level as i32 + 1);
        (self.shape.0 as f64 / divisor, self.shape.1 as f64 / divisor)
    }

    /// Sets the zoom level, or advances it cyclically when `level` is `None`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidZoomLevel` if `level` exceeds `max_zoom`.
    pub fn set_zoom(&mut self, level: Option<u32>) -> Result<(), PipelineError> {
        self.zoom_level = match level {
            None => (self.zoom_level + 1) % (self.max_zoom + 1),
            Some(level) if level <= self.max_zoom => level,
            Some(level) => {
                return Err(PipelineError::InvalidZoomLevel {
                    level,
                    max: self.max_zoom,
                })
            }
        };

        self.recompute();
        tracing::debug!(zoom = self.zoom_level, window = ?self.window, "zoom changed");
        Ok(())
    }

    /// Pans by one source pixel's worth at the deepest zoom level.
    ///
    /// The center moves `2^(max_zoom - zoom_level)` pixels, which keeps the
    /// on-screen pan speed constant across zoom levels. At level 0 the whole
    /// frame is visible and steering does nothing.
    pub fn steer(&mut self, direction: Direction) {
        if self.zoom_level == 0 {
            return;
        }

        let step = 2f64.powi((self.max_zoom - self.zoom_level) as i32);
        let (row, col) = &mut self.center;
        match direction {
            Direction::Up => *row -= step,
            Direction::Down => *row += step,
            Direction::Left => *col -= step,
            Direction::Right => *col += step,
        }

        self.recompute();
    }

    /// Clamps the center (zoom > 0) and rebuilds the window
    fn recompute(&mut self) {
        if self.zoom_level == 0 {
            self.window = CropWindow {
                rows: 0..self.shape.0,
                cols: 0..self.shape.1,
            };
            return;
        }

        let (half_r, half_c) = self.half_extent();
        self.center.0 = clamp_center(self.center.0, half_r, self.shape.0);
        self.center.1 = clamp_center(self.center.1, half_c, self.shape.1);

        self.window = CropWindow {
            rows: bounds(self.center.0, half_r),
            cols: bounds(self.center.1, half_c),
        };
    }
}

fn clamp_center(center: f64, half: f64, extent: usize) -> f64 {
    let upper = extent as f64 - half;
    if half > upper {
        // Window wider than the frame: pin to the middle
        return extent as f64 / 2.0;
    }
    center.clamp(half, upper)
}

fn bounds(center: f64, half: f64) -> Range<usize> {
    let low = (center - half).round().max(0.0) as usize;
    let high = (center + half).round().max(0.0) as usize;
    low..high
}
