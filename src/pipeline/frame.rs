//! Two-dimensional sample buffer and the statistics taken over it
//!
//! Frames are row-major `f32` arrays. The first row and first column of a
//! sensor frame carry invalid data, so every statistic here is computed
//! over the interior `[1.., 1..]` only.

use std::ops::Range;

/// A row-major 2D array of single-precision samples
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Frame {
    /// Wraps `data` as a `rows × cols` frame; `None` if the length is wrong
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Frame with every sample set to `value`
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Frame whose sample at (row, col) is `f(row, col)`
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Copies the sub-array `rows × cols` out of this frame.
    ///
    /// Ranges are clamped to the frame bounds.
    pub fn region(&self, rows: Range<usize>, cols: Range<usize>) -> Frame {
        let r0 = rows.start.min(self.rows);
        let r1 = rows.end.clamp(r0, self.rows);
        let c0 = cols.start.min(self.cols);
        let c1 = cols.end.clamp(c0, self.cols);

        let mut data = Vec::with_capacity((r1 - r0) * (c1 - c0));
        for r in r0..r1 {
            let start = r * self.cols;
            data.extend_from_slice(&self.data[start + c0..start + c1]);
        }

        Frame {
            rows: r1 - r0,
            cols: c1 - c0,
            data,
        }
    }

    /// Applies `f` to every sample in place
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Samples used for statistics: everything but the first row and column.
    ///
    /// Frames too small to have an interior fall back to all samples.
    pub fn interior(&self) -> Vec<f32> {
        if self.rows < 2 || self.cols < 2 {
            return self.data.clone();
        }

        let mut samples = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for r in 1..self.rows {
            let start = r * self.cols;
            samples.extend_from_slice(&self.data[start + 1..start + self.cols]);
        }
        samples
    }

    /// Min, max and mean over the interior
    pub fn interior_stats(&self) -> FrameStats {
        FrameStats::from_samples(&self.interior())
    }

    /// Percentile (0-100) of the interior, linear interpolation between ranks
    pub fn interior_percentile(&self, percent: f32) -> f32 {
        percentile(&mut self.interior(), percent)
    }
}

/// Summary statistics of a sample set
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl FrameStats {
    pub fn from_samples(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let (min, max, sum) = samples.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v as f64),
        );

        Self {
            min,
            max,
            mean: (sum / samples.len() as f64) as f32,
        }
    }
}

/// Percentile of `samples` (sorted in place), matching numpy's default
/// linear interpolation.
pub fn percentile(samples: &mut [f32], percent: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.sort_by(|a, b| a.total_cmp(b));

    let rank = (percent.clamp(0.0, 100.0) / 100.0) * (samples.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f32;

    samples[lower] + (samples[upper] - samples[lower]) * weight
}
