//! Reference / debias correction stage

use crate::pipeline::error::PipelineError;
use crate::pipeline::frame::Frame;

/// Produces a corrected frame of identical shape
pub trait ReferenceProvider {
    fn correct(&self, frame: Frame) -> Frame;
}

/// Identity correction
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl ReferenceProvider for Passthrough {
    fn correct(&self, frame: Frame) -> Frame {
        frame
    }
}

/// Bad-pixel masking followed by bias subtraction.
///
/// The bad-pixel map is multiplicative: 1 keeps a pixel, 0 zeroes it.
#[derive(Clone, Debug, Default)]
pub struct DarkReference {
    bias: Option<Frame>,
    bad_pixels: Option<Frame>,
}

impl DarkReference {
    /// Builds a correction for frames of `shape`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ShapeMismatch` if either map has another shape.
    pub fn new(
        shape: (usize, usize),
        bias: Option<Frame>,
        bad_pixels: Option<Frame>,
    ) -> Result<Self, PipelineError> {
        for map in [&bias, &bad_pixels].into_iter().flatten() {
            if map.shape() != shape {
                return Err(PipelineError::ShapeMismatch {
                    expected: shape,
                    found: map.shape(),
                });
            }
        }

        Ok(Self { bias, bad_pixels })
    }
}

impl ReferenceProvider for DarkReference {
    fn correct(&self, mut frame: Frame) -> Frame {
        if let Some(mask) = &self.bad_pixels {
            for (v, m) in frame.data_mut().iter_mut().zip(mask.data()) {
                *v *= m;
            }
        }

        if let Some(bias) = &self.bias {
            for (v, b) in frame.data_mut().iter_mut().zip(bias.data()) {
                *v -= b;
            }
        }

        frame
    }
}
