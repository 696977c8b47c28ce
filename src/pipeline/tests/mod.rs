//! Pipeline module tests
//!
//! Contains test suites for the frame transform:
//! - Crop window and steering tests
//! - Z-scale bounds, clipping and degenerate ranges
//! - End-to-end pipeline passes (averaging, timeouts, colorizing)
//! - Frame source tests (channel, raw file, averaging helper)

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod source_tests;

use std::collections::VecDeque;
use std::time::Duration;

use crate::pipeline::{Frame, FrameSource, SourceError};

/// Test source: hands out queued frames, times out when empty
pub(crate) struct QueueSource {
    pub shape: (usize, usize),
    pub frames: VecDeque<Frame>,
}

impl QueueSource {
    pub fn new(shape: (usize, usize), frames: Vec<Frame>) -> Self {
        Self {
            shape,
            frames: frames.into(),
        }
    }
}

impl FrameSource for QueueSource {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn next_frame(&mut self, timeout: Duration) -> Result<Frame, SourceError> {
        self.frames.pop_front().ok_or(SourceError::Timeout(timeout))
    }
}
