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

//! Non-linear intensity scaling
//!
//! Maps cropped samples to `[0, 1]` ready for colorizing. The display bounds
//! `low`/`high` come from, in priority order:
//! 1. the persistent user clip, if set
//! 2. the 80th percentile of the interior (low bound, non-linear modes only)
//! 3. the interior min/max of the cropped data
//!
//! Data is clipped into `[low, high]` whenever a bound did not come from the
//! data's own min/max, so the root and log operators never see `x < low`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pipeline::error::PipelineError;
use crate::pipeline::frame::Frame;

/// Percentile used as the automatic low bound in non-linear modes
pub const NONLINEAR_LOW_PERCENTILE: f32 = 80.0;

/// Exponent of the root operator
pub const ROOT_EXPONENT: f32 = 0.3;

/// Intensity transfer function
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    /// `(x - low)^0.3`
    Root,
    /// `log10(x - low + 1)`
    Log,
}

impl ScaleMode {
    /// Next mode in the cycle Linear → Root → Log → Linear
    pub fn next(self) -> Self {
        match self {
            ScaleMode::Linear => ScaleMode::Root,
            ScaleMode::Root => ScaleMode::Log,
            ScaleMode::Log => ScaleMode::Linear,
        }
    }

    pub fn is_linear(self) -> bool {
        self == ScaleMode::Linear
    }

    /// Applies the operator for a given low bound
    fn apply(self, x: f32, low: f32) -> f32 {
        match self {
            ScaleMode::Linear => x,
            ScaleMode::Root => (x - low).max(0.0).powf(ROOT_EXPONENT),
            ScaleMode::Log => (x - low + 1.0).log10(),
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::Linear => write!(f, "linear"),
            ScaleMode::Root => write!(f, "root"),
            ScaleMode::Log => write!(f, "log"),
        }
    }
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "lin" => Ok(ScaleMode::Linear),
            "root" | "pow" | "sqrt" => Ok(ScaleMode::Root),
            "log" => Ok(ScaleMode::Log),
            other => Err(format!("unknown scale mode '{}'", other)),
        }
    }
}

/// Persistent user-set display bounds. `None` means "derive per frame".
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClipRange {
    pub low: Option<f32>,
    pub high: Option<f32>,
}

impl ClipRange {
    pub fn new(low: Option<f32>, high: Option<f32>) -> Self {
        Self { low, high }
    }

    pub fn is_set(&self) -> bool {
        self.low.is_some() || self.high.is_some()
    }
}

/// Result of a z-scale pass
#[derive(Clone, Debug, PartialEq)]
pub struct Scaled {
    /// Normalized data, `[0, 1]` inside the bounds
    pub data: Frame,
    /// Interior min/max of the cropped input
    pub plot_min: f32,
    pub plot_max: f32,
    /// Bounds actually used, before the operator
    pub low: f32,
    pub high: f32,
}

/// Normalizes `cropped` for display.
///
/// # Errors
///
/// Returns `PipelineError::DegenerateScaleRange` when `op(high) - op(low)` is
/// not a positive finite number (flat frame, or a clip with `high <= low`).
/// The caller decides the fallback.
pub fn zscale(cropped: &Frame, mode: ScaleMode, clip: ClipRange) -> Result<Scaled, PipelineError> {
    let stats = cropped.interior_stats();

    let auto_low = match (clip.low, mode.is_linear()) {
        (None, false) => Some(cropped.interior_percentile(NONLINEAR_LOW_PERCENTILE)),
        _ => None,
    };

    let low = clip.low.or(auto_low).unwrap_or(stats.min);
    let high = clip.high.unwrap_or(stats.max);

    let op_low = mode.apply(low, low);
    let op_high = mode.apply(high, low);
    let span = op_high - op_low;

    if !(span.is_finite() && span > 0.0) {
        return Err(PipelineError::DegenerateScaleRange { low, high });
    }

    let clip_data = clip.is_set() || auto_low.is_some();
    let mut data = cropped.clone();
    data.map_in_place(|x| {
        let x = if clip_data { x.clamp(low, high) } else { x };
        (mode.apply(x, low) - op_low) / span
    });

    Ok(Scaled {
        data,
        plot_min: stats.min,
        plot_max: stats.max,
        low,
        high,
    })
}
