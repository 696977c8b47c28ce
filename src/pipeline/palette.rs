//! Colormaps
//!
//! A palette turns a normalized value into an RGBA color. The pipeline only
//! sees the `Palette` trait; the built-in `Colormap`s are coarse
//! piecewise-linear approximations of the matplotlib maps the camera
//! viewers traditionally use, good enough for live display.

use image::{Rgb, RgbImage};

use crate::pipeline::frame::Frame;

/// Maps normalized intensities to colors
pub trait Palette {
    /// Name used in configs and status lines
    fn name(&self) -> &str;

    /// Color for `value` in `[0, 1]`. Out-of-range values are clamped and
    /// NaN maps to the bottom of the scale.
    fn rgba(&self, value: f32) -> [u8; 4];
}

/// Built-in gradient colormaps
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Colormap {
    Gray,
    Inferno,
    Magma,
    Viridis,
    Seismic,
    Spectral,
}

type Stop = (f32, [u8; 3]);

const GRAY: &[Stop] = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

const INFERNO: &[Stop] = &[
    (0.0, [0, 0, 4]),
    (0.25, [87, 16, 110]),
    (0.5, [188, 55, 84]),
    (0.75, [249, 142, 9]),
    (1.0, [252, 255, 164]),
];

const MAGMA: &[Stop] = &[
    (0.0, [0, 0, 4]),
    (0.25, [81, 18, 124]),
    (0.5, [183, 55, 121]),
    (0.75, [252, 137, 97]),
    (1.0, [252, 253, 191]),
];

const VIRIDIS: &[Stop] = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

const SEISMIC: &[Stop] = &[
    (0.0, [0, 0, 77]),
    (0.25, [0, 0, 255]),
    (0.5, [255, 255, 255]),
    (0.75, [255, 0, 0]),
    (1.0, [128, 0, 0]),
];

const SPECTRAL: &[Stop] = &[
    (0.0, [158, 1, 66]),
    (0.25, [244, 109, 67]),
    (0.5, [255, 255, 191]),
    (0.75, [102, 194, 165]),
    (1.0, [94, 79, 162]),
];

impl Colormap {
    /// Palettes of the default set, in cycle order
    pub const DEFAULT_SET: [Colormap; 4] = [
        Colormap::Gray,
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Viridis,
    ];

    /// Looks up a colormap by (case-insensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gray" | "grey" => Some(Colormap::Gray),
            "inferno" => Some(Colormap::Inferno),
            "magma" => Some(Colormap::Magma),
            "viridis" => Some(Colormap::Viridis),
            "seismic" => Some(Colormap::Seismic),
            "spectral" => Some(Colormap::Spectral),
            _ => None,
        }
    }

    fn stops(self) -> &'static [Stop] {
        match self {
            Colormap::Gray => GRAY,
            Colormap::Inferno => INFERNO,
            Colormap::Magma => MAGMA,
            Colormap::Viridis => VIRIDIS,
            Colormap::Seismic => SEISMIC,
            Colormap::Spectral => SPECTRAL,
        }
    }
}

impl Palette for Colormap {
    fn name(&self) -> &str {
        match self {
            Colormap::Gray => "gray",
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
            Colormap::Viridis => "viridis",
            Colormap::Seismic => "seismic",
            Colormap::Spectral => "spectral",
        }
    }

    fn rgba(&self, value: f32) -> [u8; 4] {
        let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let stops = self.stops();

        let upper = stops.iter().position(|(at, _)| *at >= v).unwrap_or(stops.len() - 1);
        if upper == 0 {
            let [r, g, b] = stops[0].1;
            return [r, g, b, 255];
        }

        let (a_at, a) = stops[upper - 1];
        let (b_at, b) = stops[upper];
        let t = (v - a_at) / (b_at - a_at);
        let lerp = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;

        [lerp(0), lerp(1), lerp(2), 255]
    }
}

/// Colorizes a normalized frame, discarding alpha
pub fn colorize(normalized: &Frame, palette: &dyn Palette) -> RgbImage {
    let (rows, cols) = normalized.shape();
    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let value = normalized.get(y as usize, x as usize).unwrap_or(0.0);
        let [r, g, b, _] = palette.rgba(value);
        Rgb([r, g, b])
    })
}
