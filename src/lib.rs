// Copyright 2025 bakri (tidynest@proton.me)
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

//! camview
//!
//! Live-display engine for a scientific camera feed: turns raw frames into
//! a false-colored, pan/zoomed RGB image, and lets an operator steer the
//! display through a collision-checked table of keyboard shortcuts.
//!
//! # Features
//!
//! - **Frame pipeline:** grab → reference-correct → crop → z-scale → colorize
//! - **Pan/zoom:** clamped crop window, pixel-accurate steering
//! - **Z-scaling:** linear, root (x^0.3) and log intensity maps with clipping
//! - **Running average:** toggled on the fly, exact for constant input
//! - **Shortcuts:** "lc-m" style descriptors, per-owner collision detection
//! - **Plugins:** extra shortcuts and per-frame hooks (PNG snapshots built in)
//!
//! # Architecture
//!
//! - **`core`:** Shortcut types, descriptor codec, shortcut table
//! - **`pipeline`:** Frames, sources, crop model, z-scale, palettes
//! - **`viewer`:** Key dispatch, base viewer, plugins, snapshots
//! - **`config`:** JSON viewer settings
//!
//! The rendering window and the camera transport are outside this crate:
//! frames come in through a `FrameSource`, key events through
//! `Viewer::handle_key_event`, and the output is an `image::RgbImage`.
//!
//! # Examples
//!
//! ## Encoding a shortcut
//!
//! ```
//! use camview::core::{encode_shortcut, Modifier};
//!
//! let key = encode_shortcut("lc-m")?;
//! assert_eq!(key.modifier_mask(), Modifier::LeftCtrl.bit());
//! assert_eq!(key.key_code(), 'm' as u32);
//! # Ok::<(), camview::core::ShortcutError>(())
//! ```
//!
//! ## Rendering a frame
//!
//! ```
//! use camview::pipeline::{channel_source, Frame, FramePipeline, TickOutcome};
//!
//! let (tx, source) = channel_source((64, 64));
//! let mut pipeline = FramePipeline::builder(Box::new(source)).build()?;
//!
//! tx.send(Frame::from_fn(64, 64, |r, c| (r * c) as f32)).ok();
//! assert_eq!(pipeline.advance()?, TickOutcome::Rendered);
//! assert_eq!(pipeline.rgb().map(|img| img.dimensions()), Some((64, 64)));
//! # Ok::<(), camview::pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod core;
pub mod pipeline;
pub mod viewer;

// Re-export commonly used types for convenience
pub use crate::core::{encode_shortcut, Modifier, ShortcutError, ShortcutKey, ShortcutTable};
pub use pipeline::{Frame, FramePipeline, TickOutcome};
pub use viewer::{Viewer, ViewerPlugin};
