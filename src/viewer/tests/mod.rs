//! Viewer module tests
//!
//! Contains test suites for the viewer layer:
//! - Raw key event dispatch (numlock masking, unmapped keys)
//! - Built-in shortcuts, plugin registration and per-frame hooks
//! - Snapshot export


use std::cell::Cell;
use std::rc::Rc;

use crate::core::{Keymap, ShortcutError};
use crate::pipeline::tests::QueueSource;
use crate::pipeline::{Colormap, Frame, FramePipeline, Palette};
use crate::viewer::{Viewer, ViewerHandle, ViewerPlugin};

/// Viewer over a 64x64 ramp source with the default palette set
pub(crate) fn test_viewer(frames: usize) -> Viewer {
    let frames = (0..frames)
        .map(|i| Frame::from_fn(64, 64, move |r, c| (r + c + i) as f32))
        .collect();

    let palettes: Vec<Box<dyn Palette>> = Colormap::DEFAULT_SET
        .iter()
        .map(|c| Box::new(*c) as Box<dyn Palette>)
        .collect();

    let pipeline = FramePipeline::builder(Box::new(QueueSource::new((64, 64), frames)))
        .palettes(palettes)
        .build()
        .unwrap();

    Viewer::new(pipeline).unwrap()
}

/// Plugin binding one descriptor to a counter, and recording the frame
/// count the pipeline reports whenever its hook runs
pub(crate) struct CountingPlugin {
    pub name: String,
    pub descriptor: String,
    pub presses: Rc<Cell<u32>>,
    pub seen_frames: Rc<Cell<u64>>,
    pub hook_calls: Rc<Cell<u32>>,
}

impl CountingPlugin {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            presses: Rc::new(Cell::new(0)),
            seen_frames: Rc::new(Cell::new(0)),
            hook_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl ViewerPlugin for CountingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn shortcuts(&self, _handle: &ViewerHandle) -> Result<Keymap, ShortcutError> {
        let presses = Rc::clone(&self.presses);
        Keymap::new().bind(self.descriptor.as_str(), "count presses", move || {
            presses.set(presses.get() + 1)
        })
    }

    fn on_frame(&mut self, handle: &ViewerHandle) {
        self.hook_calls.set(self.hook_calls.get() + 1);
        self.seen_frames.set(handle.pipeline().frames_rendered());
    }
}
