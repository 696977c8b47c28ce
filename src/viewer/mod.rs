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

//! Base viewer
//!
//! Ties the frame pipeline to the shortcut table. The viewer owns:
//! - the pipeline, shared with bound actions through a `ViewerHandle`
//! - a `Dispatcher` holding this viewer's own shortcut table
//! - the registered plugins
//!
//! # Architecture
//!
//! The display loop is single threaded: one thread calls `tick()` and
//! `handle_key_event()` alternately. Actions are closures over a clone of
//! the handle (`Rc<RefCell<FramePipeline>>`); the pipeline is only
//! borrowed for the duration of one action or one `advance()`, never
//! across a plugin hook.
//!
//! # Built-in shortcuts
//!
//! | Key     | Action                          |
//! |---------|---------------------------------|
//! | `m`     | cycle colormap                  |
//! | `l`     | cycle linear / root / log scale |
//! | `z`     | cycle zoom level                |
//! | `v`     | toggle running average          |
//! | arrows  | pan the crop window             |
//!
//! Escape and `x` are reserved for quitting and can never be bound.
//!
//! # Example
//!
//! ```no_run
//! use camview::pipeline::{channel_source, FramePipeline};
//! use camview::viewer::{SnapshotPlugin, Viewer};
//!
//! let (_tx, source) = channel_source((256, 256));
//! let pipeline = FramePipeline::builder(Box::new(source)).build()?;
//!
//! let mut viewer = Viewer::new(pipeline)?;
//! viewer.register_plugin(Box::new(SnapshotPlugin::new("/tmp/snaps")))?;
//!
//! viewer.handle_key_event(0x040, 'm' as u32); // left-Ctrl + m: unmapped, dropped
//! viewer.handle_key_event(0, 'm' as u32); // cycles the colormap
//! viewer.tick()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dispatcher;
pub mod error;
pub mod plugin;
pub mod snapshot;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

pub use dispatcher::Dispatcher;
pub use error::SnapshotError;
pub use plugin::ViewerPlugin;
pub use snapshot::{save_png, SnapshotPlugin};

use crate::core::{keys, BindingInfo, Keymap, ShortcutError};
use crate::pipeline::{Direction, FramePipeline, PipelineError, TickOutcome};

/// Owner id of the built-in shortcuts
pub const VIEWER_OWNER: &str = "viewer";

/// Shared access to a viewer's pipeline, for actions and plugins
#[derive(Clone)]
pub struct ViewerHandle {
    pipeline: Rc<RefCell<FramePipeline>>,
}

impl ViewerHandle {
    /// Borrows the pipeline for reading
    ///
    /// Do not hold the borrow while invoking an action: actions borrow
    /// the pipeline mutably.
    pub fn pipeline(&self) -> Ref<'_, FramePipeline> {
        self.pipeline.borrow()
    }

    pub fn pipeline_mut(&self) -> RefMut<'_, FramePipeline> {
        self.pipeline.borrow_mut()
    }
}

/// Wraps a pipeline mutation into a shortcut action
fn on_pipeline<F>(handle: &ViewerHandle, f: F) -> impl Fn() + 'static
where
    F: Fn(&mut FramePipeline) + 'static,
{
    let handle = handle.clone();
    move || f(&mut *handle.pipeline_mut())
}

/// Built-in keymap of the base viewer
fn builtin_keymap(handle: &ViewerHandle) -> Result<Keymap, ShortcutError> {
    Keymap::new()
        .bind(
            "m",
            "cycle colormap",
            on_pipeline(handle, |p| {
                if let Err(e) = p.set_colormap(None) {
                    tracing::warn!(error = %e, "colormap change failed");
                }
            }),
        )?
        .bind("l", "cycle scaling", on_pipeline(handle, |p| p.set_scale_mode(None)))?
        .bind(
            "z",
            "cycle zoom",
            on_pipeline(handle, |p| {
                if let Err(e) = p.set_zoom(None) {
                    tracing::warn!(error = %e, "zoom change failed");
                }
            }),
        )?
        .bind("v", "toggle averaging", on_pipeline(handle, |p| p.toggle_averaging()))?
        .bind(keys::UP, "pan up", on_pipeline(handle, |p| p.steer(Direction::Up)))?
        .bind(keys::DOWN, "pan down", on_pipeline(handle, |p| p.steer(Direction::Down)))?
        .bind(keys::LEFT, "pan left", on_pipeline(handle, |p| p.steer(Direction::Left)))?
        .bind(keys::RIGHT, "pan right", on_pipeline(handle, |p| p.steer(Direction::Right)))
}

/// A live viewer: pipeline, shortcut dispatch and plugins
pub struct Viewer {
    handle: ViewerHandle,
    dispatcher: Dispatcher,
    plugins: Vec<Box<dyn ViewerPlugin>>,
}

impl Viewer {
    /// Creates a viewer with a fresh shortcut table holding the built-ins
    ///
    /// # Errors
    ///
    /// Only fails if a built-in descriptor is malformed.
    pub fn new(pipeline: FramePipeline) -> Result<Self, ShortcutError> {
        let handle = ViewerHandle {
            pipeline: Rc::new(RefCell::new(pipeline)),
        };

        let mut dispatcher = Dispatcher::new();
        dispatcher.register(VIEWER_OWNER, builtin_keymap(&handle)?)?;

        Ok(Self {
            handle,
            dispatcher,
            plugins: Vec::new(),
        })
    }

    /// Registers a plugin and its shortcuts
    ///
    /// Registration is all-or-nothing: on error neither the plugin nor any
    /// of its shortcuts are installed.
    ///
    /// # Errors
    ///
    /// * `DuplicateOwner` - plugin name is `"viewer"` or already registered
    /// * `ShortcutCollision` - a shortcut is already bound by another owner
    /// * `ReservedShortcut` - the plugin tries to bind a quit key
    /// * `InvalidShortcutFormat` - the plugin built a malformed descriptor
    pub fn register_plugin(&mut self, plugin: Box<dyn ViewerPlugin>) -> Result<(), ShortcutError> {
        let name = plugin.name().to_string();
        if name == VIEWER_OWNER || self.plugins.iter().any(|p| p.name() == name) {
            return Err(ShortcutError::DuplicateOwner { owner: name });
        }

        let keymap = plugin.shortcuts(&self.handle)?;
        self.dispatcher.register(&name, keymap)?;

        tracing::info!(plugin = %name, "plugin registered");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Runs one pipeline pass, then every plugin's per-frame hook
    ///
    /// Hooks are skipped when the source timed out, since nothing new was
    /// rendered.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        let outcome = self.handle.pipeline_mut().advance()?;
        self.run_hooks(outcome);
        Ok(outcome)
    }

    /// Re-renders the held frame without pulling from the source
    ///
    /// Used after a shortcut changed zoom, mode or palette while the source
    /// is idle. Hooks run as for a rendered tick.
    pub fn redraw(&mut self) -> TickOutcome {
        let outcome = self.handle.pipeline_mut().redraw();
        self.run_hooks(outcome);
        outcome
    }

    fn run_hooks(&mut self, outcome: TickOutcome) {
        if outcome != TickOutcome::Skipped {
            for plugin in &mut self.plugins {
                plugin.on_frame(&self.handle);
            }
        }
    }

    /// Dispatches a raw key event, see `Dispatcher::handle_key_event`
    pub fn handle_key_event(&self, modifiers: u32, key_code: u32) -> bool {
        self.dispatcher.handle_key_event(modifiers, key_code)
    }

    /// Dispatches a textual descriptor as a key event
    pub fn handle_descriptor(&self, descriptor: &str) -> Result<bool, ShortcutError> {
        self.dispatcher.handle_descriptor(descriptor)
    }

    pub fn handle(&self) -> ViewerHandle {
        self.handle.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// All bound shortcuts, grouped by owner
    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.dispatcher.bindings()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

#[cfg(test)]
mod tests;
