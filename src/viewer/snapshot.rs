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

//! PNG snapshots of the display
//!
//! Provides the `SnapshotPlugin` (bound to left-Ctrl + s) and the
//! `save_png` helper the CLI uses for its output file.
//!
//! Files are written atomically (temp file + rename), so a viewer polling
//! the output path never sees a half-written PNG.

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use image::{ImageFormat, RgbImage};
use std::cell::Cell;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::core::{Keymap, ShortcutError};
use crate::viewer::error::SnapshotError;
use crate::viewer::plugin::ViewerPlugin;
use crate::viewer::ViewerHandle;

/// Encodes `image` as PNG and atomically writes it to `path`
///
/// # Errors
///
/// * `SnapshotError::Encode` - PNG encoding failed
/// * `SnapshotError::Write` - the file could not be written or committed
pub fn save_png(image: &RgbImage, path: &Path) -> Result<(), SnapshotError> {
    let mut encoded = Vec::new();
    image.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

    let write_err = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = AtomicWriteFile::options().open(path).map_err(write_err)?;
    file.write_all(&encoded).map_err(write_err)?;
    file.commit().map_err(write_err)?;

    Ok(())
}

/// Timestamped snapshot file name inside `dir`
///
/// Format: `snapshot_YYYY-MM-DD_HHMMSS.mmm.png`
pub fn snapshot_path(dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S%.3f");
    dir.join(format!("snapshot_{}.png", timestamp))
}

/// Saves the next rendered frame when armed by its shortcut
#[derive(Debug)]
pub struct SnapshotPlugin {
    dir: PathBuf,
    armed: Rc<Cell<bool>>,
    saved: Vec<PathBuf>,
}

impl SnapshotPlugin {
    /// Descriptor of the arming shortcut
    pub const SHORTCUT: &'static str = "lc-s";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            armed: Rc::new(Cell::new(false)),
            saved: Vec::new(),
        }
    }

    /// Requests a snapshot of the next rendered frame
    pub fn arm(&self) {
        self.armed.set(true);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Files written so far, oldest first
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Writes the current RGB output immediately
    pub fn capture(&mut self, handle: &ViewerHandle) -> Result<PathBuf, SnapshotError> {
        let pipeline = handle.pipeline();
        let rgb = pipeline.rgb().ok_or(SnapshotError::NoFrame)?;

        fs::create_dir_all(&self.dir)?;
        let path = snapshot_path(&self.dir);
        save_png(rgb, &path)?;

        self.saved.push(path.clone());
        Ok(path)
    }
}

impl ViewerPlugin for SnapshotPlugin {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn shortcuts(&self, _handle: &ViewerHandle) -> Result<Keymap, ShortcutError> {
        let armed = Rc::clone(&self.armed);
        Keymap::new().bind(Self::SHORTCUT, "save snapshot of next frame", move || armed.set(true))
    }

    fn on_frame(&mut self, handle: &ViewerHandle) {
        if !self.armed.replace(false) {
            return;
        }

        match self.capture(handle) {
            Ok(path) => tracing::info!(path = %path.display(), "snapshot saved"),
            Err(e) => tracing::warn!(error = %e, "snapshot failed"),
        }
    }
}
