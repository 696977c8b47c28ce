//! Viewer plugin interface

use crate::core::{Keymap, ShortcutError};
use crate::viewer::ViewerHandle;

/// Extension hooked into a `Viewer`
///
/// A plugin contributes its own shortcuts once, at registration, and gets a
/// callback after every rendered frame. Hooks run synchronously inside the
/// display tick and must return quickly.
pub trait ViewerPlugin {
    /// Owner id used in the shortcut table; must be unique per viewer
    fn name(&self) -> &str;

    /// Shortcuts this plugin wants bound. The handle may be cloned into
    /// the actions for later access to the pipeline.
    fn shortcuts(&self, handle: &ViewerHandle) -> Result<Keymap, ShortcutError>;

    /// Called after each tick that produced new output. The pipeline is not
    /// borrowed while this runs.
    fn on_frame(&mut self, _handle: &ViewerHandle) {}
}
