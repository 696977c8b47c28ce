use thiserror::Error;

use crate::core::types::ShortcutKey;

/// Errors raised while building the shortcut table.
///
/// All of these are wiring errors: they are detected once at startup and
/// abort it. None of them can occur while dispatching key events.
#[derive(Debug, Error, PartialEq)]
pub enum ShortcutError {
    /// Descriptor is not "modifier tokens, dash, one key symbol"
    #[error("Invalid shortcut descriptor '{descriptor}': {reason}")]
    InvalidShortcutFormat { descriptor: String, reason: String },

    /// Two different owners claim the same key
    #[error("Shortcut {key} requested by '{owner}' is already bound by '{existing_owner}'")]
    ShortcutCollision {
        key: ShortcutKey,
        owner: String,
        existing_owner: String,
    },

    /// Attempt to bind one of the quit keys
    #[error("Shortcut {key} requested by '{owner}' is reserved for quitting")]
    ReservedShortcut { key: ShortcutKey, owner: String },

    /// A second contributor tried to register under an owner id already in use
    #[error("Shortcut owner '{owner}' is already registered")]
    DuplicateOwner { owner: String },
}
