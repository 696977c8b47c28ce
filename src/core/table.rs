//! Shortcut table with per-owner collision detection
//!
//! The table maps each canonical `ShortcutKey` to exactly one bound action.
//! Several independent contributors (the base viewer and any number of
//! plugins) register into the same table; each registration is checked
//! against keys already claimed by other owners before anything is written.
//!
//! # Performance
//! - Lookup: O(1) average case
//! - Register: O(k) where k = number of keys in the incoming keymap

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::core::error::ShortcutError;
use crate::core::parser::{encode_shortcut, ShortcutInput};
use crate::core::types::ShortcutKey;

/// A zero-argument callable bound to a shortcut.
///
/// Actions capture whatever shared state they mutate. The display loop is
/// single threaded, so `Rc` is enough.
pub type Action = Rc<dyn Fn()>;

/// One entry of a keymap: what the key does and the closure that does it
#[derive(Clone)]
pub struct Binding {
    /// Short human-readable description ("cycle colormap")
    pub description: String,
    pub action: Action,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An ordered set of shortcuts contributed by one owner.
///
/// Binding the same key twice in one keymap replaces the earlier binding.
///
/// # Example
/// ```ignore
/// let keymap = Keymap::new()
///     .bind("lc-s", "take snapshot", move || armed.set(true))?
///     .bind(keys::UP, "pan up", move || steer_up())?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Keymap {
    entries: Vec<(ShortcutKey, Binding)>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `shortcut` and adds a binding for it
    pub fn bind<'a, F>(
        mut self,
        shortcut: impl Into<ShortcutInput<'a>>,
        description: &str,
        action: F,
    ) -> Result<Self, ShortcutError>
    where
        F: Fn() + 'static,
    {
        let key = encode_shortcut(shortcut)?;
        self.insert(key, description, Rc::new(action));
        Ok(self)
    }

    /// Adds a binding for an already-encoded key
    pub fn insert(&mut self, key: ShortcutKey, description: &str, action: Action) {
        let binding = Binding {
            description: description.to_string(),
            action,
        };

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = binding,
            None => self.entries.push((key, binding)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &ShortcutKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table entry: the binding plus the owner that registered it
#[derive(Clone, Debug)]
struct OwnedBinding {
    owner: String,
    binding: Binding,
}

/// Read-only view of one table entry, for listings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingInfo {
    pub key: ShortcutKey,
    pub owner: String,
    pub description: String,
}

/// Maps shortcuts to actions, one owner per key.
///
/// Each viewer constructs its own table; there is no shared global table.
#[derive(Debug, Default)]
pub struct ShortcutTable {
    bindings: HashMap<ShortcutKey, OwnedBinding>,
}

impl ShortcutTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Merges `keymap` into the table on behalf of `owner`.
    ///
    /// All checks run before the table is touched, so a failed
    /// registration leaves it exactly as it was. Keys already owned by
    /// `owner` are overwritten.
    ///
    /// # Errors
    ///
    /// * `ReservedShortcut` - the keymap binds a quit key
    /// * `ShortcutCollision` - a key is already owned by someone else
    pub fn register(&mut self, owner: &str, keymap: Keymap) -> Result<(), ShortcutError> {
        if let Some(key) = keymap.keys().find(|k| k.is_reserved()) {
            return Err(ShortcutError::ReservedShortcut {
                key: *key,
                owner: owner.to_string(),
            });
        }

        if let Some((key, existing_owner)) = self.find_collision(owner, &keymap) {
            return Err(ShortcutError::ShortcutCollision {
                key,
                owner: owner.to_string(),
                existing_owner,
            });
        }

        let count = keymap.len();
        for (key, binding) in keymap.entries {
            self.bindings.insert(
                key,
                OwnedBinding {
                    owner: owner.to_string(),
                    binding,
                },
            );
        }

        tracing::debug!(owner, count, "registered shortcuts");
        Ok(())
    }

    /// First key in `keymap` already claimed by an owner other than `owner`
    fn find_collision(&self, owner: &str, keymap: &Keymap) -> Option<(ShortcutKey, String)> {
        keymap.keys().find_map(|key| {
            self.bindings
                .get(key)
                .filter(|existing| existing.owner != owner)
                .map(|existing| (*key, existing.owner.clone()))
        })
    }

    /// Returns the action bound to `key`, if any
    pub fn lookup(&self, key: &ShortcutKey) -> Option<Action> {
        self.bindings.get(key).map(|b| Rc::clone(&b.binding.action))
    }

    /// Owner of `key`, if bound
    pub fn owner_of(&self, key: &ShortcutKey) -> Option<&str> {
        self.bindings.get(key).map(|b| b.owner.as_str())
    }

    /// All bindings, sorted by owner then key for stable listings
    pub fn bindings(&self) -> Vec<BindingInfo> {
        let mut infos: Vec<BindingInfo> = self
            .bindings
            .iter()
            .map(|(key, b)| BindingInfo {
                key: *key,
                owner: b.owner.clone(),
                description: b.binding.description.clone(),
            })
            .collect();

        infos.sort_by(|a, b| {
            a.owner
                .cmp(&b.owner)
                .then(a.key.modifier_mask().cmp(&b.key.modifier_mask()))
                .then(a.key.key_code().cmp(&b.key.key_code()))
        });
        infos
    }

    /// Total number of bound keys
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
