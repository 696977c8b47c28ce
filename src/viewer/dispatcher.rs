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

//! Key event dispatch
//!
//! Turns raw `(modifier bitmask, key code)` events from the windowing layer
//! into action invocations. Unmapped keys are routine and silently dropped.

use crate::core::{parse_shortcut, BindingInfo, Keymap, ShortcutError, ShortcutKey, ShortcutTable};

/// Owns the shortcut table of one viewer and dispatches events through it
#[derive(Debug, Default)]
pub struct Dispatcher {
    table: ShortcutTable,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            table: ShortcutTable::new(),
        }
    }

    /// Registers `keymap` on behalf of `owner`, see `ShortcutTable::register`
    pub fn register(&mut self, owner: &str, keymap: Keymap) -> Result<(), ShortcutError> {
        self.table.register(owner, keymap)
    }

    /// Handles one raw key event
    ///
    /// The numeric-lock bit is masked off before lookup. The bound action
    /// runs after the table lookup has returned, so actions are free to
    /// inspect the table themselves.
    ///
    /// # Returns
    ///
    /// `true` if an action was invoked, `false` if the key is unmapped
    pub fn handle_key_event(&self, modifiers: u32, key_code: u32) -> bool {
        let key = ShortcutKey::new(modifiers, key_code);

        match self.table.lookup(&key) {
            Some(action) => {
                tracing::debug!(%key, "dispatching shortcut");
                action();
                true
            }
            None => {
                tracing::trace!(%key, "unmapped key");
                false
            }
        }
    }

    /// Dispatches a textual descriptor ("lc-m") as if it were a key event
    ///
    /// # Errors
    ///
    /// Returns `InvalidShortcutFormat` if the descriptor does not parse.
    pub fn handle_descriptor(&self, descriptor: &str) -> Result<bool, ShortcutError> {
        let key = parse_shortcut(descriptor)?;
        Ok(self.handle_key_event(key.modifier_mask(), key.key_code()))
    }

    /// True if any owner has bound `key`
    pub fn is_bound(&self, key: &ShortcutKey) -> bool {
        self.table.lookup(key).is_some()
    }

    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.table.bindings()
    }
}
