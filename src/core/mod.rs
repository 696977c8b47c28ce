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

//! src/core/mod.rs
//!
//! Shortcut handling core
//!
//! This module contains the keyboard side of the viewer:
//! - Type definitions for modifiers and canonical shortcuts
//! - The descriptor codec (`"lc-m"` → `ShortcutKey`)
//! - The shortcut table with per-owner collision detection
//!
//! Nothing here knows about frames or rendering, so all of it can be
//! tested without a display or a frame source.

pub mod error;
pub mod parser;
pub mod table;
pub mod types;

pub use error::ShortcutError;
pub use parser::{encode_shortcut, parse_shortcut, ShortcutInput};
pub use table::{Action, Binding, BindingInfo, Keymap, ShortcutTable};
pub use types::*;

#[cfg(test)]
mod tests;
