//! src/core/types.rs
//!
//! Core type definitions for shortcut handling
//!
//! This module defines the fundamental types shared by the codec, the
//! shortcut table and the dispatcher:
//! - `Modifier`: The recognised keyboard modifier keys and their mask bits
//! - `ShortcutKey`: A canonical (modifier mask, key code) pair
//! - `keys`: Key codes for the non-printable keys the viewer binds
//!
//! The modifier bit layout is owned here and is independent of any input
//! library. Frontends translate their own modifier state into this layout
//! before handing events to the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyboard modifier keys
///
/// Left and right variants are distinct: a shortcut bound to left-Ctrl
/// does not fire on right-Ctrl.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Modifier {
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    /// Meta / Super / Windows key
    LeftMeta,
}

impl Modifier {
    /// All recognised modifiers, in mask-bit order
    pub const ALL: [Modifier; 7] = [
        Modifier::LeftShift,
        Modifier::RightShift,
        Modifier::LeftCtrl,
        Modifier::RightCtrl,
        Modifier::LeftAlt,
        Modifier::RightAlt,
        Modifier::LeftMeta,
    ];

    /// Bit this modifier occupies in a modifier mask
    pub const fn bit(self) -> u32 {
        match self {
            Modifier::LeftShift => 0x001,
            Modifier::RightShift => 0x002,
            Modifier::LeftCtrl => 0x040,
            Modifier::RightCtrl => 0x080,
            Modifier::LeftAlt => 0x100,
            Modifier::RightAlt => 0x200,
            Modifier::LeftMeta => 0x400,
        }
    }

    /// Two-letter descriptor token (see `core::parser`)
    pub const fn token(self) -> &'static str {
        match self {
            Modifier::LeftShift => "ls",
            Modifier::RightShift => "rs",
            Modifier::LeftCtrl => "lc",
            Modifier::RightCtrl => "rc",
            Modifier::LeftAlt => "la",
            Modifier::RightAlt => "ra",
            Modifier::LeftMeta => "lw",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::LeftShift => write!(f, "LShift"),
            Modifier::RightShift => write!(f, "RShift"),
            Modifier::LeftCtrl => write!(f, "LCtrl"),
            Modifier::RightCtrl => write!(f, "RCtrl"),
            Modifier::LeftAlt => write!(f, "LAlt"),
            Modifier::RightAlt => write!(f, "RAlt"),
            Modifier::LeftMeta => write!(f, "LMeta"),
        }
    }
}

/// Numeric-lock bit. Always masked off before a shortcut is formed.
pub const NUMLOCK_BIT: u32 = 0x1000;

/// Key codes for keys that have no printable character
pub mod keys {
    pub const UP: u32 = 0x4000_0052;
    pub const DOWN: u32 = 0x4000_0051;
    pub const LEFT: u32 = 0x4000_0050;
    pub const RIGHT: u32 = 0x4000_004f;
    pub const ESCAPE: u32 = 0x1b;
    /// Lowercase `x`, the viewer's quit key
    pub const QUIT: u32 = 'x' as u32;

    /// Key codes that can never be bound: they always mean "quit"
    pub const RESERVED: [u32; 2] = [ESCAPE, QUIT];
}

/// A canonical keyboard shortcut
///
/// Equality and hashing are structural over both fields. The numeric-lock
/// bit is stripped on construction, so a shortcut formed from a raw event
/// with numlock on compares equal to one parsed from a descriptor.
///
/// # Example
/// ```ignore
/// let key = ShortcutKey::new(Modifier::LeftCtrl.bit() | NUMLOCK_BIT, 'm' as u32);
/// assert_eq!(key.modifier_mask(), Modifier::LeftCtrl.bit());
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ShortcutKey {
    modifier_mask: u32,
    key_code: u32,
}

impl ShortcutKey {
    /// Creates a shortcut, masking off the numeric-lock bit
    pub const fn new(modifier_mask: u32, key_code: u32) -> Self {
        Self {
            modifier_mask: modifier_mask & !NUMLOCK_BIT,
            key_code,
        }
    }

    /// Shortcut for a bare key with no modifiers held
    pub const fn bare(key_code: u32) -> Self {
        Self::new(0, key_code)
    }

    /// Builds a shortcut from a list of modifiers (order and duplicates ignored)
    pub fn with_modifiers(modifiers: &[Modifier], key_code: u32) -> Self {
        let mask = modifiers.iter().fold(0, |acc, m| acc | m.bit());
        Self::new(mask, key_code)
    }

    pub const fn modifier_mask(&self) -> u32 {
        self.modifier_mask
    }

    pub const fn key_code(&self) -> u32 {
        self.key_code
    }

    /// Modifiers present in the mask, in mask-bit order
    pub fn modifiers(&self) -> Vec<Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(|m| self.modifier_mask & m.bit() != 0)
            .collect()
    }

    /// True for the quit/escape keys that may never be bound
    pub fn is_reserved(&self) -> bool {
        keys::RESERVED.contains(&self.key_code)
    }
}

fn key_name(code: u32) -> String {
    match code {
        keys::UP => "Up".to_string(),
        keys::DOWN => "Down".to_string(),
        keys::LEFT => "Left".to_string(),
        keys::RIGHT => "Right".to_string(),
        keys::ESCAPE => "Escape".to_string(),
        _ => match char::from_u32(code) {
            Some(c) if !c.is_control() => c.to_string(),
            _ => format!("{:#x}", code),
        },
    }
}

impl fmt::Display for ShortcutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers().iter().map(|m| m.to_string()).collect();
        parts.push(key_name(self.key_code));
        write!(f, "{}", parts.join("+"))
    }
}
