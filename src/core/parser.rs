//! src/core/parser.rs
//!
//! Shortcut descriptor codec
//!
//! Turns human-readable shortcut descriptors into canonical `ShortcutKey`s.
//!
//! # Format
//! `[<modifiers>-]...<key>` where:
//! - `<modifiers>` is a concatenation of two-letter tokens (case-insensitive):
//!   `ls`, `rs` (shift), `lc`, `rc` (ctrl), `la`, `ra` (alt), `lw`/`lm` (meta)
//! - groups of tokens may be split by extra dashes: `lc-ls-m` == `lcls-m`
//! - `<key>` is exactly one character; its code is the character code
//!
//! Unknown two-letter tokens are ignored so that descriptors written for
//! newer modifier names still load. A group with an odd number of letters
//! cannot be split into tokens and is rejected.
//!
//! Raw key codes (arrow keys and other non-printables) bypass the parser
//! entirely and are taken to carry no modifiers.

use nom::{
    character::complete::{alpha0, anychar, char},
    combinator::eof,
    multi::many_till,
    sequence::terminated,
    IResult, Parser,
};

use crate::core::error::ShortcutError;
use crate::core::types::{Modifier, ShortcutKey};

/// Input accepted by the codec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutInput<'a> {
    /// Human-readable descriptor such as `"lc-m"` or `"z"`
    Descriptor(&'a str),
    /// Platform key code, no modifiers
    KeyCode(u32),
}

impl<'a> From<&'a str> for ShortcutInput<'a> {
    fn from(descriptor: &'a str) -> Self {
        ShortcutInput::Descriptor(descriptor)
    }
}

impl From<u32> for ShortcutInput<'_> {
    fn from(code: u32) -> Self {
        ShortcutInput::KeyCode(code)
    }
}

/// Encodes a descriptor or raw key code into a canonical shortcut
///
/// # Example
/// ```ignore
/// let key = encode_shortcut("lc-m")?;
/// assert_eq!(key, ShortcutKey::new(0x040, 'm' as u32));
///
/// let up = encode_shortcut(keys::UP)?;
/// assert_eq!(up.modifier_mask(), 0);
/// ```
pub fn encode_shortcut<'a>(input: impl Into<ShortcutInput<'a>>) -> Result<ShortcutKey, ShortcutError> {
    match input.into() {
        ShortcutInput::KeyCode(code) => Ok(ShortcutKey::bare(code)),
        ShortcutInput::Descriptor(descriptor) => parse_shortcut(descriptor),
    }
}

/// Parses a textual descriptor
pub fn parse_shortcut(descriptor: &str) -> Result<ShortcutKey, ShortcutError> {
    let invalid = |reason: String| ShortcutError::InvalidShortcutFormat {
        descriptor: descriptor.to_string(),
        reason,
    };

    let lowered = descriptor.to_lowercase();
    let (groups, key) = match parse_descriptor(&lowered) {
        Ok((_, parsed)) => parsed,
        Err(_) => {
            return Err(invalid(
                "expected modifier tokens followed by a single key symbol".to_string(),
            ))
        }
    };

    let mut mask = 0;
    for group in groups {
        if group.len() % 2 != 0 {
            return Err(invalid(format!(
                "modifier group '{}' is not a sequence of two-letter tokens",
                group
            )));
        }

        // alpha0 only matches ASCII letters, so byte slicing is safe here
        for start in (0..group.len()).step_by(2) {
            let token = &group[start..start + 2];
            match modifier_from_token(token) {
                Some(modifier) => mask |= modifier.bit(),
                None => tracing::debug!(token, descriptor, "ignoring unknown modifier token"),
            }
        }
    }

    Ok(ShortcutKey::new(mask, key as u32))
}

/// Maps a lowercase two-letter token to its modifier
pub fn modifier_from_token(token: &str) -> Option<Modifier> {
    match token {
        "ls" => Some(Modifier::LeftShift),
        "rs" => Some(Modifier::RightShift),
        "lc" => Some(Modifier::LeftCtrl),
        "rc" => Some(Modifier::RightCtrl),
        "la" => Some(Modifier::LeftAlt),
        "ra" => Some(Modifier::RightAlt),
        "lw" | "lm" => Some(Modifier::LeftMeta),
        _ => None,
    }
}

/// Splits a lowercase descriptor into modifier groups and the key symbol
///
/// Each modifier group is a possibly empty run of letters terminated by a
/// dash. The key is the single character left at the end of the input, so
/// `"-m"` is a bare `m` and `"lc--"` binds the dash itself.
pub fn parse_descriptor(input: &str) -> IResult<&str, (Vec<&str>, char)> {
    let (input, (groups, key)) =
        many_till(terminated(alpha0, char('-')), terminated(anychar, eof)).parse(input)?;

    Ok((input, (groups, key)))
}
