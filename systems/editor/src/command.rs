//! Command line typed into the editor.

use std::path::PathBuf;

/// Command understood by the editor's command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    /// `resize W H`
    Resize {
        /// Requested width; may be zero or negative.
        width: i32,
        /// Requested height; may be zero or negative.
        height: i32,
    },
    /// `save PATH`
    Save(PathBuf),
    /// `load PATH`
    Load(PathBuf),
}

impl EditorCommand {
    /// Parses a submitted line, returning `None` for anything unrecognised.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match split_command_parts(line).as_slice() {
            ["resize", width, height] => Some(Self::Resize {
                width: atoi(width),
                height: atoi(height),
            }),
            ["save", path] => Some(Self::Save(PathBuf::from(path))),
            ["load", path] => Some(Self::Load(PathBuf::from(path))),
            _ => None,
        }
    }
}

/// Splits on single spaces.
///
/// Consecutive spaces yield empty parts; a trailing space does not.
#[must_use]
pub fn split_command_parts(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        match rest.find(' ') {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = &rest[end + 1..];
            }
            None => {
                parts.push(rest);
                rest = "";
            }
        }
    }
    parts
}

/// Parses a leading decimal integer the way C's `atoi` does.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit, and text without digits yields zero. Out-of-range values
/// saturate.
#[must_use]
pub fn atoi(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(digit - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
