//! Utility functions for XML output.
//!
//! This module provides helpers shared by both sinks: XML name checks,
//! text escaping and CDATA splitting.

use std::borrow::Cow;

use crate::error::{MapperError, Result};

/// Checks if a string is a legal XML element or attribute name.
///
/// Follows the `Name` production of XML 1.0 closely enough for generated
/// names: a letter, `_` or `:` first, then letters, digits, `-`, `.`, `_`, `:`
/// or the middle dot.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => {}
        _ => return false,
    }
    chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    c == '_' || c == ':' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_numeric() || matches!(c, '-' | '.' | '\u{B7}')
}

/// Fails with [`MapperError::MalformedOutput`] if `name` is not a legal XML name.
pub fn check_name(kind: &str, name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(MapperError::malformed(format!(
            "invalid {} name '{}'",
            kind, name
        )))
    }
}

/// Escapes text content. Only `<`, `>` and `&` are replaced; quotes are left alone.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(text)
}

/// Splits CDATA content so no part contains the `]]>` terminator.
///
/// Each part is written as its own CDATA section; adjacent sections read back
/// as the unsplit text.
pub fn split_cdata(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        parts.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    parts.push(rest);
    parts
}
