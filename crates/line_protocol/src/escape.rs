//! Escaping rules per line element
//!
//! A backslash is written before every reserved character (and before a literal backslash).

/// Reserved characters in measurement names
pub(crate) const MEASUREMENT: &[char] = &[',', ' ', '\\'];

/// Reserved characters in tag keys, tag values and field keys
pub(crate) const KEY: &[char] = &[',', '=', ' ', '\\'];

/// Reserved characters inside quoted string field values
pub(crate) const STRING_FIELD: &[char] = &['"', '\\'];

pub(crate) fn push_escaped(out: &mut String, text: &str, reserved: &[char]) {
    for c in text.chars() {
        if reserved.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

pub(crate) fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}
