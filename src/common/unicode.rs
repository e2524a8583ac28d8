// Case handling follows the per-character simple lowercase mapping that the
// Win32 `towlower` family applies: a character whose lowercase expansion is
// more than one code point is left untouched.

use super::dos_path::is_path_separator;

pub fn simple_lowercase_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(mapped), None) => mapped,
        _ => ch,
    }
}

pub fn simple_lowercase(input: &str) -> String {
    input.chars().map(simple_lowercase_char).collect()
}

/// Comparison key for a single path character: case-folded, with both
/// separators collapsed to `\`.
fn path_key(ch: char) -> char {
    if is_path_separator(ch) {
        '\\'
    } else {
        simple_lowercase_char(ch)
    }
}

/// If `base` is a case- and separator-insensitive prefix of `path`, returns the
/// remainder of `path` after it. No boundary check is performed here.
pub fn strip_path_prefix<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let mut path_chars = path.char_indices();
    for expected in base.chars() {
        let (_, actual) = path_chars.next()?;
        if path_key(actual) != path_key(expected) {
            return None;
        }
    }
    match path_chars.next() {
        Some((idx, _)) => Some(&path[idx..]),
        None => Some(""),
    }
}

/// Like [`strip_path_prefix`], but only succeeds when `base` ends at a
/// component boundary of `path`. The separator itself is consumed, so
/// `C:\foo\bar` against `c:\foo` yields `bar`, and `C:\foobar` is rejected.
pub fn strip_path_component_prefix<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    let rest = strip_path_prefix(path, base)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(ch) if is_path_separator(ch) => Some(&rest[ch.len_utf8()..]),
        Some(_) => None,
    }
}

pub fn path_starts_with(path: &str, base: &str) -> bool {
    strip_path_prefix(path, base).is_some()
}

pub fn path_eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count() && path_starts_with(a, b)
}

/// Byte offset of the first case-insensitive occurrence of `needle`.
pub fn find_path_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|&idx| path_starts_with(&haystack[idx..], needle))
}
