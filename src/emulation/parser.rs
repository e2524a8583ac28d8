use crate::common::dos_path::{is_path_separator, path_type, DosPathType, DEVICE_PREFIX_LEN};
use crate::common::unicode::simple_lowercase;
use crate::error::FsError;

const MAX_INPUT_PATH_CHARS: usize = 32 * 1024;
const MAX_COMPONENT_CHARS: usize = 255;

/// A fully qualified Win32 path split into its drive and components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    pub drive: char,
    pub components: Vec<String>,
}

/// Case-folding key used to compare directory entries.
pub fn component_key(name: &str) -> String {
    simple_lowercase(name)
}

/// Parses a drive-absolute path, optionally behind a `\\?\` or `\\.\`
/// prefix. `.` and `..` must already have been resolved.
pub fn parse_win32_path(input: &str) -> Result<ParsedPath, FsError> {
    if input.chars().count() > MAX_INPUT_PATH_CHARS {
        return Err(FsError::InvalidPath);
    }
    let path = match path_type(input) {
        DosPathType::LocalDevice | DosPathType::RootLocalDevice => &input[DEVICE_PREFIX_LEN..],
        _ => input,
    };
    let drive = parse_drive(path)?;

    let mut components = Vec::new();
    for part in path[2..].split(is_path_separator) {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FsError::InvalidPath);
        }
        if part.chars().count() > MAX_COMPONENT_CHARS {
            return Err(FsError::InvalidPath);
        }
        components.push(part.to_string());
    }
    Ok(ParsedPath { drive, components })
}

/// Parses a root mapping key such as `C:` or `c:\`.
pub fn parse_root_mapping_key(input: &str) -> Result<char, FsError> {
    let trimmed = input.trim_end_matches(is_path_separator);
    if trimmed.len() != 2 {
        return Err(FsError::InvalidPath);
    }
    parse_drive(trimmed)
}

fn parse_drive(path: &str) -> Result<char, FsError> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.len() > 2 && !is_path_separator(bytes[2] as char) {
            // `C:foo` is drive-relative and never reaches the platform.
            return Err(FsError::InvalidPath);
        }
        return Ok((bytes[0] as char).to_ascii_uppercase());
    }
    Err(FsError::Unsupported)
}
