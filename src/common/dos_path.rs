//! DOS/Win32 path classification and canonicalization.
//!
//! `full_path` mirrors what `GetFullPathNameW` does to a path string. It is
//! used directly by the emulated platform and by tests; the native platform
//! defers to the real API.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DosPathType {
    Unknown,
    /// `\\server\share\...`
    UncAbsolute,
    /// `C:\...`
    DriveAbsolute,
    /// `C:foo`
    DriveRelative,
    /// `\foo`
    Rooted,
    /// `foo`
    Relative,
    /// `\\.\...`
    LocalDevice,
    /// `\\?\...` or `\??\...`
    RootLocalDevice,
}

/// Length of the `\\.\` / `\\?\` / `\??\` prefixes.
pub const DEVICE_PREFIX_LEN: usize = 4;

pub const LONG_PATH_PREFIX: &str = "\\\\?\\";

pub fn is_path_separator(ch: char) -> bool {
    ch == '\\' || ch == '/'
}

pub fn path_type(path: &str) -> DosPathType {
    let mut chars = path.chars();
    let c0 = chars.next();
    let c1 = chars.next();
    let c2 = chars.next();
    let c3 = chars.next();
    let sep = |c: Option<char>| c.is_some_and(is_path_separator);

    match c0 {
        None => DosPathType::Unknown,
        Some(first) if is_path_separator(first) => {
            if sep(c1) {
                match (c2, sep(c3)) {
                    (Some('.'), true) => DosPathType::LocalDevice,
                    (Some('?'), true) => DosPathType::RootLocalDevice,
                    _ => DosPathType::UncAbsolute,
                }
            } else if c1 == Some('?') && c2 == Some('?') && sep(c3) {
                DosPathType::RootLocalDevice
            } else {
                DosPathType::Rooted
            }
        }
        Some(first) if first.is_ascii_alphabetic() && c1 == Some(':') => {
            if sep(c2) {
                DosPathType::DriveAbsolute
            } else {
                DosPathType::DriveRelative
            }
        }
        Some(_) => DosPathType::Relative,
    }
}

pub fn is_drive_absolute(path: &str) -> bool {
    path_type(path) == DosPathType::DriveAbsolute
}

pub fn remove_trailing_path_separators(path: &str) -> &str {
    path.trim_end_matches(is_path_separator)
}

/// Appends `relative` to `base` with exactly one separator between them. An
/// empty `relative` yields `base` unchanged.
pub fn join(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches(is_path_separator);
    if relative.is_empty() {
        return base.to_string();
    }
    let mut out = String::with_capacity(base.len() + relative.len() + 1);
    out.push_str(remove_trailing_path_separators(base));
    out.push('\\');
    out.push_str(relative);
    out
}

/// Resolves `path` to a fully qualified path, consulting `current_dir` for
/// anything that is not already absolute. Returns `None` when the path (or
/// the current directory it depends on) cannot be qualified.
pub fn full_path(path: &str, current_dir: &str) -> Option<String> {
    match path_type(path) {
        DosPathType::Unknown => None,
        DosPathType::RootLocalDevice => Some(path.to_string()),
        DosPathType::LocalDevice => {
            let (device, tail) = split_first_component(&path[DEVICE_PREFIX_LEN..]);
            if device.is_empty() {
                return None;
            }
            Some(canonicalize(&format!("\\\\.\\{device}"), tail))
        }
        DosPathType::UncAbsolute => {
            let root = unc_root(path)?;
            let tail = &path[root.len().min(path.len())..];
            Some(canonicalize(&root, tail))
        }
        DosPathType::DriveAbsolute => Some(canonicalize(&path[..2], &path[2..])),
        DosPathType::DriveRelative => {
            let drive = &path[..2];
            let rest = &path[2..];
            let same_drive = is_drive_absolute(current_dir) && current_dir[..2].eq_ignore_ascii_case(drive);
            if same_drive {
                if rest.is_empty() {
                    return full_path(current_dir, current_dir);
                }
                full_path(&format!("{current_dir}\\{rest}"), current_dir)
            } else {
                full_path(&format!("{drive}\\{rest}"), current_dir)
            }
        }
        DosPathType::Rooted => {
            let root = current_root(current_dir)?;
            full_path(&format!("{root}{path}"), current_dir)
        }
        DosPathType::Relative => {
            if !matches!(
                path_type(current_dir),
                DosPathType::DriveAbsolute | DosPathType::UncAbsolute
            ) {
                return None;
            }
            full_path(&format!("{current_dir}\\{path}"), current_dir)
        }
    }
}

fn split_first_component(input: &str) -> (&str, &str) {
    match input.find(is_path_separator) {
        Some(idx) => (&input[..idx], &input[idx..]),
        None => (input, ""),
    }
}

/// `\\server\share` as spelled in `path`, without a trailing separator.
fn unc_root(path: &str) -> Option<String> {
    let rest = path.get(2..)?;
    let (server, tail) = split_first_component(rest);
    if server.is_empty() {
        return None;
    }
    let (share, _) = split_first_component(tail.trim_start_matches(is_path_separator));
    if share.is_empty() {
        return Some(format!("\\\\{server}"));
    }
    // Keep the original spelling length so the caller can slice after it.
    let share_end = 2 + server.len() + (tail.len() - tail.trim_start_matches(is_path_separator).len()) + share.len();
    Some(path[..share_end].replace('/', "\\"))
}

fn current_root(current_dir: &str) -> Option<String> {
    match path_type(current_dir) {
        DosPathType::DriveAbsolute => Some(current_dir[..2].to_string()),
        DosPathType::UncAbsolute => unc_root(current_dir),
        _ => None,
    }
}

fn canonicalize(root: &str, tail: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in tail.split(is_path_separator) {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(trim_single_trailing_period(part)),
        }
    }

    let trailing_separator = tail.ends_with(is_path_separator);
    if !trailing_separator {
        if let Some(last) = segments.pop() {
            let trimmed = last.trim_end_matches(&['.', ' '][..]);
            if !trimmed.is_empty() {
                segments.push(trimmed);
            }
        }
    }

    let mut out = String::with_capacity(root.len() + tail.len() + 1);
    out.push_str(root);
    out.push('\\');
    out.push_str(&segments.join("\\"));
    if trailing_separator && !segments.is_empty() {
        out.push('\\');
    }
    out
}

/// `foo.` becomes `foo`; runs made only of periods are real names and stay.
fn trim_single_trailing_period(segment: &str) -> &str {
    if segment.ends_with('.') && !segment.chars().all(|c| c == '.') {
        &segment[..segment.len() - 1]
    } else {
        segment
    }
}
