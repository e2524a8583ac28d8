//! Turns arbitrary path spellings into a canonical absolute form.

use std::borrow::Cow;

use log::{error, trace};

use crate::common::dos_path::{path_type, DosPathType, DEVICE_PREFIX_LEN};
use crate::platform::Platform;

/// A canonical absolute path plus the offset at which its drive-absolute
/// portion (`C:\...`) starts, if it has one.
///
/// Paths without a drive-absolute view are never matched against rules.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NormalizedPath {
    full_path: String,
    drive_absolute_start: Option<usize>,
}

impl NormalizedPath {
    /// A path whose whole text is drive-absolute.
    pub(crate) fn drive_absolute(full_path: String) -> Self {
        Self {
            full_path,
            drive_absolute_start: Some(0),
        }
    }

    fn opaque(full_path: String) -> Self {
        Self {
            full_path,
            drive_absolute_start: None,
        }
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn drive_absolute_path(&self) -> Option<&str> {
        self.drive_absolute_start
            .and_then(|start| self.full_path.get(start..))
    }

    pub fn drive_absolute_offset(&self) -> Option<usize> {
        self.drive_absolute_start
    }

    /// True when nothing could be classified.
    pub fn is_unset(&self) -> bool {
        self.full_path.is_empty() && self.drive_absolute_start.is_none()
    }
}

/// `::{GUID}` shell item references are not file-system paths.
pub fn is_colon_colon_guid(path: &str) -> bool {
    path.chars().count() > 39 && path.starts_with("::{")
}

pub fn is_blob_uri(path: &str) -> bool {
    path.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("blob:"))
}

/// Percent-decodes `%xx` escapes; malformed escapes are kept verbatim.
pub fn url_decode(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }
    let bytes = urlencoding::decode_binary(path.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Removes exactly one leading `file:\` / `file:/` (either case).
pub fn strip_file_colon_slash(path: &str) -> &str {
    for prefix in ["file:\\", "file:/", "FILE:\\", "FILE:/"] {
        if let Some(rest) = path.strip_prefix(prefix) {
            return rest;
        }
    }
    path
}

pub fn normalize_path(platform: &dyn Platform, path: &str) -> NormalizedPath {
    if path.is_empty() {
        return normalize_classified(platform, ".");
    }
    if is_colon_colon_guid(path) {
        trace!("normalize: ::{{GUID}} path passed through: {path}");
        return NormalizedPath::opaque(path.to_string());
    }
    if is_blob_uri(path) {
        trace!("normalize: blob: path passed through: {path}");
        return NormalizedPath::opaque(path.to_string());
    }
    let decoded = url_decode(path);
    let stripped = strip_file_colon_slash(&decoded);
    normalize_classified(platform, stripped)
}

pub fn normalize_path_wide(platform: &dyn Platform, path: &[u16]) -> NormalizedPath {
    normalize_path(platform, &String::from_utf16_lossy(path))
}

fn normalize_classified(platform: &dyn Platform, path: &str) -> NormalizedPath {
    let full_path = match path_type(path) {
        DosPathType::Unknown => return NormalizedPath::default(),
        // Direct escapes into the object manager are not reinterpreted.
        DosPathType::RootLocalDevice => path.to_string(),
        _ => match platform.full_path(path) {
            Some(full) => full,
            None => return NormalizedPath::default(),
        },
    };

    match path_type(&full_path) {
        DosPathType::DriveAbsolute => NormalizedPath::drive_absolute(full_path),
        DosPathType::LocalDevice | DosPathType::RootLocalDevice => {
            let candidate = full_path.get(DEVICE_PREFIX_LEN..).unwrap_or("");
            let start = (path_type(candidate) == DosPathType::DriveAbsolute).then_some(DEVICE_PREFIX_LEN);
            NormalizedPath {
                full_path,
                drive_absolute_start: start,
            }
        }
        // `\\localhost\C$\foo` aliases `C:\foo`, but UNC paths are never
        // treated as redirectable.
        DosPathType::UncAbsolute => NormalizedPath::opaque(full_path),
        other => {
            error!("normalize: {path} resolved to unexpected {other:?} path {full_path}");
            debug_assert!(false, "full path resolution produced a {other:?} path");
            NormalizedPath::default()
        }
    }
}
