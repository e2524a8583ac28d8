mod common;
mod config;
mod context;
mod error;
mod ffi;
mod known_folders;
mod logging;
mod normalize;
mod platform;
mod redirect;
mod rules;
mod vfs;

pub mod emulation;

#[cfg(windows)]
pub mod windows_native;

/// The platform the C ABI runs against.
#[cfg(windows)]
pub type NativePlatform = windows_native::Win32Platform;
#[cfg(not(windows))]
pub type NativePlatform = emulation::MappedPlatform;

pub use crate::common::dos_path::{self, DosPathType};
pub use crate::common::types::*;
pub use crate::common::unicode;
pub use crate::config::{FixupConfig, KnownFolderRules, RedirectRule, RedirectedPaths};
pub use crate::context::{PackageIdentity, PackageRoots, RedirectionContext};
pub use crate::error::{FsError, RedirectError};
pub use crate::ffi::*;
pub use crate::known_folders::{KnownFolder, VfsFolderMapping};
pub use crate::logging::RedirectLogCallback;
pub use crate::normalize::{normalize_path, normalize_path_wide, NormalizedPath};
pub use crate::platform::{FileAttributes, Platform};
pub use crate::redirect::{RedirectDecision, RedirectFlags};
pub use crate::rules::RedirectionSpec;
pub use crate::vfs::{devirtualize_path, virtualize_path};
