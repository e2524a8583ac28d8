use core::ffi::c_char;

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RedirectStatus {
    Ok = 0,
    InvalidArgument = 1,
    EncodingError = 2,
    InvalidPackageRoot = 3,
    KnownFolderUnavailable = 4,
    InvalidPattern = 5,
    ConfigError = 6,
    IoError = 7,
}

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RedirectLogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectStringView {
    pub ptr: *const c_char,
    pub len: usize,
}

impl RedirectStringView {
    pub const fn empty() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectWideStringView {
    pub ptr: *const u16,
    pub len: usize,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectRootMapping {
    pub entries: *const RedirectRootMappingEntry,
    pub len: usize,
}

/// Maps a drive (`"C:"`) onto a host directory. Only consulted by the
/// emulated platform.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectRootMappingEntry {
    pub key: RedirectStringView,
    pub value: RedirectStringView,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectContextConfig {
    pub size: u32,
    pub package_root: RedirectStringView,
    pub final_package_root: RedirectStringView,
    pub package_family_name: RedirectStringView,
    pub config_json: RedirectStringView,
    pub root_mapping: RedirectRootMapping,
    pub reserved: [u64; 4],
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectDecisionOut {
    pub size: u32,
    pub should_redirect: bool,
    pub read_only: bool,
    pub redirect_path: RedirectStringView,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectNormalizedPathOut {
    pub full_path: RedirectStringView,
    pub has_drive_absolute: bool,
    pub drive_absolute_offset: usize,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct RedirectLogRecord {
    pub level: RedirectLogLevel,
    pub target: RedirectStringView,
    pub message: RedirectStringView,
    pub file: RedirectStringView,
    pub line: u32,
}

pub const REDIRECT_FLAG_CHECK_FILE_PRESENCE: u32 = 1 << 0;
pub const REDIRECT_FLAG_COPY_FILE: u32 = 1 << 1;
pub const REDIRECT_FLAG_ENSURE_DIRECTORY_STRUCTURE: u32 = 1 << 2;
