use std::path::Path;

use log::trace;
use uuid::Uuid;
use windows_sys::core::GUID;

use super::win32;
use crate::common::dos_path::remove_trailing_path_separators;
use crate::error::{map_io_error, FsError};
use crate::platform::{FileAttributes, Platform};

/// The real Win32 file system and shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Platform;

impl Win32Platform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for Win32Platform {
    fn full_path(&self, path: &str) -> Option<String> {
        win32::get_full_path_name(path)
    }

    fn known_folder(&self, id: &Uuid) -> Option<String> {
        let guid = GUID::from_u128(id.as_u128());
        win32::known_folder_path(&guid)
    }

    fn path_exists(&self, path: &str) -> bool {
        win32::get_file_attributes(path).is_ok()
    }

    fn file_attributes(&self, path: &str) -> Result<FileAttributes, FsError> {
        win32::get_file_attributes(path).map(FileAttributes::from_bits_retain)
    }

    fn copy_file(&self, from: &str, to: &str) -> Result<(), FsError> {
        trace!("copy_file: {from} -> {to}");
        win32::copy_file_no_replace(from, to)
    }

    fn create_directory_from_template(&self, template: &str, path: &str) -> Result<(), FsError> {
        let trimmed = remove_trailing_path_separators(path);
        if let Some(parent) = Path::new(trimmed).parent() {
            std::fs::create_dir_all(parent).map_err(|err| map_io_error(&err))?;
        }
        win32::create_directory_from_template(template, trimmed)
    }

    fn create_directory(&self, path: &str) -> Result<(), FsError> {
        win32::create_directory(path)
    }

    fn create_directory_all(&self, path: &str) -> Result<(), FsError> {
        std::fs::create_dir_all(path).map_err(|err| map_io_error(&err))
    }
}
