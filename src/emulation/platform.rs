use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{trace, warn};
use uuid::Uuid;

use crate::common::dos_path;
use crate::emulation::parser::{self, component_key, ParsedPath};
use crate::error::{map_io_error, FsError};
use crate::known_folders::KnownFolder;
use crate::platform::{FileAttributes, Platform};

const DEFAULT_CURRENT_DIRECTORY: &str = "C:\\";
const DEFAULT_USER_PROFILE: &str = "C:\\Users\\user";

/// A [`Platform`] that serves Win32 paths out of host directories.
///
/// Each drive letter is mapped onto a host directory; components below it
/// are matched case-insensitively against what is on disk, so `C:\WINDOWS`
/// and `C:\Windows` land on the same entry. Known folders follow a stock
/// 64-bit Windows 10 layout unless overridden.
#[derive(Debug)]
pub struct MappedPlatform {
    drives: HashMap<char, PathBuf>,
    current_directory: RwLock<String>,
    known_folders: HashMap<Uuid, String>,
}

impl Default for MappedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MappedPlatform {
    pub fn new() -> Self {
        let known_folders = default_known_folders()
            .into_iter()
            .filter(|(folder, _)| folder.available_on_this_arch())
            .map(|(folder, path)| (folder.id(), path))
            .collect();
        Self {
            drives: HashMap::new(),
            current_directory: RwLock::new(DEFAULT_CURRENT_DIRECTORY.to_string()),
            known_folders,
        }
    }

    /// Serves `drive` (`"C:"`, `"c:\"`) from the host directory `root`.
    pub fn with_drive(mut self, drive: &str, root: impl Into<PathBuf>) -> Result<Self, FsError> {
        let letter = parser::parse_root_mapping_key(drive)?;
        self.drives.insert(letter, root.into());
        Ok(self)
    }

    pub fn with_known_folder(mut self, folder: KnownFolder, path: impl Into<String>) -> Self {
        self.known_folders.insert(folder.id(), path.into());
        self
    }

    pub fn without_known_folder(mut self, folder: KnownFolder) -> Self {
        self.known_folders.remove(&folder.id());
        self
    }

    pub fn set_current_directory(&self, path: &str) {
        let mut current = self
            .current_directory
            .write()
            .expect("current_directory lock poisoned");
        *current = path.to_string();
    }

    /// The host location `path` maps to. Components that do not exist yet
    /// are appended verbatim.
    pub fn host_path(&self, path: &str) -> Result<PathBuf, FsError> {
        let ParsedPath { drive, components } = parser::parse_win32_path(path)?;
        let mut current = self.drives.get(&drive).cloned().ok_or(FsError::NotFound)?;

        let mut components = components.into_iter();
        for component in components.by_ref() {
            match select_component(&current, &component)? {
                Some(actual) => current.push(actual),
                None => {
                    current.push(component);
                    break;
                }
            }
        }
        current.extend(components);
        trace!("host_path: {path} -> {}", current.display());
        Ok(current)
    }
}

/// Finds the on-disk spelling of `component` inside `dir`.
fn select_component(dir: &Path, component: &str) -> Result<Option<String>, FsError> {
    if fs::symlink_metadata(dir.join(component)).is_ok() {
        return Ok(Some(component.to_string()));
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(map_io_error(&err)),
    };
    let key = component_key(component);
    let mut found: Option<String> = None;
    for entry in entries {
        let entry = entry.map_err(|err| map_io_error(&err))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if component_key(&name) != key {
            continue;
        }
        if let Some(previous) = &found {
            warn!(
                "entries `{previous}` and `{name}` in {} differ only by case",
                dir.display()
            );
            return Err(FsError::InvalidPath);
        }
        found = Some(name);
    }
    Ok(found)
}

fn default_known_folders() -> Vec<(KnownFolder, String)> {
    let profile = DEFAULT_USER_PROFILE;
    vec![
        (KnownFolder::Windows, "C:\\Windows".to_string()),
        (KnownFolder::System, "C:\\Windows\\System32".to_string()),
        (KnownFolder::SystemX86, "C:\\Windows\\SysWOW64".to_string()),
        (KnownFolder::ProgramFilesX86, "C:\\Program Files (x86)".to_string()),
        (
            KnownFolder::ProgramFilesCommonX86,
            "C:\\Program Files (x86)\\Common Files".to_string(),
        ),
        (KnownFolder::ProgramFilesX64, "C:\\Program Files".to_string()),
        (
            KnownFolder::ProgramFilesCommonX64,
            "C:\\Program Files\\Common Files".to_string(),
        ),
        (KnownFolder::ProgramData, "C:\\ProgramData".to_string()),
        (KnownFolder::LocalAppData, format!("{profile}\\AppData\\Local")),
        (KnownFolder::RoamingAppData, format!("{profile}\\AppData\\Roaming")),
        (KnownFolder::LocalAppDataLow, format!("{profile}\\AppData\\LocalLow")),
        (KnownFolder::Fonts, "C:\\Windows\\Fonts".to_string()),
        (KnownFolder::PublicDesktop, "C:\\Users\\Public\\Desktop".to_string()),
        (
            KnownFolder::CommonPrograms,
            "C:\\ProgramData\\Microsoft\\Windows\\Start Menu\\Programs".to_string(),
        ),
    ]
}

impl Platform for MappedPlatform {
    fn full_path(&self, path: &str) -> Option<String> {
        let current = self
            .current_directory
            .read()
            .expect("current_directory lock poisoned");
        dos_path::full_path(path, &current)
    }

    fn known_folder(&self, id: &Uuid) -> Option<String> {
        self.known_folders.get(id).cloned()
    }

    fn path_exists(&self, path: &str) -> bool {
        self.host_path(path)
            .map(|host| fs::symlink_metadata(host).is_ok())
            .unwrap_or(false)
    }

    fn file_attributes(&self, path: &str) -> Result<FileAttributes, FsError> {
        let host = self.host_path(path)?;
        let meta = fs::symlink_metadata(&host).map_err(|err| map_io_error(&err))?;
        let mut attributes = if meta.is_dir() {
            FileAttributes::DIRECTORY
        } else {
            FileAttributes::ARCHIVE
        };
        if meta.file_type().is_symlink() {
            attributes |= FileAttributes::REPARSE_POINT;
        }
        if meta.permissions().readonly() {
            attributes |= FileAttributes::READONLY;
        }
        Ok(attributes)
    }

    fn copy_file(&self, from: &str, to: &str) -> Result<(), FsError> {
        let source_path = self.host_path(from)?;
        let target_path = self.host_path(to)?;
        let mut source = fs::File::open(&source_path).map_err(|err| map_io_error(&err))?;
        let mut target = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target_path)
            .map_err(|err| map_io_error(&err))?;
        if let Err(err) = io::copy(&mut source, &mut target) {
            drop(target);
            let _ = fs::remove_file(&target_path);
            return Err(map_io_error(&err));
        }
        trace!(
            "copy_file: {} -> {}",
            source_path.display(),
            target_path.display()
        );
        Ok(())
    }

    fn create_directory_from_template(&self, template: &str, path: &str) -> Result<(), FsError> {
        let template_path = self.host_path(template)?;
        let meta = fs::metadata(&template_path).map_err(|err| map_io_error(&err))?;
        if !meta.is_dir() {
            return Err(FsError::InvalidPath);
        }
        let target_path = self.host_path(path)?;
        if fs::symlink_metadata(&target_path).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        fs::create_dir_all(&target_path).map_err(|err| map_io_error(&err))
    }

    fn create_directory(&self, path: &str) -> Result<(), FsError> {
        let host = self.host_path(path)?;
        fs::create_dir(host).map_err(|err| map_io_error(&err))
    }

    fn create_directory_all(&self, path: &str) -> Result<(), FsError> {
        let host = self.host_path(path)?;
        fs::create_dir_all(host).map_err(|err| map_io_error(&err))
    }
}
