use bitflags::bitflags;
use uuid::Uuid;

use crate::error::FsError;

bitflags! {
    /// The subset of Win32 file attributes the redirection engine inspects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        const READONLY = 0x1;
        const HIDDEN = 0x2;
        const SYSTEM = 0x4;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
        const NORMAL = 0x80;
        const REPARSE_POINT = 0x400;
    }
}

impl FileAttributes {
    pub fn is_directory(self) -> bool {
        self.contains(FileAttributes::DIRECTORY)
    }
}

/// The file-system and shell primitives the engine consumes.
///
/// Every path handed to these methods is a Win32 path string (drive-absolute,
/// or carrying a `\\?\` prefix). Implementations attempt each call once.
pub trait Platform: Send + Sync {
    /// Fully qualifies `path`, consulting the current directory when needed.
    fn full_path(&self, path: &str) -> Option<String>;

    fn known_folder(&self, id: &Uuid) -> Option<String>;

    fn path_exists(&self, path: &str) -> bool;

    fn file_attributes(&self, path: &str) -> Result<FileAttributes, FsError>;

    /// Copies a file, failing with [`FsError::AlreadyExists`] if `to` exists.
    fn copy_file(&self, from: &str, to: &str) -> Result<(), FsError>;

    /// Creates `path` (and any missing parents) taking attributes from
    /// `template`.
    fn create_directory_from_template(&self, template: &str, path: &str) -> Result<(), FsError>;

    /// Creates a single directory. The parent must already exist.
    fn create_directory(&self, path: &str) -> Result<(), FsError>;

    fn create_directory_all(&self, path: &str) -> Result<(), FsError>;
}
