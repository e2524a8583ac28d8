use log::{debug, info, warn};

use crate::common::dos_path::{
    is_drive_absolute, join, path_type, remove_trailing_path_separators, DosPathType,
    DEVICE_PREFIX_LEN,
};
use crate::common::unicode::{simple_lowercase, strip_path_component_prefix};
use crate::config::FixupConfig;
use crate::error::RedirectError;
use crate::known_folders::{build_vfs_folder_mappings, KnownFolder, VfsFolderMapping};
use crate::normalize::{normalize_path, normalize_path_wide, NormalizedPath};
use crate::platform::Platform;
use crate::rules::{build_redirection_specs, RedirectionSpec};
use crate::vfs::{devirtualize_path, virtualize_path};

/// What the package runtime reports about the running package.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageIdentity {
    /// Install location, possibly `\\?\`-prefixed.
    pub root: String,
    /// The platform's final location for the package; may differ from
    /// `root`. Empty means "same as `root`".
    pub final_root: String,
    pub family_name: String,
}

/// Root paths computed once at initialization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageRoots {
    /// Drive-absolute, lowercase, no trailing separator.
    pub package_root: String,
    pub package_vfs_root: String,
    pub final_package_root: String,
    /// Default target for paths outside the package.
    pub redirect_root: String,
    /// Default copy-on-write target.
    pub writable_package_root: String,
    pub package_family_name: String,
}

impl PackageRoots {
    fn initialize(platform: &dyn Platform, identity: &PackageIdentity) -> Result<Self, RedirectError> {
        let mut root = identity.root.as_str();
        if matches!(
            path_type(root),
            DosPathType::LocalDevice | DosPathType::RootLocalDevice
        ) {
            root = root.get(DEVICE_PREFIX_LEN..).unwrap_or("");
        }
        if !is_drive_absolute(root) {
            return Err(RedirectError::InvalidPackageRoot(identity.root.clone()));
        }
        let package_root = remove_trailing_path_separators(&simple_lowercase(root)).to_string();
        let package_vfs_root = join(&package_root, "VFS");

        let final_package_root = if identity.final_root.is_empty() {
            remove_trailing_path_separators(&identity.root).to_string()
        } else {
            remove_trailing_path_separators(&identity.final_root).to_string()
        };

        let local_app_data = platform
            .known_folder(&KnownFolder::LocalAppData.id())
            .ok_or(RedirectError::KnownFolderUnavailable(KnownFolder::LocalAppData.name()))?;
        let package_local_cache = join(
            &join(&join(&local_app_data, "Packages"), &identity.family_name),
            "LocalCache\\Local",
        );
        let redirect_root = join(&package_local_cache, "VFS");
        let writable_package_root = join(&package_local_cache, "Microsoft\\WritablePackageRoot");

        for dir in [&redirect_root, &writable_package_root] {
            if let Err(err) = platform.create_directory_all(dir) {
                warn!("could not create {dir}: {err}");
            }
        }

        Ok(Self {
            package_root,
            package_vfs_root,
            final_package_root,
            redirect_root,
            writable_package_root,
            package_family_name: identity.family_name.clone(),
        })
    }

    /// `c:` for a package installed on drive C.
    pub fn package_drive(&self) -> &str {
        &self.package_root[..2]
    }
}

/// Everything a redirection query reads. Built once; immutable afterwards,
/// so a shared reference can be used from any number of threads.
pub struct RedirectionContext {
    platform: Box<dyn Platform>,
    roots: PackageRoots,
    mappings: Vec<VfsFolderMapping>,
    specs: Vec<RedirectionSpec>,
}

impl RedirectionContext {
    pub fn new(
        platform: impl Platform + 'static,
        identity: &PackageIdentity,
        config: &FixupConfig,
    ) -> Result<Self, RedirectError> {
        let platform: Box<dyn Platform> = Box::new(platform);
        let roots = PackageRoots::initialize(platform.as_ref(), identity)?;
        let mappings = build_vfs_folder_mappings(platform.as_ref());
        let specs = match &config.redirected_paths {
            Some(paths) => build_redirection_specs(paths, platform.as_ref(), &roots, &mappings)?,
            None => Vec::new(),
        };
        info!(
            "redirection context ready: package={} writable={} specs={}",
            roots.package_root,
            roots.writable_package_root,
            specs.len()
        );
        Ok(Self {
            platform,
            roots,
            mappings,
            specs,
        })
    }

    pub fn from_json(
        platform: impl Platform + 'static,
        identity: &PackageIdentity,
        config_json: &str,
    ) -> Result<Self, RedirectError> {
        let config = FixupConfig::from_json(config_json)?;
        Self::new(platform, identity, &config)
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn roots(&self) -> &PackageRoots {
        &self.roots
    }

    pub fn vfs_folder_mappings(&self) -> &[VfsFolderMapping] {
        &self.mappings
    }

    pub fn redirection_specs(&self) -> &[RedirectionSpec] {
        &self.specs
    }

    pub fn normalize_path(&self, path: &str) -> NormalizedPath {
        normalize_path(self.platform(), path)
    }

    pub fn normalize_path_wide(&self, path: &[u16]) -> NormalizedPath {
        normalize_path_wide(self.platform(), path)
    }

    pub fn devirtualize_path(&self, path: &NormalizedPath) -> NormalizedPath {
        devirtualize_path(path, &self.roots, &self.mappings)
    }

    pub fn virtualize_path(&self, path: &NormalizedPath) -> NormalizedPath {
        virtualize_path(path, &self.roots, &self.mappings)
    }

    fn known_folder_path(&self, folder: KnownFolder) -> Option<String> {
        self.platform.known_folder(&folder.id())
    }

    pub fn is_under_local_app_data(&self, path: &str) -> bool {
        self.known_folder_path(KnownFolder::LocalAppData)
            .is_some_and(|base| strip_path_component_prefix(path, &base).is_some())
    }

    pub fn is_under_roaming_app_data(&self, path: &str) -> bool {
        self.known_folder_path(KnownFolder::RoamingAppData)
            .is_some_and(|base| strip_path_component_prefix(path, &base).is_some())
    }

    /// The package VFS location for a per-user app data path, if `path` lies
    /// under LocalAppData or RoamingAppData.
    pub fn package_vfs_path(&self, path: &str) -> Option<String> {
        let candidates = [
            (KnownFolder::LocalAppData, "Local AppData"),
            (KnownFolder::RoamingAppData, "AppData"),
        ];
        for (folder, vfs_name) in candidates {
            let Some(base) = self.known_folder_path(folder) else {
                continue;
            };
            if let Some(relative) = strip_path_component_prefix(path, &base) {
                let vfs_path = join(&join(&self.roots.package_vfs_root, vfs_name), relative);
                debug!("package_vfs_path: {path} -> {vfs_path}");
                return Some(vfs_path);
            }
        }
        None
    }
}
