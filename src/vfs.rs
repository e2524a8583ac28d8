//! Translation between real system-folder paths and their package VFS form.
//!
//! Both directions are total: a path that matches no mapping comes back
//! unchanged.

use log::trace;

use crate::common::dos_path::{is_path_separator, join};
use crate::common::unicode::{strip_path_component_prefix, strip_path_prefix};
use crate::context::PackageRoots;
use crate::known_folders::VfsFolderMapping;
use crate::normalize::NormalizedPath;

/// `<package>\VFS\SystemX64\foo.txt` becomes `C:\Windows\System32\foo.txt`.
pub fn devirtualize_path(
    path: &NormalizedPath,
    roots: &PackageRoots,
    mappings: &[VfsFolderMapping],
) -> NormalizedPath {
    let Some(drive_absolute) = path.drive_absolute_path() else {
        return path.clone();
    };
    let Some(rest) = strip_path_prefix(drive_absolute, &roots.package_vfs_root) else {
        return path.clone();
    };
    // Anything other than a separator here is a sibling such as `VFSx`.
    let Some(package_relative) = rest.strip_prefix(is_path_separator) else {
        return path.clone();
    };

    for mapping in mappings {
        // `AppVSystem32Catroot` must not capture `AppVSystem32Catroot2\...`.
        let Some(vfs_relative) =
            strip_path_component_prefix(package_relative, &mapping.package_vfs_relative_path)
        else {
            continue;
        };
        let devirtualized = join(&mapping.path, vfs_relative);
        trace!("devirtualize: {drive_absolute} -> {devirtualized}");
        return NormalizedPath::drive_absolute(devirtualized);
    }
    path.clone()
}

/// `C:\Windows\System32\foo.txt` becomes `<package>\VFS\System\foo.txt`.
///
/// Paths already inside the package are returned unchanged. Mappings are
/// tried last-declared first so narrow folders win over their parents.
pub fn virtualize_path(
    path: &NormalizedPath,
    roots: &PackageRoots,
    mappings: &[VfsFolderMapping],
) -> NormalizedPath {
    let Some(drive_absolute) = path.drive_absolute_path() else {
        return path.clone();
    };
    if strip_path_component_prefix(drive_absolute, &roots.package_root).is_some() {
        trace!("virtualize: {drive_absolute} is inside the package");
        return path.clone();
    }

    for mapping in mappings.iter().rev() {
        let Some(vfs_relative) = strip_path_component_prefix(drive_absolute, &mapping.path) else {
            continue;
        };
        let vfs_folder = join(&roots.package_vfs_root, &mapping.package_vfs_relative_path);
        let virtualized = join(&vfs_folder, vfs_relative);
        trace!(
            "virtualize: {drive_absolute} matched {} -> {virtualized}",
            mapping.path
        );
        return NormalizedPath::drive_absolute(virtualized);
    }
    trace!("virtualize: no mapping for {drive_absolute}");
    path.clone()
}
