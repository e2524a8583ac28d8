//! Known-folder identifiers and the VFS folder mapping table.

use log::{debug, warn};
use uuid::Uuid;

use crate::common::dos_path::join;
use crate::platform::Platform;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KnownFolder {
    SystemX86,
    System,
    ProgramFilesX86,
    ProgramFilesCommonX86,
    ProgramFilesX64,
    ProgramFilesCommonX64,
    Windows,
    ProgramData,
    LocalAppData,
    RoamingAppData,
    LocalAppDataLow,
    Fonts,
    PublicDesktop,
    CommonPrograms,
}

impl KnownFolder {
    pub const ALL: [KnownFolder; 14] = [
        KnownFolder::SystemX86,
        KnownFolder::System,
        KnownFolder::ProgramFilesX86,
        KnownFolder::ProgramFilesCommonX86,
        KnownFolder::ProgramFilesX64,
        KnownFolder::ProgramFilesCommonX64,
        KnownFolder::Windows,
        KnownFolder::ProgramData,
        KnownFolder::LocalAppData,
        KnownFolder::RoamingAppData,
        KnownFolder::LocalAppDataLow,
        KnownFolder::Fonts,
        KnownFolder::PublicDesktop,
        KnownFolder::CommonPrograms,
    ];

    /// The shell `FOLDERID_*` value.
    pub const fn id(self) -> Uuid {
        let raw: u128 = match self {
            KnownFolder::SystemX86 => 0xD65231B0_B2F1_4857_A4CE_A8E7C6EA7D27,
            KnownFolder::System => 0x1AC14E77_02E7_4E5D_B744_2EB1AE5198B7,
            KnownFolder::ProgramFilesX86 => 0x7C5A40EF_A0FB_4BFC_874A_C0F2E0B9FA8E,
            KnownFolder::ProgramFilesCommonX86 => 0xDE974D24_D9C6_4D3E_BF91_F4455120B917,
            KnownFolder::ProgramFilesX64 => 0x6D809377_6AF0_444B_8957_A3773F02200E,
            KnownFolder::ProgramFilesCommonX64 => 0x6365D5A7_0F0D_45E5_87F6_0DA56B6A4F7D,
            KnownFolder::Windows => 0xF38BF404_1D43_42F2_9305_67DE0B28FC23,
            KnownFolder::ProgramData => 0x62AB5D82_FDC1_4DC3_A9DD_070D1D495D97,
            KnownFolder::LocalAppData => 0xF1B32785_6FBA_4FCF_9D55_7B8E7F157091,
            KnownFolder::RoamingAppData => 0x3EB685DB_65F9_4CF6_A03A_E3EF65729F3D,
            KnownFolder::LocalAppDataLow => 0xA520A1A4_1780_4FF6_BD18_167343C5AF16,
            KnownFolder::Fonts => 0xFD228CB7_AE11_4AE3_864C_16F3910AB8FE,
            KnownFolder::PublicDesktop => 0xC4AA340D_F20F_4863_AFEF_F87EF2E6BA25,
            KnownFolder::CommonPrograms => 0x0139D44E_6AFE_49F2_8690_3DAFCAE6FFB8,
        };
        Uuid::from_u128(raw)
    }

    pub const fn name(self) -> &'static str {
        match self {
            KnownFolder::SystemX86 => "SystemX86",
            KnownFolder::System => "System",
            KnownFolder::ProgramFilesX86 => "ProgramFilesX86",
            KnownFolder::ProgramFilesCommonX86 => "ProgramFilesCommonX86",
            KnownFolder::ProgramFilesX64 => "ProgramFilesX64",
            KnownFolder::ProgramFilesCommonX64 => "ProgramFilesCommonX64",
            KnownFolder::Windows => "Windows",
            KnownFolder::ProgramData => "ProgramData",
            KnownFolder::LocalAppData => "LocalAppData",
            KnownFolder::RoamingAppData => "RoamingAppData",
            KnownFolder::LocalAppDataLow => "LocalAppDataLow",
            KnownFolder::Fonts => "Fonts",
            KnownFolder::PublicDesktop => "PublicDesktop",
            KnownFolder::CommonPrograms => "CommonPrograms",
        }
    }

    /// Whether the folder exists for a process of this architecture.
    pub const fn available_on_this_arch(self) -> bool {
        match self {
            KnownFolder::ProgramFilesX64 | KnownFolder::ProgramFilesCommonX64 => {
                !cfg!(target_arch = "x86")
            }
            _ => true,
        }
    }
}

/// Resolves a config `id` string: one of the names accepted by the fixup
/// config, or a braced GUID. Returns `None` for unknown names, malformed
/// GUIDs, and folders that do not exist for this architecture.
pub fn known_folder_id_from_str(value: &str) -> Option<Uuid> {
    const CONFIG_NAMES: [KnownFolder; 10] = [
        KnownFolder::SystemX86,
        KnownFolder::System,
        KnownFolder::ProgramFilesX86,
        KnownFolder::ProgramFilesCommonX86,
        KnownFolder::ProgramFilesX64,
        KnownFolder::ProgramFilesCommonX64,
        KnownFolder::Windows,
        KnownFolder::ProgramData,
        KnownFolder::LocalAppData,
        KnownFolder::RoamingAppData,
    ];

    if let Some(folder) = CONFIG_NAMES.iter().find(|folder| folder.name() == value) {
        return folder.available_on_this_arch().then(|| folder.id());
    }
    if value.len() >= 38 && value.starts_with('{') {
        return Uuid::parse_str(value).ok();
    }
    None
}

/// A system folder and the name it is mirrored under below `<package>\VFS`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VfsFolderMapping {
    pub path: String,
    pub package_vfs_relative_path: String,
}

/// Declaration order is broad-to-narrow; virtualization walks it in reverse.
const VFS_FOLDERS: &[(KnownFolder, Option<&str>, &str)] = &[
    (KnownFolder::SystemX86, None, "SystemX86"),
    (KnownFolder::ProgramFilesX86, None, "ProgramFilesX86"),
    (KnownFolder::ProgramFilesCommonX86, None, "ProgramFilesCommonX86"),
    #[cfg(not(target_arch = "x86"))]
    (KnownFolder::System, None, "SystemX64"),
    #[cfg(not(target_arch = "x86"))]
    (KnownFolder::ProgramFilesX64, None, "ProgramFilesX64"),
    #[cfg(not(target_arch = "x86"))]
    (KnownFolder::ProgramFilesCommonX64, None, "ProgramFilesCommonX64"),
    (KnownFolder::Windows, None, "Windows"),
    (KnownFolder::ProgramData, None, "Common AppData"),
    (KnownFolder::System, None, "System"),
    (KnownFolder::System, Some("catroot"), "AppVSystem32Catroot"),
    (KnownFolder::System, Some("catroot2"), "AppVSystem32Catroot2"),
    (KnownFolder::System, Some("drivers\\etc"), "AppVSystem32DriversEtc"),
    (KnownFolder::System, Some("driverstore"), "AppVSystem32Driverstore"),
    (KnownFolder::System, Some("logfiles"), "AppVSystem32Logfiles"),
    (KnownFolder::System, Some("spool"), "AppVSystem32Spool"),
    (KnownFolder::LocalAppData, None, "Local AppData"),
    (KnownFolder::RoamingAppData, None, "AppData"),
    (KnownFolder::Fonts, None, "Fonts"),
    (KnownFolder::PublicDesktop, None, "Common Desktop"),
    (KnownFolder::CommonPrograms, None, "Common Programs"),
    (KnownFolder::LocalAppDataLow, None, "LOCALAPPDATALOW"),
];

pub fn build_vfs_folder_mappings(platform: &dyn Platform) -> Vec<VfsFolderMapping> {
    let mut mappings = Vec::with_capacity(VFS_FOLDERS.len());
    for (folder, subfolder, vfs_name) in VFS_FOLDERS {
        let Some(folder_path) = platform.known_folder(&folder.id()) else {
            warn!("known folder {} unavailable; VFS mapping {vfs_name} skipped", folder.name());
            continue;
        };
        let path = match subfolder {
            Some(sub) => join(&folder_path, sub),
            None => folder_path,
        };
        debug!("VFS mapping {path} <-> {vfs_name}");
        mappings.push(VfsFolderMapping {
            path,
            package_vfs_relative_path: (*vfs_name).to_string(),
        });
    }
    mappings
}
