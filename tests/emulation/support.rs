use std::fs;
use std::path::{Path, PathBuf};

use psf_redirect::emulation::MappedPlatform;
use psf_redirect::{FixupConfig, PackageIdentity, RedirectionContext};
use tempfile::TempDir;

pub const PACKAGE_ROOT: &str =
    "C:\\Program Files\\WindowsApps\\Contoso.Editor_1.0.0.0_x64__8wekyb3d8bbwe";
pub const FAMILY_NAME: &str = "Contoso.Editor_8wekyb3d8bbwe";
pub const LOCAL_APP_DATA: &str = "C:\\Users\\user\\AppData\\Local";
pub const REDIRECT_ROOT: &str =
    "C:\\Users\\user\\AppData\\Local\\Packages\\Contoso.Editor_8wekyb3d8bbwe\\LocalCache\\Local\\VFS";
pub const WRITABLE_ROOT: &str = "C:\\Users\\user\\AppData\\Local\\Packages\\Contoso.Editor_8wekyb3d8bbwe\\LocalCache\\Local\\Microsoft\\WritablePackageRoot";

/// A scratch `C:` drive holding an installed package.
pub struct Fixture {
    _tmp: TempDir,
    pub c_root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let c_root = tmp.path().join("c");
        let fixture = Self { _tmp: tmp, c_root };
        fs::create_dir_all(&fixture.c_root).expect("create drive root");
        fixture.mkdir(PACKAGE_ROOT);
        fixture.mkdir("C:\\Windows\\System32");
        fixture.mkdir(LOCAL_APP_DATA);
        fixture
    }

    pub fn platform(&self) -> MappedPlatform {
        MappedPlatform::new()
            .with_drive("C:", &self.c_root)
            .expect("map drive C")
    }

    pub fn identity() -> PackageIdentity {
        PackageIdentity {
            root: PACKAGE_ROOT.to_string(),
            final_root: String::new(),
            family_name: FAMILY_NAME.to_string(),
        }
    }

    pub fn context(&self, config: serde_json::Value) -> RedirectionContext {
        self.context_for(&Self::identity(), config)
    }

    pub fn context_for(&self, identity: &PackageIdentity, config: serde_json::Value) -> RedirectionContext {
        let config = FixupConfig::from_value(config).expect("valid config");
        RedirectionContext::new(self.platform(), identity, &config).expect("context")
    }

    /// Host location of a `C:` path.
    pub fn host(&self, path: &str) -> PathBuf {
        self.platform().host_path(path).expect("host path")
    }

    pub fn mkdir(&self, path: &str) -> PathBuf {
        let host = self.host(path);
        fs::create_dir_all(&host).expect("create dir");
        host
    }

    pub fn write(&self, path: &str, contents: &str) -> PathBuf {
        let host = self.host(path);
        if let Some(parent) = host.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&host, contents).expect("write file");
        host
    }

    pub fn exists(&self, path: &str) -> bool {
        Path::new(&self.host(path)).exists()
    }
}

pub fn in_package(relative: &str) -> String {
    format!("{PACKAGE_ROOT}\\{relative}")
}

pub fn long(path: &str) -> String {
    format!("\\\\?\\{path}")
}

pub fn package_relative(rules: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "redirectedPaths": { "packageRelative": rules } })
}
