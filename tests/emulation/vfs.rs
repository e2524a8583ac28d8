use crate::support::*;

fn vfs(relative: &str) -> String {
    format!("{}\\VFS\\{relative}", PACKAGE_ROOT.to_lowercase())
}

#[test]
fn devirtualize_maps_vfs_folders_to_system_folders() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    let cases = [
        (in_package("VFS\\System\\foo.txt"), "C:\\Windows\\System32\\foo.txt"),
        (in_package("VFS\\SystemX64\\foo.txt"), "C:\\Windows\\System32\\foo.txt"),
        (in_package("VFS\\Windows\\app.log"), "C:\\Windows\\app.log"),
        (in_package("VFS\\Common AppData\\Contoso"), "C:\\ProgramData\\Contoso"),
        (
            in_package("VFS\\Local AppData\\MyApp\\settings.ini"),
            "C:\\Users\\user\\AppData\\Local\\MyApp\\settings.ini",
        ),
    ];
    for (input, expected) in cases {
        let devirtualized = ctx.devirtualize_path(&ctx.normalize_path(&input));
        assert_eq!(devirtualized.drive_absolute_path(), Some(expected), "input {input}");
    }
}

#[test]
fn catroot_does_not_capture_catroot2() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    let catroot2 = ctx.devirtualize_path(&ctx.normalize_path(&in_package("VFS\\AppVSystem32Catroot2\\x.cat")));
    assert_eq!(
        catroot2.drive_absolute_path(),
        Some("C:\\Windows\\System32\\catroot2\\x.cat")
    );
    let catroot = ctx.devirtualize_path(&ctx.normalize_path(&in_package("VFS\\AppVSystem32Catroot\\x.cat")));
    assert_eq!(
        catroot.drive_absolute_path(),
        Some("C:\\Windows\\System32\\catroot\\x.cat")
    );

    let virtualized = ctx.virtualize_path(&ctx.normalize_path("C:\\Windows\\System32\\catroot2\\x.cat"));
    assert_eq!(
        virtualized.drive_absolute_path(),
        Some(vfs("AppVSystem32Catroot2\\x.cat").as_str())
    );
}

#[test]
fn devirtualize_ignores_paths_outside_the_vfs_root() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    for input in [
        "C:\\Data\\x.txt".to_string(),
        in_package("VFSx\\System\\foo.txt"),
        in_package("bin\\app.exe"),
        in_package("VFS\\Unmapped\\foo.txt"),
    ] {
        let normalized = ctx.normalize_path(&input);
        assert_eq!(ctx.devirtualize_path(&normalized), normalized, "input {input}");
    }
}

#[test]
fn virtualize_prefers_the_narrowest_mapping() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    let cases = [
        ("C:\\Windows\\System32\\foo.txt", vfs("System\\foo.txt")),
        ("C:\\Windows\\System32\\drivers\\etc\\hosts", vfs("AppVSystem32DriversEtc\\hosts")),
        ("C:\\Windows\\notepad.exe", vfs("Windows\\notepad.exe")),
        ("C:\\Users\\user\\AppData\\LocalLow\\x", vfs("LOCALAPPDATALOW\\x")),
        ("C:\\Users\\user\\AppData\\Local\\x", vfs("Local AppData\\x")),
    ];
    for (input, expected) in cases {
        let virtualized = ctx.virtualize_path(&ctx.normalize_path(input));
        assert_eq!(virtualized.drive_absolute_path(), Some(expected.as_str()), "input {input}");
    }
}

#[test]
fn virtualize_leaves_package_and_unmapped_paths_alone() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    for input in [in_package("data\\a.txt"), "C:\\Data\\a.txt".to_string(), "C:\\WindowsApps\\x".to_string()] {
        let normalized = ctx.normalize_path(&input);
        assert_eq!(ctx.virtualize_path(&normalized), normalized, "input {input}");
    }
}

#[test]
fn virtualize_inverts_devirtualize() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    for real in [
        "C:\\Windows\\System32\\foo.txt",
        "C:\\Windows\\System32\\spool\\drivers\\x.dll",
        "C:\\ProgramData\\Contoso\\settings.xml",
        "C:\\Users\\user\\AppData\\Roaming\\MyApp\\a.ini",
    ] {
        let virtualized = ctx.virtualize_path(&ctx.normalize_path(real));
        let round_trip = ctx.virtualize_path(&ctx.devirtualize_path(&virtualized));
        assert_eq!(round_trip, virtualized, "path {real}");
    }
}

#[test]
fn app_data_helpers() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    assert!(ctx.is_under_local_app_data("C:\\Users\\user\\AppData\\Local\\x"));
    assert!(!ctx.is_under_local_app_data("C:\\Users\\user\\AppData\\LocalLow\\x"));
    assert!(ctx.is_under_roaming_app_data("c:\\users\\user\\appdata\\roaming"));
    assert!(!ctx.is_under_roaming_app_data("C:\\Data"));

    assert_eq!(
        ctx.package_vfs_path("C:\\Users\\user\\AppData\\Roaming\\MyApp\\a.ini").as_deref(),
        Some(vfs("AppData\\MyApp\\a.ini").as_str())
    );
    assert_eq!(ctx.package_vfs_path("C:\\Data\\a.ini"), None);
}

#[cfg(not(target_arch = "x86"))]
#[test]
fn package_root_sibling_is_virtualized() {
    let fixture = Fixture::new();
    let ctx = fixture.context(serde_json::json!({}));

    let inside = ctx.normalize_path(&in_package("x.txt"));
    assert_eq!(ctx.virtualize_path(&inside), inside);

    let sibling = format!("{PACKAGE_ROOT}_old\\x.txt");
    let virtualized = ctx.virtualize_path(&ctx.normalize_path(&sibling));
    assert_eq!(
        virtualized.drive_absolute_path(),
        Some(
            vfs("ProgramFilesX64\\WindowsApps\\Contoso.Editor_1.0.0.0_x64__8wekyb3d8bbwe_old\\x.txt")
                .as_str()
        )
    );
}
