use std::fs;

use psf_redirect::windows_native::Win32Platform;
use psf_redirect::{normalize_path, FsError, KnownFolder, Platform};

fn temp_dir() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().to_str().expect("utf-8 temp path").to_string();
    (dir, path)
}

#[test]
fn known_folders_resolve() {
    let platform = Win32Platform::new();
    let local = platform
        .known_folder(&KnownFolder::LocalAppData.id())
        .expect("LocalAppData");
    assert!(psf_redirect::dos_path::is_drive_absolute(&local));
    assert!(platform.known_folder(&KnownFolder::System.id()).is_some());
}

#[test]
fn full_path_matches_the_emulated_canonicalizer() {
    let platform = Win32Platform::new();
    for input in ["C:\\Data\\.\\a\\..\\b.txt", "C:/Data/name. ", "C:\\Data\\dir\\"] {
        let native = platform.full_path(input).expect("full path");
        assert_eq!(
            Some(native.as_str()),
            psf_redirect::dos_path::full_path(input, "C:\\").as_deref(),
            "input {input}"
        );
    }
    let normalized = normalize_path(&platform, "\\\\?\\C:\\Data\\x");
    assert_eq!(normalized.drive_absolute_path(), Some("C:\\Data\\x"));
}

#[test]
fn copy_fails_if_destination_exists() {
    let (_dir, root) = temp_dir();
    let platform = Win32Platform::new();
    let source = format!("{root}\\source.txt");
    let target = format!("\\\\?\\{root}\\target.txt");
    fs::write(&source, b"payload").unwrap();

    platform.copy_file(&source, &target).unwrap();
    assert!(platform.path_exists(&target));
    assert!(!platform.file_attributes(&target).unwrap().is_directory());
    assert_eq!(platform.copy_file(&source, &target), Err(FsError::AlreadyExists));
}

#[test]
fn directories_are_created_once() {
    let (_dir, root) = temp_dir();
    let platform = Win32Platform::new();
    let nested = format!("{root}\\a");

    platform.create_directory(&nested).unwrap();
    assert_eq!(platform.create_directory(&nested), Err(FsError::AlreadyExists));
    assert!(platform.file_attributes(&nested).unwrap().is_directory());

    let copy = format!("{root}\\b\\c");
    platform.create_directory_from_template(&nested, &copy).unwrap();
    assert!(platform.path_exists(&copy));
    assert_eq!(
        platform.create_directory_from_template(&nested, &copy),
        Err(FsError::AlreadyExists)
    );

    assert_eq!(
        platform.file_attributes(&format!("{root}\\missing")),
        Err(FsError::NotFound)
    );
}
