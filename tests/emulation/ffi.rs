use std::ffi::c_char;

use psf_redirect::*;

use crate::support::*;

fn view(value: &str) -> RedirectStringView {
    RedirectStringView {
        ptr: value.as_ptr() as *const c_char,
        len: value.len(),
    }
}

fn view_to_string(value: &RedirectStringView) -> String {
    if value.ptr.is_null() {
        return String::new();
    }
    let bytes = unsafe { std::slice::from_raw_parts(value.ptr as *const u8, value.len) };
    String::from_utf8(bytes.to_vec()).unwrap()
}

struct TestContext {
    handle: *mut RedirectHandle,
}

impl TestContext {
    fn create(fixture: &Fixture, config_json: &str) -> Result<Self, RedirectStatus> {
        let host_root = fixture.c_root.to_str().unwrap().to_string();
        let entries = [RedirectRootMappingEntry {
            key: view("C:"),
            value: view(&host_root),
        }];
        let config = RedirectContextConfig {
            size: std::mem::size_of::<RedirectContextConfig>() as u32,
            package_root: view(PACKAGE_ROOT),
            final_package_root: RedirectStringView::empty(),
            package_family_name: view(FAMILY_NAME),
            config_json: view(config_json),
            root_mapping: RedirectRootMapping {
                entries: entries.as_ptr(),
                len: entries.len(),
            },
            reserved: [0; 4],
        };
        let mut handle = std::ptr::null_mut();
        match redirect_context_create(&config, &mut handle) {
            RedirectStatus::Ok => Ok(Self { handle }),
            status => {
                assert!(handle.is_null());
                Err(status)
            }
        }
    }

    fn should_redirect(&self, path: &str, flags: u32) -> (bool, bool, String) {
        let mut out = empty_decision();
        let status = redirect_should_redirect(self.handle, &view(path), flags, &mut out);
        assert_eq!(status, RedirectStatus::Ok);
        let target = view_to_string(&out.redirect_path);
        redirect_free_string(out.redirect_path);
        (out.should_redirect, out.read_only, target)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        redirect_context_destroy(self.handle);
    }
}

fn empty_decision() -> RedirectDecisionOut {
    RedirectDecisionOut {
        size: std::mem::size_of::<RedirectDecisionOut>() as u32,
        should_redirect: false,
        read_only: false,
        redirect_path: RedirectStringView::empty(),
    }
}

const CONFIG: &str = r#"{
    "redirectedPaths": {
        "packageRelative": [
            { "base": "data", "patterns": [".*\\.ini"], "isReadOnly": true }
        ]
    }
}"#;

#[test]
fn should_redirect_over_the_c_abi() {
    let fixture = Fixture::new();
    let ctx = TestContext::create(&fixture, CONFIG).unwrap();

    let (redirect, read_only, target) = ctx.should_redirect(
        &in_package("data\\app.ini"),
        REDIRECT_FLAG_ENSURE_DIRECTORY_STRUCTURE,
    );
    assert!(redirect);
    assert!(read_only);
    assert_eq!(target, long(&format!("{WRITABLE_ROOT}\\data\\app.ini")));
    assert!(fixture.host(&format!("{WRITABLE_ROOT}\\data")).is_dir());

    let (redirect, _, target) = ctx.should_redirect(&in_package("data\\app.log"), 0);
    assert!(!redirect);
    assert!(target.is_empty());
}

#[test]
fn wide_entry_point_matches_utf8() {
    let fixture = Fixture::new();
    let ctx = TestContext::create(&fixture, CONFIG).unwrap();
    let wide: Vec<u16> = in_package("data\\app.ini").encode_utf16().collect();
    let wide_view = RedirectWideStringView {
        ptr: wide.as_ptr(),
        len: wide.len(),
    };

    let mut out = empty_decision();
    let status = redirect_should_redirect_w(ctx.handle, &wide_view, 0, &mut out);
    assert_eq!(status, RedirectStatus::Ok);
    assert!(out.should_redirect);
    assert_eq!(
        view_to_string(&out.redirect_path),
        long(&format!("{WRITABLE_ROOT}\\data\\app.ini"))
    );
    redirect_free_string(out.redirect_path);
}

#[test]
fn null_path_is_never_redirected() {
    let fixture = Fixture::new();
    let ctx = TestContext::create(&fixture, CONFIG).unwrap();

    let mut out = empty_decision();
    let status = redirect_should_redirect(ctx.handle, std::ptr::null(), 0, &mut out);
    assert_eq!(status, RedirectStatus::Ok);
    assert!(!out.should_redirect);

    let status = redirect_should_redirect_w(ctx.handle, std::ptr::null(), 0, &mut out);
    assert_eq!(status, RedirectStatus::Ok);
    assert!(!out.should_redirect);
}

#[test]
fn invalid_utf8_is_an_encoding_error() {
    let fixture = Fixture::new();
    let ctx = TestContext::create(&fixture, CONFIG).unwrap();
    let bytes = [b'C', b':', b'\\', 0xff];
    let bad = RedirectStringView {
        ptr: bytes.as_ptr() as *const c_char,
        len: bytes.len(),
    };
    let mut out = empty_decision();
    let status = redirect_should_redirect(ctx.handle, &bad, 0, &mut out);
    assert_eq!(status, RedirectStatus::EncodingError);
    assert!(!out.should_redirect);
}

#[test]
fn normalize_reports_the_drive_absolute_offset() {
    let fixture = Fixture::new();
    let ctx = TestContext::create(&fixture, "").unwrap();

    let mut out = RedirectNormalizedPathOut {
        full_path: RedirectStringView::empty(),
        has_drive_absolute: false,
        drive_absolute_offset: 0,
    };
    let status = redirect_normalize_path(ctx.handle, &view("\\\\?\\C:\\Data\\x"), &mut out);
    assert_eq!(status, RedirectStatus::Ok);
    assert_eq!(view_to_string(&out.full_path), "\\\\?\\C:\\Data\\x");
    assert!(out.has_drive_absolute);
    assert_eq!(out.drive_absolute_offset, 4);
    redirect_free_string(out.full_path);

    let status = redirect_normalize_path(ctx.handle, &view("\\\\server\\share\\x"), &mut out);
    assert_eq!(status, RedirectStatus::Ok);
    assert!(!out.has_drive_absolute);
    redirect_free_string(out.full_path);
}

#[test]
fn create_reports_configuration_failures() {
    let fixture = Fixture::new();
    assert_eq!(
        TestContext::create(&fixture, "{ not json").err(),
        Some(RedirectStatus::ConfigError)
    );
    assert_eq!(
        TestContext::create(
            &fixture,
            r#"{ "redirectedPaths": { "packageRelative": [ { "base": "x", "patterns": ["("] } ] } }"#
        )
        .err(),
        Some(RedirectStatus::InvalidPattern)
    );
}

#[test]
fn create_rejects_short_config_and_null_arguments() {
    let fixture = Fixture::new();
    let host_root = fixture.c_root.to_str().unwrap().to_string();
    let entries = [RedirectRootMappingEntry {
        key: view("C:"),
        value: view(&host_root),
    }];
    let config = RedirectContextConfig {
        size: 8,
        package_root: view(PACKAGE_ROOT),
        final_package_root: RedirectStringView::empty(),
        package_family_name: view(FAMILY_NAME),
        config_json: RedirectStringView::empty(),
        root_mapping: RedirectRootMapping {
            entries: entries.as_ptr(),
            len: entries.len(),
        },
        reserved: [0; 4],
    };
    let mut handle = std::ptr::null_mut();
    assert_eq!(redirect_context_create(&config, &mut handle), RedirectStatus::InvalidArgument);
    assert!(handle.is_null());
    assert_eq!(
        redirect_context_create(std::ptr::null(), &mut handle),
        RedirectStatus::InvalidArgument
    );
    assert_eq!(
        redirect_context_create(&config, std::ptr::null_mut()),
        RedirectStatus::InvalidArgument
    );

    let mut out = empty_decision();
    assert_eq!(
        redirect_should_redirect(std::ptr::null(), &view("C:\\x"), 0, &mut out),
        RedirectStatus::InvalidArgument
    );
    redirect_context_destroy(std::ptr::null_mut());
    redirect_free_string(RedirectStringView::empty());
}
