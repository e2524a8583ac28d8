use core::ffi::{c_char, c_void};

use log::error;

use crate::common::types::*;
use crate::config::FixupConfig;
use crate::context::{PackageIdentity, RedirectionContext};
use crate::logging::{self, RedirectLogCallback};
use crate::redirect::{RedirectDecision, RedirectFlags};
use crate::NativePlatform;

pub struct RedirectHandle {
    inner: RedirectionContext,
}

fn string_view_to_str<'a>(view: *const RedirectStringView) -> Result<&'a str, RedirectStatus> {
    let view = unsafe { view.as_ref() }.ok_or(RedirectStatus::InvalidArgument)?;
    view_to_str(view)
}

fn view_to_str<'a>(view: &RedirectStringView) -> Result<&'a str, RedirectStatus> {
    if view.ptr.is_null() {
        return if view.len == 0 {
            Ok("")
        } else {
            Err(RedirectStatus::InvalidArgument)
        };
    }
    let bytes = unsafe { std::slice::from_raw_parts(view.ptr as *const u8, view.len) };
    std::str::from_utf8(bytes).map_err(|_| RedirectStatus::EncodingError)
}

fn write_string_view(value: &str, out: &mut RedirectStringView) -> Result<(), RedirectStatus> {
    if value.is_empty() {
        *out = RedirectStringView::empty();
        return Ok(());
    }
    let bytes = value.as_bytes();
    let ptr = unsafe { libc::malloc(bytes.len()) } as *mut u8;
    if ptr.is_null() {
        return Err(RedirectStatus::IoError);
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
    }
    out.ptr = ptr as *const c_char;
    out.len = bytes.len();
    Ok(())
}

#[cfg(not(windows))]
fn platform_from_config(config: &RedirectContextConfig) -> Result<NativePlatform, RedirectStatus> {
    let mapping = &config.root_mapping;
    if mapping.entries.is_null() && mapping.len != 0 {
        return Err(RedirectStatus::InvalidArgument);
    }
    let entries = if mapping.len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(mapping.entries, mapping.len) }
    };
    let mut platform = NativePlatform::new();
    for entry in entries {
        let key = view_to_str(&entry.key)?;
        let value = view_to_str(&entry.value)?;
        if !value.starts_with('/') {
            return Err(RedirectStatus::InvalidArgument);
        }
        platform = platform
            .with_drive(key, value)
            .map_err(|_| RedirectStatus::InvalidArgument)?;
    }
    Ok(platform)
}

#[cfg(windows)]
fn platform_from_config(_config: &RedirectContextConfig) -> Result<NativePlatform, RedirectStatus> {
    Ok(NativePlatform::new())
}

fn build_context(config: &RedirectContextConfig) -> Result<RedirectionContext, RedirectStatus> {
    if (config.size as usize) < std::mem::size_of::<RedirectContextConfig>() {
        return Err(RedirectStatus::InvalidArgument);
    }
    let identity = PackageIdentity {
        root: view_to_str(&config.package_root)?.to_string(),
        final_root: view_to_str(&config.final_package_root)?.to_string(),
        family_name: view_to_str(&config.package_family_name)?.to_string(),
    };
    let config_json = view_to_str(&config.config_json)?;
    let fixup_config = if config_json.trim().is_empty() {
        FixupConfig::default()
    } else {
        FixupConfig::from_json(config_json).map_err(|err| {
            error!("redirect_context_create: {err}");
            RedirectStatus::from(&err)
        })?
    };
    let platform = platform_from_config(config)?;
    RedirectionContext::new(platform, &identity, &fixup_config).map_err(|err| {
        error!("redirect_context_create: {err}");
        RedirectStatus::from(&err)
    })
}

#[no_mangle]
pub extern "C" fn redirect_context_create(
    config: *const RedirectContextConfig,
    out_handle: *mut *mut RedirectHandle,
) -> RedirectStatus {
    let Some(out_handle) = (unsafe { out_handle.as_mut() }) else {
        return RedirectStatus::InvalidArgument;
    };
    *out_handle = std::ptr::null_mut();
    let Some(config) = (unsafe { config.as_ref() }) else {
        return RedirectStatus::InvalidArgument;
    };
    match build_context(config) {
        Ok(inner) => {
            *out_handle = Box::into_raw(Box::new(RedirectHandle { inner }));
            RedirectStatus::Ok
        }
        Err(status) => status,
    }
}

#[no_mangle]
pub extern "C" fn redirect_context_destroy(handle: *mut RedirectHandle) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}

fn write_decision(decision: &RedirectDecision, out: &mut RedirectDecisionOut) -> RedirectStatus {
    out.should_redirect = decision.should_redirect;
    out.read_only = decision.read_only;
    match write_string_view(&decision.redirect_path, &mut out.redirect_path) {
        Ok(()) => RedirectStatus::Ok,
        Err(status) => {
            out.should_redirect = false;
            status
        }
    }
}

fn prepare_decision_out<'a>(out: *mut RedirectDecisionOut) -> Result<&'a mut RedirectDecisionOut, RedirectStatus> {
    let out = unsafe { out.as_mut() }.ok_or(RedirectStatus::InvalidArgument)?;
    if (out.size as usize) < std::mem::size_of::<RedirectDecisionOut>() {
        return Err(RedirectStatus::InvalidArgument);
    }
    out.should_redirect = false;
    out.read_only = false;
    out.redirect_path = RedirectStringView::empty();
    Ok(out)
}

/// Decides whether `path` is redirected. A null path is never redirected.
/// On success a non-empty `redirect_path` must be released with
/// [`redirect_free_string`].
#[no_mangle]
pub extern "C" fn redirect_should_redirect(
    handle: *const RedirectHandle,
    path: *const RedirectStringView,
    flags: u32,
    out_decision: *mut RedirectDecisionOut,
) -> RedirectStatus {
    let out = match prepare_decision_out(out_decision) {
        Ok(out) => out,
        Err(status) => return status,
    };
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return RedirectStatus::InvalidArgument;
    };
    let path = match string_view_to_str(path) {
        Ok(path) => path,
        Err(RedirectStatus::InvalidArgument) => return RedirectStatus::Ok,
        Err(status) => return status,
    };
    if path.is_empty() {
        return RedirectStatus::Ok;
    }
    let decision = handle
        .inner
        .should_redirect(path, RedirectFlags::from_bits_truncate(flags));
    write_decision(&decision, out)
}

/// UTF-16 variant of [`redirect_should_redirect`]; `redirect_path` is still
/// returned as UTF-8.
#[no_mangle]
pub extern "C" fn redirect_should_redirect_w(
    handle: *const RedirectHandle,
    path: *const RedirectWideStringView,
    flags: u32,
    out_decision: *mut RedirectDecisionOut,
) -> RedirectStatus {
    let out = match prepare_decision_out(out_decision) {
        Ok(out) => out,
        Err(status) => return status,
    };
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return RedirectStatus::InvalidArgument;
    };
    let Some(path) = (unsafe { path.as_ref() }) else {
        return RedirectStatus::Ok;
    };
    if path.ptr.is_null() || path.len == 0 {
        return RedirectStatus::Ok;
    }
    let wide = unsafe { std::slice::from_raw_parts(path.ptr, path.len) };
    let decision = handle
        .inner
        .should_redirect_wide(wide, RedirectFlags::from_bits_truncate(flags));
    write_decision(&decision, out)
}

#[no_mangle]
pub extern "C" fn redirect_normalize_path(
    handle: *const RedirectHandle,
    path: *const RedirectStringView,
    out_path: *mut RedirectNormalizedPathOut,
) -> RedirectStatus {
    let Some(out) = (unsafe { out_path.as_mut() }) else {
        return RedirectStatus::InvalidArgument;
    };
    out.full_path = RedirectStringView::empty();
    out.has_drive_absolute = false;
    out.drive_absolute_offset = 0;
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return RedirectStatus::InvalidArgument;
    };
    let path = match string_view_to_str(path) {
        Ok(path) => path,
        Err(status) => return status,
    };
    let normalized = handle.inner.normalize_path(path);
    if let Err(status) = write_string_view(normalized.full_path(), &mut out.full_path) {
        return status;
    }
    if let Some(offset) = normalized.drive_absolute_offset() {
        out.has_drive_absolute = true;
        out.drive_absolute_offset = offset;
    }
    RedirectStatus::Ok
}

#[no_mangle]
pub extern "C" fn redirect_free_string(value: RedirectStringView) {
    if value.ptr.is_null() {
        return;
    }
    unsafe {
        libc::free(value.ptr as *mut libc::c_void);
    }
}

#[no_mangle]
pub extern "C" fn redirect_log_set_stderr(level: RedirectLogLevel) -> RedirectStatus {
    logging::log_set_stderr(level)
}

#[no_mangle]
pub extern "C" fn redirect_log_set_callback(
    callback: RedirectLogCallback,
    user_data: *mut c_void,
    level: RedirectLogLevel,
) -> RedirectStatus {
    logging::log_set_callback(callback, user_data, level)
}

#[no_mangle]
pub extern "C" fn redirect_log_set_level(level: RedirectLogLevel) -> RedirectStatus {
    logging::log_set_level(level)
}

#[no_mangle]
pub extern "C" fn redirect_log_disable() -> RedirectStatus {
    logging::log_disable()
}
