use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use windows_sys::core::{GUID, PWSTR};
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_BAD_PATHNAME,
    ERROR_FILENAME_EXCED_RANGE, ERROR_FILE_EXISTS, ERROR_FILE_NOT_FOUND, ERROR_INVALID_NAME,
    ERROR_NOT_SUPPORTED, ERROR_PATH_NOT_FOUND, ERROR_SHARING_VIOLATION, S_OK,
};
use windows_sys::Win32::Storage::FileSystem::{
    CopyFileExW, CreateDirectoryExW, CreateDirectoryW, GetFileAttributesW, GetFullPathNameW,
    COPY_FILE_FAIL_IF_EXISTS, COPY_FILE_NO_BUFFERING, INVALID_FILE_ATTRIBUTES,
};
use windows_sys::Win32::System::Com::CoTaskMemFree;
use windows_sys::Win32::UI::Shell::SHGetKnownFolderPath;

use crate::error::FsError;

pub fn map_win32_error(err: u32) -> FsError {
    match err {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => FsError::NotFound,
        ERROR_FILE_EXISTS | ERROR_ALREADY_EXISTS => FsError::AlreadyExists,
        ERROR_ACCESS_DENIED | ERROR_SHARING_VIOLATION => FsError::PermissionDenied,
        ERROR_INVALID_NAME | ERROR_BAD_PATHNAME | ERROR_FILENAME_EXCED_RANGE => {
            FsError::InvalidPath
        }
        ERROR_NOT_SUPPORTED => FsError::Unsupported,
        other => FsError::Os(other as i32),
    }
}

fn last_error() -> FsError {
    map_win32_error(unsafe { GetLastError() })
}

pub fn os_str_to_wide(value: &OsStr) -> Vec<u16> {
    value.encode_wide().chain(std::iter::once(0)).collect()
}

pub fn str_to_wide(value: &str) -> Vec<u16> {
    os_str_to_wide(OsStr::new(value))
}

pub fn get_full_path_name(path: &str) -> Option<String> {
    let wide = str_to_wide(path);
    let mut buffer: Vec<u16> = vec![0; 260];
    loop {
        let len = unsafe {
            GetFullPathNameW(
                wide.as_ptr(),
                buffer.len() as u32,
                buffer.as_mut_ptr(),
                std::ptr::null_mut(),
            )
        } as usize;
        if len == 0 {
            return None;
        }
        if len < buffer.len() {
            return Some(String::from_utf16_lossy(&buffer[..len]));
        }
        // `len` is the required size including the terminator.
        buffer.resize(len, 0);
    }
}

pub fn known_folder_path(id: &GUID) -> Option<String> {
    let mut raw: PWSTR = std::ptr::null_mut();
    let hr = unsafe { SHGetKnownFolderPath(id, 0, std::ptr::null_mut(), &mut raw) };
    let path = if hr == S_OK && !raw.is_null() {
        let len = (0..).take_while(|&i| unsafe { *raw.add(i) } != 0).count();
        let slice = unsafe { std::slice::from_raw_parts(raw, len) };
        Some(String::from_utf16_lossy(slice))
    } else {
        None
    };
    // The buffer is allocated even on failure.
    unsafe { CoTaskMemFree(raw as *const core::ffi::c_void) };
    path
}

pub fn get_file_attributes(path: &str) -> Result<u32, FsError> {
    let wide = str_to_wide(path);
    let attrs = unsafe { GetFileAttributesW(wide.as_ptr()) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        return Err(last_error());
    }
    Ok(attrs)
}

pub fn copy_file_no_replace(from: &str, to: &str) -> Result<(), FsError> {
    let from_wide = str_to_wide(from);
    let to_wide = str_to_wide(to);
    let ok = unsafe {
        CopyFileExW(
            from_wide.as_ptr(),
            to_wide.as_ptr(),
            None,
            std::ptr::null(),
            std::ptr::null_mut(),
            COPY_FILE_FAIL_IF_EXISTS | COPY_FILE_NO_BUFFERING,
        )
    };
    if ok == 0 {
        return Err(last_error());
    }
    Ok(())
}

pub fn create_directory_from_template(template: &str, path: &str) -> Result<(), FsError> {
    let template_wide = str_to_wide(template);
    let path_wide = str_to_wide(path);
    let ok = unsafe {
        CreateDirectoryExW(template_wide.as_ptr(), path_wide.as_ptr(), std::ptr::null())
    };
    if ok == 0 {
        return Err(last_error());
    }
    Ok(())
}

pub fn create_directory(path: &str) -> Result<(), FsError> {
    let wide = str_to_wide(path);
    let ok = unsafe { CreateDirectoryW(wide.as_ptr(), std::ptr::null()) };
    if ok == 0 {
        return Err(last_error());
    }
    Ok(())
}
