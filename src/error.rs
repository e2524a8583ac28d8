use std::io;

use thiserror::Error;

use crate::common::types::RedirectStatus;

/// Failures while building a [`RedirectionContext`](crate::RedirectionContext).
///
/// Queries never fail; these only surface from initialization.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("package root `{0}` is not a drive-absolute path")]
    InvalidPackageRoot(String),

    #[error("known folder {0} could not be resolved")]
    KnownFolderUnavailable(&'static str),

    #[error("invalid redirection pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed redirection config")]
    Config(#[from] serde_json::Error),
}

impl From<&RedirectError> for RedirectStatus {
    fn from(err: &RedirectError) -> Self {
        match err {
            RedirectError::InvalidPackageRoot(_) => RedirectStatus::InvalidPackageRoot,
            RedirectError::KnownFolderUnavailable(_) => RedirectStatus::KnownFolderUnavailable,
            RedirectError::InvalidPattern { .. } => RedirectStatus::InvalidPattern,
            RedirectError::Config(_) => RedirectStatus::ConfigError,
        }
    }
}

/// Outcome of a failed platform file-system primitive.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum FsError {
    #[error("path not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("permission denied")]
    PermissionDenied,
    #[error("invalid path")]
    InvalidPath,
    #[error("operation not supported for this path")]
    Unsupported,
    #[error("os error {0}")]
    Os(i32),
}

pub fn map_io_error(err: &io::Error) -> FsError {
    use io::ErrorKind;
    match err.kind() {
        ErrorKind::NotFound => FsError::NotFound,
        ErrorKind::AlreadyExists => FsError::AlreadyExists,
        ErrorKind::PermissionDenied => FsError::PermissionDenied,
        ErrorKind::InvalidInput => FsError::InvalidPath,
        ErrorKind::Unsupported => FsError::Unsupported,
        _ => FsError::Os(err.raw_os_error().unwrap_or(-1)),
    }
}
