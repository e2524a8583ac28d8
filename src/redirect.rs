//! The redirection decision: does a path go somewhere else, and where.

use bitflags::bitflags;
use log::{debug, trace, warn};

use crate::common::dos_path::{
    is_drive_absolute, is_path_separator, remove_trailing_path_separators, LONG_PATH_PREFIX,
};
use crate::common::types::{
    REDIRECT_FLAG_CHECK_FILE_PRESENCE, REDIRECT_FLAG_COPY_FILE,
    REDIRECT_FLAG_ENSURE_DIRECTORY_STRUCTURE,
};
use crate::common::unicode::{
    find_path_ignore_case, path_eq_ignore_case, strip_path_component_prefix, strip_path_prefix,
};
use crate::context::RedirectionContext;
use crate::error::FsError;
use crate::normalize::NormalizedPath;
use crate::platform::Platform;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RedirectFlags: u32 {
        /// Only redirect if something exists at the source or the target.
        const CHECK_FILE_PRESENCE = REDIRECT_FLAG_CHECK_FILE_PRESENCE;
        /// Copy the source into the writable area on first access.
        const COPY_FILE = REDIRECT_FLAG_COPY_FILE;
        /// Create intermediate directories along the redirected path.
        const ENSURE_DIRECTORY_STRUCTURE = REDIRECT_FLAG_ENSURE_DIRECTORY_STRUCTURE;
    }
}

impl RedirectFlags {
    pub fn check_file_presence(self) -> bool {
        self.contains(RedirectFlags::CHECK_FILE_PRESENCE)
    }

    pub fn copy_file(self) -> bool {
        self.contains(RedirectFlags::COPY_FILE)
    }

    pub fn ensure_directory_structure(self) -> bool {
        self.contains(RedirectFlags::ENSURE_DIRECTORY_STRUCTURE)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RedirectDecision {
    pub should_redirect: bool,
    /// `\\?\`-prefixed target; empty unless `should_redirect`.
    pub redirect_path: String,
    pub read_only: bool,
}

impl RedirectionContext {
    pub fn should_redirect(&self, path: &str, flags: RedirectFlags) -> RedirectDecision {
        let mut decision = RedirectDecision::default();
        debug!("should_redirect: {path} flags={flags:?}");

        let normalized = self.normalize_path(path);
        let Some(normalized_path) = normalized.drive_absolute_path() else {
            trace!("should_redirect: {path} has no drive-absolute form");
            return decision;
        };
        trace!("should_redirect: normalized={normalized_path}");

        // Used for the presence check and as the fallback copy source; rule
        // matching happens on the virtualized form.
        let devirtualized = self.devirtualize_path(&normalized);
        let devirtualized_path = devirtualized.drive_absolute_path().unwrap_or(normalized_path);
        trace!("should_redirect: devirtualized={devirtualized_path}");

        let virtualized = self.virtualize_path(&normalized);
        let Some(virtual_path) = virtualized.drive_absolute_path() else {
            return decision;
        };
        trace!("should_redirect: virtualized={virtual_path}");

        for spec in self.redirection_specs() {
            let Some(relative_path) = strip_path_component_prefix(virtual_path, &spec.base_path) else {
                trace!("should_redirect: not under base {}", spec.base_path);
                continue;
            };
            // An empty remainder is an exact match on the base; it is tested
            // as-is so that a first CreateDirectory on the base itself matches.
            if !spec.matches(relative_path) {
                trace!(
                    "should_redirect: {relative_path} does not match {} under {}",
                    spec.pattern(),
                    spec.base_path
                );
                continue;
            }
            if spec.is_exclusion {
                debug!("should_redirect: {path} excluded by {} under {}", spec.pattern(), spec.base_path);
                decision.should_redirect = false;
                break;
            }
            decision.should_redirect = true;
            decision.read_only = spec.is_read_only;
            decision.redirect_path = self.redirected_path(
                &virtualized,
                flags.ensure_directory_structure(),
                &spec.redirect_target_base,
            );
            debug!("should_redirect: {path} matched, target {}", decision.redirect_path);
            break;
        }

        if !decision.should_redirect {
            debug!("should_redirect: no redirect rule for {path}");
            return decision;
        }

        if flags.check_file_presence() {
            let platform = self.platform();
            let present = platform.path_exists(&decision.redirect_path)
                || platform.path_exists(virtual_path)
                || platform.path_exists(devirtualized_path);
            if !present {
                debug!("should_redirect: nothing present for {path}; skipped");
                return RedirectDecision::default();
            }
        }

        if flags.copy_file() {
            self.materialize(&decision.redirect_path, virtual_path, devirtualized_path);
        }

        debug!("should_redirect: {path} -> {}", decision.redirect_path);
        decision
    }

    pub fn should_redirect_wide(&self, path: &[u16], flags: RedirectFlags) -> RedirectDecision {
        self.should_redirect(&String::from_utf16_lossy(path), flags)
    }

    /// Copies (or creates, for directories) the source into `target` unless
    /// `target` already exists. Failures are logged only; the caller finds
    /// out when it touches the target.
    fn materialize(&self, target: &str, virtual_source: &str, fallback_source: &str) {
        let platform = self.platform();
        if platform.path_exists(target) {
            trace!("materialize: {target} already present");
            return;
        }
        let source = if platform.path_exists(virtual_source) {
            virtual_source
        } else {
            fallback_source
        };

        let attributes = match platform.file_attributes(source) {
            Ok(attributes) => attributes,
            Err(err) => {
                debug!("materialize: source {source} unavailable ({err}); nothing to copy");
                return;
            }
        };
        trace!("materialize: source {source} attributes={attributes:?}");

        if attributes.is_directory() {
            match platform.create_directory_from_template(source, target) {
                Ok(()) => debug!("materialize: created directory {target} from {source}"),
                Err(FsError::AlreadyExists) => debug!("materialize: {target} created concurrently"),
                Err(err) => warn!("materialize: create directory {target} from {source} failed: {err}"),
            }
        } else {
            match platform.copy_file(source, target) {
                Ok(()) => debug!("materialize: copied {source} to {target}"),
                Err(FsError::AlreadyExists) => debug!("materialize: {target} created concurrently"),
                Err(err) => warn!("materialize: copy {source} to {target} failed: {err}"),
            }
        }
    }

    /// Computes where `path` lands under `target_base`.
    ///
    /// In-package paths keep their package-relative suffix; anything else is
    /// filed under a `<drive>$` folder. With `ensure_directory_structure`
    /// the intermediate directories are created along the way.
    pub fn redirected_path(
        &self,
        path: &NormalizedPath,
        ensure_directory_structure: bool,
        target_base: &str,
    ) -> String {
        let roots = self.roots();
        let targets_writable_root = path_eq_ignore_case(
            remove_trailing_path_separators(target_base),
            &roots.writable_package_root,
        );
        let base_path = if targets_writable_root {
            long_path(&roots.writable_package_root)
        } else {
            long_path(remove_trailing_path_separators(target_base))
        };

        let full_path = path.full_path();
        let relative_path = match self.package_relative_suffix(full_path) {
            Some(suffix) if targets_writable_root => {
                trace!("redirected_path: in package, default target");
                suffix.to_string()
            }
            Some(suffix) => {
                trace!("redirected_path: in package, target {target_base}");
                format!("\\PackageCache\\{}{suffix}", roots.package_family_name)
            }
            None => {
                let targets_redirect_root = path_eq_ignore_case(
                    remove_trailing_path_separators(target_base),
                    &roots.redirect_root,
                );
                let mut relative = if targets_redirect_root {
                    trace!("redirected_path: outside package, default target");
                    String::new()
                } else {
                    trace!("redirected_path: outside package, target {target_base}");
                    format!("\\PackageCache\\{}\\VFS\\PackageDrive", roots.package_family_name)
                };
                let drive_absolute = path.drive_absolute_path().unwrap_or(full_path);
                debug_assert!(is_drive_absolute(drive_absolute));
                // NTFS rejects ':' in names, so `C:` is filed as `C$`.
                let mut chars = drive_absolute.chars();
                relative.push('\\');
                if let Some(drive) = chars.next() {
                    relative.push(drive);
                }
                relative.push('$');
                relative.push_str(drive_absolute.get(2..).unwrap_or(""));
                relative
            }
        };
        debug!("redirected_path: base={base_path} relative={relative_path}");

        let candidate = format!("{base_path}{relative_path}");
        if self.platform().path_exists(&candidate) {
            trace!("redirected_path: {candidate} already exists");
            return candidate;
        }
        generate_redirected_path(
            self.platform(),
            &relative_path,
            ensure_directory_structure,
            base_path,
        )
    }

    /// [`redirected_path`](Self::redirected_path) with the writable package
    /// root as target.
    pub fn redirected_path_to_writable_root(
        &self,
        path: &NormalizedPath,
        ensure_directory_structure: bool,
    ) -> String {
        let target = self.roots().writable_package_root.clone();
        self.redirected_path(path, ensure_directory_structure, &target)
    }

    /// The part of `full_path` after the package root, separator included.
    /// Drive-absolute paths are measured against the install root, anything
    /// else against the final package root.
    fn package_relative_suffix<'a>(&self, full_path: &'a str) -> Option<&'a str> {
        let roots = self.roots();
        let at_boundary = |rest: &'a str| {
            (rest.is_empty() || rest.starts_with(is_path_separator)).then_some(rest)
        };
        if is_drive_absolute(full_path) {
            return strip_path_prefix(full_path, &roots.package_root).and_then(at_boundary);
        }
        if let Some(rest) = strip_path_prefix(full_path, &roots.final_package_root).and_then(at_boundary) {
            return Some(rest);
        }
        let offset = find_path_ignore_case(full_path, &roots.package_root)?;
        strip_path_prefix(&full_path[offset..], &roots.package_root).and_then(at_boundary)
    }
}

fn long_path(path: &str) -> String {
    if path.starts_with(LONG_PATH_PREFIX) {
        path.to_string()
    } else {
        format!("{LONG_PATH_PREFIX}{path}")
    }
}

/// Appends `relative_path` to `base_path`. When asked to, creates the base
/// and every intermediate directory first; the final component is never
/// created. Creation errors other than "already exists" are only logged.
fn generate_redirected_path(
    platform: &dyn Platform,
    relative_path: &str,
    ensure_directory_structure: bool,
    base_path: String,
) -> String {
    let mut result = base_path;
    if !ensure_directory_structure {
        result.push_str(relative_path);
        return result;
    }

    let mut pos = 0;
    while pos < relative_path.len() {
        match platform.create_directory(&result) {
            Ok(()) => trace!("redirected_path: created {result}"),
            Err(FsError::AlreadyExists) => {}
            Err(err) => debug!("redirected_path: create {result} failed: {err}"),
        }

        let next = relative_path[pos..]
            .char_indices()
            .skip(1)
            .find(|(_, ch)| is_path_separator(*ch))
            .map(|(idx, _)| pos + idx)
            // A trailing separator does not start another component.
            .filter(|&idx| idx + 1 < relative_path.len());
        let end = next.unwrap_or(relative_path.len());
        result.push_str(&relative_path[pos..end]);
        pos = end;
    }
    result
}
