use std::fmt::Write as _;

use log::{debug, info, warn};
use regex::Regex;

use crate::common::dos_path::{join, remove_trailing_path_separators};
use crate::config::{RedirectRule, RedirectedPaths};
use crate::context::PackageRoots;
use crate::error::RedirectError;
use crate::known_folders::{known_folder_id_from_str, VfsFolderMapping};
use crate::normalize::NormalizedPath;
use crate::platform::Platform;
use crate::vfs::virtualize_path;

/// One base path + pattern pair. List order is match priority.
#[derive(Clone, Debug)]
pub struct RedirectionSpec {
    pub base_path: String,
    pattern_source: String,
    pattern: Regex,
    pub redirect_target_base: String,
    pub is_exclusion: bool,
    pub is_read_only: bool,
}

impl RedirectionSpec {
    pub fn new(
        base_path: impl Into<String>,
        pattern: &str,
        redirect_target_base: impl Into<String>,
        is_exclusion: bool,
        is_read_only: bool,
    ) -> Result<Self, RedirectError> {
        // Patterns must match the whole remainder, not a substring of it.
        let compiled = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            RedirectError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            base_path: base_path.into(),
            pattern_source: pattern.to_string(),
            pattern: compiled,
            redirect_target_base: redirect_target_base.into(),
            is_exclusion,
            is_read_only,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern_source
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.pattern.is_match(relative_path)
    }
}

struct RuleBuilder<'a> {
    writable_package_root: &'a str,
    specs: Vec<RedirectionSpec>,
    audit: String,
}

impl RuleBuilder<'_> {
    /// Registers one spec per pattern. With `trace_only` the rules are only
    /// recorded in the audit log.
    fn add_rules(
        &mut self,
        base: &str,
        rules: &[RedirectRule],
        trace_only: bool,
        rebase: impl Fn(String) -> String,
    ) -> Result<(), RedirectError> {
        for rule in rules {
            let path = rebase(remove_trailing_path_separators(&join(base, &rule.base)).to_string());
            let target = rule
                .redirect_target_base
                .clone()
                .unwrap_or_else(|| self.writable_package_root.to_string());

            let _ = write!(self.audit, " base:{} ; patterns:", rule.base);
            for pattern in &rule.patterns {
                let _ = write!(self.audit, "{pattern} ;");
                if !trace_only {
                    self.specs.push(RedirectionSpec::new(
                        path.clone(),
                        pattern,
                        target.clone(),
                        rule.is_exclusion,
                        rule.is_read_only,
                    )?);
                }
            }
            self.audit.push('\n');
            if trace_only {
                debug!("rule (inactive): path={path} retarget={target}");
            } else {
                debug!("rule: path={path} retarget={target}");
            }
        }
        Ok(())
    }
}

/// Expands the configured rule groups into specs, in the fixed group order
/// package-relative, package-drive-relative, known folders.
pub fn build_redirection_specs(
    config: &RedirectedPaths,
    platform: &dyn Platform,
    roots: &PackageRoots,
    mappings: &[VfsFolderMapping],
) -> Result<Vec<RedirectionSpec>, RedirectError> {
    let mut builder = RuleBuilder {
        writable_package_root: &roots.writable_package_root,
        specs: Vec::new(),
        audit: String::from(" config:\n redirectedPaths:\n"),
    };

    if !config.package_relative.is_empty() {
        builder.audit.push_str(" packageRelative:\n");
        builder.add_rules(&roots.package_root, &config.package_relative, false, |p| p)?;
    }

    if !config.package_drive_relative.is_empty() {
        builder.audit.push_str(" packageDriveRelative:\n");
        let drive_root = format!("{}\\", roots.package_drive());
        builder.add_rules(&drive_root, &config.package_drive_relative, false, |p| p)?;
    }

    if !config.known_folders.is_empty() {
        builder.audit.push_str(" knownFolders:\n");
        for group in &config.known_folders {
            let _ = writeln!(builder.audit, " id:{} ; relativePaths:", group.id);
            let folder = known_folder_id_from_str(&group.id).and_then(|id| platform.known_folder(&id));
            match folder {
                Some(folder) => {
                    // Queries are matched in their virtualized form, so the
                    // base has to be spelled the same way.
                    let rebase = |path: String| {
                        virtualize_path(&NormalizedPath::drive_absolute(path), roots, mappings)
                            .full_path()
                            .to_string()
                    };
                    builder.add_rules(&folder, &group.relative_paths, false, rebase)?;
                }
                None => {
                    warn!("known folder {} cannot be resolved; its rules are not applied", group.id);
                    builder.add_rules("", &group.relative_paths, true, |p| p)?;
                }
            }
        }
    }

    info!("redirection config:\n{}", builder.audit);
    Ok(builder.specs)
}
