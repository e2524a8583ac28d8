//! The `redirectedPaths` section of the fixup configuration.

use serde::Deserialize;

use crate::error::RedirectError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixupConfig {
    #[serde(default)]
    pub redirected_paths: Option<RedirectedPaths>,
}

impl FixupConfig {
    pub fn from_json(text: &str) -> Result<Self, RedirectError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RedirectError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Rule groups, processed in field order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectedPaths {
    #[serde(default)]
    pub package_relative: Vec<RedirectRule>,
    #[serde(default)]
    pub package_drive_relative: Vec<RedirectRule>,
    #[serde(default)]
    pub known_folders: Vec<KnownFolderRules>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnownFolderRules {
    /// A folder name such as `LocalAppData`, or a braced `FOLDERID` GUID.
    pub id: String,
    pub relative_paths: Vec<RedirectRule>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    pub base: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub redirect_target_base: Option<String>,
    #[serde(default)]
    pub is_exclusion: bool,
    #[serde(default)]
    pub is_read_only: bool,
}
