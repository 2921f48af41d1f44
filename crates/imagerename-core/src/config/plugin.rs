//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Order in which builtin and user plugins are merged.
///
/// Merging is last-writer-wins, so whichever group is loaded second takes
/// over hotkeys, panels and toolbars registered under the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrder {
    /// Builtins first, so user plugins override defaults.
    #[default]
    BuiltinsFirst,
    /// User plugins first, so builtins win on collisions.
    UserFirst,
}

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Explicit user plugin locations (manifest files or shared libraries).
    #[serde(default)]
    pub paths: Vec<String>,
    /// Directory scanned for additional plugins, loaded after `paths`.
    #[serde(default)]
    pub directory: Option<String>,
    /// Whether to load the builtin plugins.
    #[serde(default = "default_true")]
    pub builtins: bool,
    /// Merge order of builtin versus user plugins.
    #[serde(default)]
    pub load_order: LoadOrder,
    /// Base directory for assets referenced by builtin plugins.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            directory: None,
            builtins: true,
            load_order: LoadOrder::default(),
            asset_dir: default_asset_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_asset_dir() -> String {
    "./assets".to_string()
}
