//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugin;
pub mod viewer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugin::PluginConfig;
use self::viewer::ViewerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// configuration sources (default.toml + explicit file + environment).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Image viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Key combo overrides: hotkey name → key combos.
    ///
    /// Applied after all plugin libraries are merged, so a setting file can
    /// re-bind a default hotkey without writing a plugin.
    #[serde(default)]
    pub hotkeys: BTreeMap<String, Vec<String>>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges the optional `config/default.toml`, the explicit file (if any,
    /// which must then exist), and environment variables prefixed with
    /// `IMAGERENAME__` (for example `IMAGERENAME__VIEWER__IMAGE_DIR`).
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = path {
            tracing::debug!(path = %path, "Adding configuration file");
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("IMAGERENAME")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::plugin::LoadOrder;

    #[test]
    fn test_defaults_without_any_source() {
        let config = AppConfig::default();
        assert_eq!(config.viewer.tick_interval_ms, 8);
        assert_eq!(config.viewer.extensions, vec!["png", "bmp", "jpg"]);
        assert!(config.plugins.builtins);
        assert_eq!(config.plugins.load_order, LoadOrder::BuiltinsFirst);
        assert!(config.hotkeys.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("setting.toml");
        std::fs::write(
            &path,
            r#"
[viewer]
image_dir = "./image"
tick_interval_ms = 16

[plugins]
paths = ["plugins/mspaint.toml"]
load_order = "user_first"

[hotkeys]
commit = ["<Return>", "<space>"]
"#,
        )
        .expect("write");

        let config = AppConfig::load(Some(path.to_str().expect("utf8"))).expect("load");
        assert_eq!(config.viewer.image_dir, "./image");
        assert_eq!(config.viewer.tick_interval_ms, 16);
        assert_eq!(config.plugins.paths, vec!["plugins/mspaint.toml"]);
        assert_eq!(config.plugins.load_order, LoadOrder::UserFirst);
        assert_eq!(
            config.hotkeys.get("commit"),
            Some(&vec!["<Return>".to_string(), "<space>".to_string()])
        );
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let err = AppConfig::load(Some("/nonexistent/imagerename.toml")).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
