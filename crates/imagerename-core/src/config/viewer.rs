//! Image viewer configuration.

use serde::{Deserialize, Serialize};

/// Settings for the interactive viewer host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Directory holding the images to walk through.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    /// Accepted file extensions (case-insensitive, without the dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Interval between host loop ticks in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Icon applied to windows whose plugin gives none or an unreadable one.
    #[serde(default = "default_icon")]
    pub default_icon: String,
    /// External editor program, invoked with the current image path.
    #[serde(default = "default_editor")]
    pub editor: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            extensions: default_extensions(),
            tick_interval_ms: default_tick_interval(),
            default_icon: default_icon(),
            editor: default_editor(),
        }
    }
}

impl ViewerConfig {
    /// Returns whether a file extension is accepted.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

fn default_image_dir() -> String {
    "./image".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string(), "bmp".to_string(), "jpg".to_string()]
}

fn default_tick_interval() -> u64 {
    8
}

fn default_icon() -> String {
    "./assets/icon/main.ico".to_string()
}

fn default_editor() -> String {
    if cfg!(windows) {
        "mspaint".to_string()
    } else {
        "xdg-open".to_string()
    }
}
