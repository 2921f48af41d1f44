//! Plugins linked into the binary.

pub mod default_hotkeys;
pub mod default_panels;
pub mod default_toolbars;

use crate::engine::{PluginLocation, StaticPlugin};

/// Every builtin plugin, in load order.
pub const BUILTINS: &[StaticPlugin] = &[
    StaticPlugin {
        name: "default_hotkeys",
        register: default_hotkeys::register,
    },
    StaticPlugin {
        name: "default_panels",
        register: default_panels::register,
    },
    StaticPlugin {
        name: "default_toolbars",
        register: default_toolbars::register,
    },
];

/// Locations of every builtin plugin, in load order.
pub fn builtin_locations() -> Vec<PluginLocation> {
    BUILTINS
        .iter()
        .map(|plugin| PluginLocation::Builtin(plugin.name.to_string()))
        .collect()
}
