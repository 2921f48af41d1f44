//! Data-only plugins declared in TOML.
//!
//! A manifest plugin binds hotkeys and toolbar buttons to external programs.
//! Its contributions live under a `[register]` table, which plays the role
//! of the `register` export of a code plugin:
//!
//! ```toml
//! [register]
//! name = "gimp-tools"
//!
//! [[register.hotkeys]]
//! name = "open_in_gimp"
//! keys = ["<Alt-G>", "<Alt-g>"]
//! run = ["gimp", "{subject}"]
//!
//! [[register.toolbars]]
//! window_name = "GIMP"
//! icon = "icon/gimp.ico"
//! button_size = { width = 32, height = 32 }
//!
//! [[register.toolbars.buttons]]
//! image = "icon/gimp.png"
//! run = ["gimp", "{subject}"]
//! wait = true
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::path::Path;
use std::sync::Arc;

use imagerename_core::AppResult;
use serde::Deserialize;
use tracing::info;

use crate::error::TemplateError;
use crate::handler::Command;
use crate::host::app::App;
use crate::host::external::ExternalCommand;
use crate::host::window::{ButtonImage, ButtonSize, Window};
use crate::library::Library;

/// Top level of a manifest file.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestFile {
    /// The registration table. A manifest without one is not a plugin.
    pub register: Option<ManifestLibrary>,
}

/// The `[register]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestLibrary {
    /// Library name; defaults to the manifest file stem.
    #[serde(default)]
    pub name: Option<String>,
    /// Hotkeys running external programs.
    #[serde(default)]
    pub hotkeys: Vec<ManifestHotkey>,
    /// Toolbars whose buttons run external programs.
    #[serde(default)]
    pub toolbars: Vec<ManifestToolbar>,
}

/// A single key combo or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManifestKeys {
    /// `keys = "<F1>"`
    One(String),
    /// `keys = ["<F1>", "<F2>"]`
    Many(Vec<String>),
}

impl ManifestKeys {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(combo) => vec![combo],
            Self::Many(combos) => combos,
        }
    }
}

/// `[[register.hotkeys]]`
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestHotkey {
    /// Logical hotkey name.
    pub name: String,
    /// Key combos.
    pub keys: ManifestKeys,
    /// Program and arguments; `{subject}` is replaced by the current image.
    pub run: Vec<String>,
    /// Block until the program exits.
    #[serde(default)]
    pub wait: bool,
}

/// `[[register.toolbars]]`
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestToolbar {
    /// Window title; also the registration name unless `name` is set.
    pub window_name: String,
    /// Registration name.
    #[serde(default)]
    pub name: Option<String>,
    /// Window icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Uniform button size.
    #[serde(default)]
    pub button_size: Option<ButtonSize>,
    /// Buttons per row.
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Buttons, in order.
    #[serde(default)]
    pub buttons: Vec<ManifestButton>,
}

fn default_columns() -> usize {
    1
}

/// `[[register.toolbars.buttons]]`
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestButton {
    /// Button image.
    pub image: String,
    /// Program and arguments; `{subject}` is replaced by the current image.
    pub run: Vec<String>,
    /// Block until the program exits.
    #[serde(default)]
    pub wait: bool,
}

/// Loads a manifest plugin into a new library.
pub fn load_manifest(path: &Path) -> Result<Library, TemplateError> {
    let location = path.display();
    let content = std::fs::read_to_string(path).map_err(|e| {
        TemplateError::invalid_plugin_with_source(&location, "cannot read manifest", e)
    })?;
    let manifest: ManifestFile = toml::from_str(&content).map_err(|e| {
        TemplateError::invalid_plugin_with_source(&location, "malformed manifest", e)
    })?;
    let register = manifest
        .register
        .ok_or_else(|| TemplateError::invalid_plugin(&location, "does not expose `register`"))?;

    let name = register
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .ok_or_else(|| TemplateError::invalid_plugin(&location, "library has no name"))?;

    let mut library = Library::new(name);
    if let Some(parent) = path.parent() {
        library = library.with_base_dir(parent);
    }

    for hotkey in register.hotkeys {
        register_hotkey(&mut library, hotkey)
            .map_err(|reason| TemplateError::invalid_plugin(&location, reason))?;
    }
    for toolbar in register.toolbars {
        register_toolbar(&mut library, toolbar)
            .map_err(|reason| TemplateError::invalid_plugin(&location, reason))?;
    }

    info!(
        plugin = %location,
        library = %library.name(),
        hotkeys = library.hotkeys().len(),
        toolbars = library.toolbars().len(),
        "Manifest plugin loaded"
    );
    Ok(library)
}

fn register_hotkey(library: &mut Library, hotkey: ManifestHotkey) -> Result<(), String> {
    if hotkey.name.trim().is_empty() {
        return Err("hotkey without a name".to_string());
    }
    let keys = hotkey.keys.into_vec();
    if keys.is_empty() || keys.iter().any(String::is_empty) {
        return Err(format!("hotkey '{}' has an empty key combo", hotkey.name));
    }
    let command = ExternalCommand::new(hotkey.run, hotkey.wait)
        .map_err(|e| format!("hotkey '{}': {}", hotkey.name, e.message))?;

    library
        .hotkey(keys)
        .name(hotkey.name)
        .decorate(move |app: &mut App| -> AppResult<()> { command.run(app) });
    Ok(())
}

fn register_toolbar(library: &mut Library, toolbar: ManifestToolbar) -> Result<(), String> {
    if toolbar.window_name.trim().is_empty() {
        return Err("toolbar without a window name".to_string());
    }
    if toolbar.button_size.is_some_and(|size| size.width == 0 || size.height == 0) {
        return Err(format!("toolbar '{}' has a zero button size", toolbar.window_name));
    }

    let mut images = Vec::with_capacity(toolbar.buttons.len());
    let mut actions = Vec::with_capacity(toolbar.buttons.len());
    for button in toolbar.buttons {
        let command = ExternalCommand::new(button.run, button.wait).map_err(|e| {
            format!("toolbar '{}' button '{}': {}", toolbar.window_name, button.image, e.message)
        })?;
        images.push(button.image);
        actions.push(command);
    }

    let columns = toolbar.columns;
    let wire = move |_app: &mut App,
                     window: &mut Window,
                     _images: &[ButtonImage],
                     commands: &mut [Command]|
          -> AppResult<()> {
        for (slot, action) in commands.iter_mut().zip(actions.iter()) {
            let action = action.clone();
            *slot = Arc::new(move |app: &mut App| -> AppResult<()> {
                action.run(app)
            });
        }
        window.set_columns(columns);
        Ok(())
    };

    let name = toolbar.name.unwrap_or_else(|| toolbar.window_name.clone());
    let mut decorator = library.toolbar(toolbar.window_name, images).name(name);
    if let Some(size) = toolbar.button_size {
        decorator = decorator.button_size(size.width, size.height);
    }
    if let Some(icon) = toolbar.icon {
        decorator = decorator.icon(icon);
    }
    decorator.decorate(wire);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn write_manifest(dir: &tempfile::TempDir, file: &str, body: &str) -> PathBuf {
        let path = dir.path().join(file);
        let mut handle = std::fs::File::create(&path).expect("create manifest");
        handle.write_all(body.as_bytes()).expect("write manifest");
        path
    }

    #[test]
    fn test_load_hotkeys_and_toolbars() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(
            &dir,
            "tools.toml",
            r#"
[register]
name = "gimp-tools"

[[register.hotkeys]]
name = "open_in_gimp"
keys = "<Alt-G>"
run = ["gimp", "{subject}"]

[[register.toolbars]]
window_name = "GIMP"
columns = 2
button_size = { width = 32, height = 24 }

[[register.toolbars.buttons]]
image = "icon/gimp.png"
run = ["gimp", "{subject}"]
"#,
        );

        let library = load_manifest(&path).expect("manifest loads");
        assert_eq!(library.name(), "gimp-tools");
        assert_eq!(library.hotkeys()["open_in_gimp"].keys, vec!["<Alt-G>"]);
        assert_eq!(library.hotkeys()["open_in_gimp"].handler_name, "gimp-tools::open_in_gimp");

        let toolbar = &library.toolbars()["GIMP"];
        assert_eq!(toolbar.button_images, vec![dir.path().join("icon/gimp.png")]);
        assert_eq!(toolbar.button_size, Some(ButtonSize::new(32, 24)));
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(&dir, "mine.toml", "[register]\n");
        let library = load_manifest(&path).expect("manifest loads");
        assert_eq!(library.name(), "mine");
        assert!(library.is_empty());
    }

    #[test]
    fn test_missing_register_is_invalid_plugin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(&dir, "broken.toml", "[something_else]\nvalue = 1\n");
        let err = load_manifest(&path).unwrap_err();
        assert_eq!(err.location(), Some(path.display().to_string().as_str()));
        assert!(err.to_string().contains("does not expose `register`"));
    }

    #[test]
    fn test_malformed_manifest_wraps_cause() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(&dir, "bad.toml", "[register\n");
        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("malformed manifest"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_hotkey_without_program_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_manifest(
            &dir,
            "empty.toml",
            "[register]\n[[register.hotkeys]]\nname = \"x\"\nkeys = \"<F1>\"\nrun = []\n",
        );
        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("hotkey 'x'"));
    }

    #[test]
    fn test_unreadable_manifest() {
        let err = load_manifest(Path::new("/nonexistent/plugin.toml")).unwrap_err();
        assert_eq!(err.location(), Some("/nonexistent/plugin.toml"));
    }
}
