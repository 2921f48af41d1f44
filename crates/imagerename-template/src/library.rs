//! Per-plugin registration namespace.
//!
//! A plugin's `register` code receives a [`Library`] and declares its
//! contributions through decorator builders:
//!
//! ```ignore
//! lib.hotkey("<Return>").decorate(commit);
//! lib.hotkey(["<Tab>", "<F5>"]).name("skip").decorate(skip_image);
//! lib.panel("History").decorate(history);
//! lib.toolbar("My Toolbar", ["icon/paint.png"]).button_size(48, 48).decorate(toolbar);
//! ```
//!
//! Each decorator stores the handler under its explicit name or the
//! handler's own identity, and hands the handler back unchanged.
//! Malformed declarations are programming errors and panic immediately.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::handler::{
    handler_identity, HotkeyHandler, IntoHotkeyHandler, IntoPanelHandler, IntoToolbarHandler,
    PanelHandler, ToolbarHandler,
};
use crate::host::window::ButtonSize;

/// One or more key combos. A bare string is a single-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombos(Vec<String>);

impl KeyCombos {
    /// The combos, in declaration order.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for KeyCombos {
    fn from(combo: &str) -> Self {
        Self(vec![combo.to_string()])
    }
}

impl From<String> for KeyCombos {
    fn from(combo: String) -> Self {
        Self(vec![combo])
    }
}

impl From<Vec<String>> for KeyCombos {
    fn from(combos: Vec<String>) -> Self {
        Self(combos)
    }
}

impl From<Vec<&str>> for KeyCombos {
    fn from(combos: Vec<&str>) -> Self {
        Self(combos.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for KeyCombos {
    fn from(combos: &[&str]) -> Self {
        Self(combos.iter().map(|combo| combo.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyCombos {
    fn from(combos: [&str; N]) -> Self {
        Self(combos.iter().map(|combo| combo.to_string()).collect())
    }
}

/// A registered contribution, as seen by the merge step.
pub trait Registration {
    /// Qualified identity of the handler, used in conflict warnings.
    fn handler_name(&self) -> &str;
}

/// A registered hotkey.
#[derive(Debug, Clone)]
pub struct HotkeyEntry {
    /// The handler with its calling convention.
    pub handler: HotkeyHandler,
    /// Key combos.
    pub keys: Vec<String>,
    /// Qualified handler identity.
    pub handler_name: String,
}

impl Registration for HotkeyEntry {
    fn handler_name(&self) -> &str {
        &self.handler_name
    }
}

/// A registered panel.
#[derive(Debug, Clone)]
pub struct PanelEntry {
    /// Window title and uniqueness key.
    pub window_name: String,
    /// The build handler with its calling convention.
    pub handler: PanelHandler,
    /// Resolved icon path.
    pub icon: Option<PathBuf>,
    /// Qualified handler identity.
    pub handler_name: String,
}

impl Registration for PanelEntry {
    fn handler_name(&self) -> &str {
        &self.handler_name
    }
}

/// A registered toolbar.
#[derive(Debug, Clone)]
pub struct ToolbarEntry {
    /// Window title and uniqueness key.
    pub window_name: String,
    /// The wiring handler.
    pub handler: ToolbarHandler,
    /// Resolved button image paths.
    pub button_images: Vec<PathBuf>,
    /// Uniform button size.
    pub button_size: Option<ButtonSize>,
    /// Resolved icon path.
    pub icon: Option<PathBuf>,
    /// Qualified handler identity.
    pub handler_name: String,
}

impl Registration for ToolbarEntry {
    fn handler_name(&self) -> &str {
        &self.handler_name
    }
}

/// A plugin's registration namespace.
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    base_dir: Option<PathBuf>,
    hotkeys: IndexMap<String, HotkeyEntry>,
    panels: IndexMap<String, PanelEntry>,
    toolbars: IndexMap<String, ToolbarEntry>,
}

impl Library {
    /// Creates an empty library.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.trim().is_empty(), "library name must not be empty");
        Self {
            name,
            base_dir: None,
            hotkeys: IndexMap::new(),
            panels: IndexMap::new(),
            toolbars: IndexMap::new(),
        }
    }

    /// Sets the directory relative asset paths are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// The library (plugin) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The asset base directory.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolves a relative asset path against the base directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Registered hotkeys, by logical name.
    pub fn hotkeys(&self) -> &IndexMap<String, HotkeyEntry> {
        &self.hotkeys
    }

    /// Registered panels, by logical name.
    pub fn panels(&self) -> &IndexMap<String, PanelEntry> {
        &self.panels
    }

    /// Registered toolbars, by logical name.
    pub fn toolbars(&self) -> &IndexMap<String, ToolbarEntry> {
        &self.toolbars
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        IndexMap<String, HotkeyEntry>,
        IndexMap<String, PanelEntry>,
        IndexMap<String, ToolbarEntry>,
    ) {
        (self.name, self.hotkeys, self.panels, self.toolbars)
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.hotkeys.is_empty() && self.panels.is_empty() && self.toolbars.is_empty()
    }

    /// Declares a hotkey bound to one or more key combos.
    pub fn hotkey(&mut self, keys: impl Into<KeyCombos>) -> HotkeyDecorator<'_> {
        let keys = keys.into().into_vec();
        assert!(!keys.is_empty(), "hotkey needs at least one key combo");
        assert!(
            keys.iter().all(|combo| !combo.is_empty()),
            "hotkey key combos must not be empty"
        );
        HotkeyDecorator {
            library: self,
            keys,
            name: None,
        }
    }

    /// Declares a panel window.
    pub fn panel(&mut self, window_name: impl Into<String>) -> PanelDecorator<'_> {
        let window_name = window_name.into();
        assert!(!window_name.trim().is_empty(), "panel window name must not be empty");
        PanelDecorator {
            library: self,
            window_name,
            icon: None,
            name: None,
        }
    }

    /// Declares a toolbar window with its ordered button images.
    pub fn toolbar<I, P>(&mut self, window_name: impl Into<String>, button_images: I) -> ToolbarDecorator<'_>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let window_name = window_name.into();
        assert!(!window_name.trim().is_empty(), "toolbar window name must not be empty");
        let button_images = button_images
            .into_iter()
            .map(|image| self.resolve(image))
            .collect();
        ToolbarDecorator {
            library: self,
            window_name,
            button_images,
            button_size: None,
            icon: None,
            name: None,
        }
    }

    fn entry_key<F>(&self, explicit: Option<String>, what: &str) -> (String, String) {
        let identity = handler_identity::<F>();
        let key = explicit.or_else(|| identity.clone()).unwrap_or_else(|| {
            panic!(
                "{what} in library '{}' needs an explicit name: closures have no identity",
                self.name
            )
        });
        let handler_name = format!("{}::{}", self.name, identity.unwrap_or_else(|| key.clone()));
        (key, handler_name)
    }
}

/// Builder returned by [`Library::hotkey`].
#[derive(Debug)]
pub struct HotkeyDecorator<'a> {
    library: &'a mut Library,
    keys: Vec<String>,
    name: Option<String>,
}

impl HotkeyDecorator<'_> {
    /// Registers under an explicit logical name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stores the handler and returns it unchanged.
    pub fn decorate<M, F>(self, handler: F) -> F
    where
        F: IntoHotkeyHandler<M> + Clone,
    {
        let (key, handler_name) = self.library.entry_key::<F>(self.name, "hotkey");
        debug!(library = %self.library.name, hotkey = %key, keys = ?self.keys, "Hotkey registered");
        self.library.hotkeys.insert(
            key,
            HotkeyEntry {
                handler: handler.clone().into_hotkey_handler(),
                keys: self.keys,
                handler_name,
            },
        );
        handler
    }
}

/// Builder returned by [`Library::panel`].
#[derive(Debug)]
pub struct PanelDecorator<'a> {
    library: &'a mut Library,
    window_name: String,
    icon: Option<PathBuf>,
    name: Option<String>,
}

impl PanelDecorator<'_> {
    /// Sets the window icon, resolved against the library base directory.
    pub fn icon(mut self, icon: impl AsRef<Path>) -> Self {
        self.icon = Some(self.library.resolve(icon));
        self
    }

    /// Registers under an explicit logical name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stores the handler and returns it unchanged.
    pub fn decorate<M, F>(self, handler: F) -> F
    where
        F: IntoPanelHandler<M> + Clone,
    {
        let (key, handler_name) = self.library.entry_key::<F>(self.name, "panel");
        debug!(library = %self.library.name, panel = %key, window = %self.window_name, "Panel registered");
        self.library.panels.insert(
            key,
            PanelEntry {
                window_name: self.window_name,
                handler: handler.clone().into_panel_handler(),
                icon: self.icon,
                handler_name,
            },
        );
        handler
    }
}

/// Builder returned by [`Library::toolbar`].
#[derive(Debug)]
pub struct ToolbarDecorator<'a> {
    library: &'a mut Library,
    window_name: String,
    button_images: Vec<PathBuf>,
    button_size: Option<ButtonSize>,
    icon: Option<PathBuf>,
    name: Option<String>,
}

impl ToolbarDecorator<'_> {
    /// Sets a uniform button size in pixels.
    pub fn button_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "toolbar button size must be positive");
        self.button_size = Some(ButtonSize::new(width, height));
        self
    }

    /// Sets the window icon, resolved against the library base directory.
    pub fn icon(mut self, icon: impl AsRef<Path>) -> Self {
        self.icon = Some(self.library.resolve(icon));
        self
    }

    /// Registers under an explicit logical name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stores the handler and returns it unchanged.
    pub fn decorate<F>(self, handler: F) -> F
    where
        F: IntoToolbarHandler + Clone,
    {
        let (key, handler_name) = self.library.entry_key::<F>(self.name, "toolbar");
        debug!(
            library = %self.library.name,
            toolbar = %key,
            window = %self.window_name,
            buttons = self.button_images.len(),
            "Toolbar registered"
        );
        self.library.toolbars.insert(
            key,
            ToolbarEntry {
                window_name: self.window_name,
                handler: handler.clone().into_toolbar_handler(),
                button_images: self.button_images,
                button_size: self.button_size,
                icon: self.icon,
                handler_name,
            },
        );
        handler
    }
}

#[cfg(test)]
mod tests {
    use imagerename_core::AppResult;

    use super::*;
    use crate::handler::Command;
    use crate::host::app::App;
    use crate::host::window::{ButtonImage, Window};
    use crate::scheduler::EventJobScheduler;

    fn commit(_app: &mut App) -> AppResult<()> {
        Ok(())
    }

    fn watch(_app: &mut App, _jobs: &mut EventJobScheduler) -> AppResult<()> {
        Ok(())
    }

    fn history(_window: &mut Window) -> AppResult<()> {
        Ok(())
    }

    fn toolbar(
        _app: &mut App,
        _window: &mut Window,
        _images: &[ButtonImage],
        _commands: &mut [Command],
    ) -> AppResult<()> {
        Ok(())
    }

    #[test]
    fn test_hotkey_named_by_identity() {
        let mut lib = Library::new("defaults");
        let returned = lib.hotkey("<Return>").decorate(commit);
        let mut app = App::new(
            Box::new(crate::host::toolkit::HeadlessToolkit::new()),
            Default::default(),
        );
        // The handler comes back callable.
        returned(&mut app).expect("call");

        let entry = &lib.hotkeys()["commit"];
        assert_eq!(entry.keys, vec!["<Return>"]);
        assert_eq!(entry.handler_name, "defaults::commit");
        assert!(!entry.handler.wants_job_table());
    }

    #[test]
    fn test_hotkey_explicit_name_and_key_list() {
        let mut lib = Library::new("defaults");
        lib.hotkey(["<Tab>", "<F5>"]).name("skip").decorate(watch);
        let entry = &lib.hotkeys()["skip"];
        assert_eq!(entry.keys, vec!["<Tab>", "<F5>"]);
        assert!(entry.handler.wants_job_table());
        assert_eq!(entry.handler_name, "defaults::watch");
    }

    #[test]
    fn test_named_closure() {
        let mut lib = Library::new("user");
        lib.hotkey("<F2>")
            .name("noop")
            .decorate(|_app: &mut App| -> AppResult<()> { Ok(()) });
        assert_eq!(lib.hotkeys()["noop"].handler_name, "user::noop");
    }

    #[test]
    #[should_panic(expected = "needs an explicit name")]
    fn test_unnamed_closure_panics() {
        let mut lib = Library::new("user");
        lib.hotkey("<F2>")
            .decorate(|_app: &mut App| -> AppResult<()> { Ok(()) });
    }

    #[test]
    #[should_panic(expected = "at least one key combo")]
    fn test_empty_key_list_panics() {
        let mut lib = Library::new("user");
        lib.hotkey(Vec::<String>::new()).decorate(commit);
    }

    #[test]
    fn test_assets_resolved_against_base_dir() {
        let mut lib = Library::new("user").with_base_dir("/plugins/user");
        lib.panel("History").icon("icon/history.ico").decorate(history);
        lib.toolbar("Tools", ["a.png", "/abs/b.png"])
            .button_size(32, 32)
            .decorate(toolbar);

        assert_eq!(
            lib.panels()["history"].icon,
            Some(PathBuf::from("/plugins/user/icon/history.ico"))
        );
        let entry = &lib.toolbars()["toolbar"];
        assert_eq!(
            entry.button_images,
            vec![PathBuf::from("/plugins/user/a.png"), PathBuf::from("/abs/b.png")]
        );
        assert_eq!(entry.button_size, Some(ButtonSize::new(32, 32)));
        assert_eq!(entry.window_name, "Tools");
    }

    #[test]
    fn test_reregistering_in_same_library_overwrites() {
        let mut lib = Library::new("defaults");
        lib.hotkey("<Return>").decorate(commit);
        lib.hotkey("<space>").decorate(commit);
        assert_eq!(lib.hotkeys().len(), 1);
        assert_eq!(lib.hotkeys()["commit"].keys, vec!["<space>"]);
    }
}
