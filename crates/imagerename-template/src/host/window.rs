//! Singleton windows opened by panel and toolbar nodes.
//!
//! Every window is keyed by a [`WindowId`] made of its category and window
//! name, so at most one live window exists per (category, name) pair.
//! Closing a window only hides it; its contents stay in the registry.

use std::any::Any;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::handler::Command;
use crate::node::NodeKind;
use crate::views::PanelView;

/// Category-scoped, stable identity of a singleton window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    kind: NodeKind,
    name: String,
}

impl WindowId {
    /// Identity of a panel window.
    pub fn panel(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Panel,
            name: name.into(),
        }
    }

    /// Identity of a toolbar window.
    pub fn toolbar(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Toolbar,
            name: name.into(),
        }
    }

    /// Parses `panel:<name>` or `toolbar:<name>`.
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, name) = value.split_once(':')?;
        match kind {
            "panel" => Some(Self::panel(name)),
            "toolbar" => Some(Self::toolbar(name)),
            _ => None,
        }
    }

    /// The window category.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The window name (also its title).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Lifecycle state of a singleton window as seen by a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No window exists yet.
    Absent,
    /// The window exists but was closed by the user.
    Hidden,
    /// The window is on screen.
    Visible,
}

/// Uniform size of toolbar buttons, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ButtonSize {
    /// Creates a button size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A placeholder button image, sized before the toolbar handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonImage {
    /// Image file path.
    pub path: PathBuf,
    /// Requested size, or the natural image size; `None` when unreadable.
    pub size: Option<ButtonSize>,
}

/// A wired toolbar button.
#[derive(Clone)]
pub struct ToolbarButton {
    /// The button image.
    pub image: ButtonImage,
    /// Command run on click.
    pub command: Command,
}

impl std::fmt::Debug for ToolbarButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolbarButton")
            .field("image", &self.image)
            .field("command", &"<fn>")
            .finish()
    }
}

/// A top-level window owned by the application.
pub struct Window {
    id: WindowId,
    icon: PathBuf,
    visible: bool,
    view: Option<Box<dyn PanelView>>,
    buttons: Vec<ToolbarButton>,
    columns: usize,
}

impl Window {
    /// Creates a new, not yet registered window.
    pub fn new(id: WindowId, icon: PathBuf) -> Self {
        Self {
            id,
            icon,
            visible: true,
            view: None,
            buttons: Vec::new(),
            columns: 1,
        }
    }

    /// The window identity.
    pub fn id(&self) -> &WindowId {
        &self.id
    }

    /// The window title.
    pub fn title(&self) -> &str {
        self.id.name()
    }

    /// The applied icon.
    pub fn icon(&self) -> &Path {
        &self.icon
    }

    /// Whether the window is on screen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Attaches the content view that receives semantic events.
    pub fn set_view(&mut self, view: Box<dyn PanelView>) {
        self.view = Some(view);
    }

    /// The attached content view.
    pub fn view(&self) -> Option<&dyn PanelView> {
        self.view.as_deref()
    }

    /// The attached content view, mutably.
    pub fn view_mut(&mut self) -> Option<&mut (dyn PanelView + 'static)> {
        self.view.as_deref_mut()
    }

    /// Downcasts the attached view to a concrete type.
    pub fn view_as<T: Any>(&self) -> Option<&T> {
        self.view().and_then(|view| view.as_any().downcast_ref::<T>())
    }

    /// Toolbar buttons, in image-list order.
    pub fn buttons(&self) -> &[ToolbarButton] {
        &self.buttons
    }

    pub(crate) fn set_buttons(&mut self, buttons: Vec<ToolbarButton>) {
        self.buttons = buttons;
    }

    /// Buttons per row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Sets the number of buttons per row.
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("icon", &self.icon)
            .field("visible", &self.visible)
            .field("has_view", &self.view.is_some())
            .field("buttons", &self.buttons.len())
            .field("columns", &self.columns)
            .finish()
    }
}

/// All windows opened during the application's lifetime.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: IndexMap<WindowId, Window>,
}

impl WindowRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the lifecycle state of a window.
    pub fn state(&self, id: &WindowId) -> WindowState {
        match self.windows.get(id) {
            None => WindowState::Absent,
            Some(window) if window.is_visible() => WindowState::Visible,
            Some(_) => WindowState::Hidden,
        }
    }

    /// Gets a window by identity.
    pub fn get(&self, id: &WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    /// Gets a window by identity, mutably.
    pub fn get_mut(&mut self, id: &WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    /// Registers a window. An existing window under the same identity is replaced.
    pub(crate) fn insert(&mut self, window: Window) {
        self.windows.insert(window.id().clone(), window);
    }

    /// Iterates windows in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    /// Iterates windows in creation order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Window> {
        self.windows.values_mut()
    }

    /// Number of live windows (visible or hidden).
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no window was opened yet.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_category_scoped() {
        assert_ne!(WindowId::panel("Tools"), WindowId::toolbar("Tools"));
        assert_eq!(WindowId::panel("History").to_string(), "panel:History");
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!(
            WindowId::parse("toolbar:My Toolbar"),
            Some(WindowId::toolbar("My Toolbar"))
        );
        assert_eq!(WindowId::parse("hotkey:x"), None);
        assert_eq!(WindowId::parse("History"), None);
    }

    #[test]
    fn test_registry_states() {
        let mut registry = WindowRegistry::new();
        let id = WindowId::panel("History");
        assert_eq!(registry.state(&id), WindowState::Absent);

        registry.insert(Window::new(id.clone(), PathBuf::from("main.ico")));
        assert_eq!(registry.state(&id), WindowState::Visible);

        registry.get_mut(&id).expect("window").set_visible(false);
        assert_eq!(registry.state(&id), WindowState::Hidden);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_columns_never_zero() {
        let mut window = Window::new(WindowId::toolbar("T"), PathBuf::new());
        window.set_columns(0);
        assert_eq!(window.columns(), 1);
    }
}
