//! The running application that nodes render into.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::Arc;

use imagerename_core::config::viewer::ViewerConfig;
use imagerename_core::{AppError, AppResult, Event};
use tracing::{debug, warn};

use super::toolkit::Toolkit;
use super::window::{Window, WindowId, WindowRegistry, WindowState};
use crate::handler::HotkeyHandler;
use crate::node::{NodeKind, RenderReport};
use crate::template::Template;

/// The image currently shown, plus the walk through the image list.
#[derive(Debug, Clone, Default)]
pub struct Subject {
    images: Vec<PathBuf>,
    cursor: usize,
    previous: Option<PathBuf>,
    changed: bool,
}

impl Subject {
    /// Creates a subject walking `images` in order. The first image counts as a change.
    pub fn new(images: Vec<PathBuf>) -> Self {
        let changed = !images.is_empty();
        Self {
            images,
            cursor: 0,
            previous: None,
            changed,
        }
    }

    /// The current image, or `None` once every image was handled.
    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.cursor).map(PathBuf::as_path)
    }

    /// The image shown before the current one.
    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// Zero-based index of the current image.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the image list is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether every image was handled.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.images.len()
    }

    /// Moves to the next image and returns it.
    pub fn advance(&mut self) -> Option<&Path> {
        if self.is_finished() {
            return None;
        }
        self.previous = self.images.get(self.cursor).cloned();
        self.cursor += 1;
        self.changed = true;
        self.current()
    }

    /// Replaces the path of the current image, e.g. after it was renamed.
    pub fn replace_current(&mut self, path: PathBuf) {
        if let Some(slot) = self.images.get_mut(self.cursor) {
            *slot = path;
        }
    }

    /// Returns whether the subject changed since the last call, and clears the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

/// A key combo bound to a hotkey handler.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// Logical hotkey name.
    pub hotkey: String,
    /// The handler, called with the convention it was registered with.
    pub handler: HotkeyHandler,
}

/// The running application instance.
///
/// Owns the toolkit, every singleton window, the key bindings and the
/// current subject. Handlers receive it by mutable reference.
pub struct App {
    toolkit: Box<dyn Toolkit>,
    windows: WindowRegistry,
    bindings: HashMap<String, KeyBinding>,
    subject: Subject,
    default_icon: PathBuf,
    editor: String,
    template: Option<Arc<Template>>,
    children: Vec<Child>,
}

impl App {
    /// Creates an application around a toolkit and a subject.
    pub fn new(toolkit: Box<dyn Toolkit>, subject: Subject) -> Self {
        let viewer = ViewerConfig::default();
        Self {
            toolkit,
            windows: WindowRegistry::new(),
            bindings: HashMap::new(),
            subject,
            default_icon: PathBuf::from(viewer.default_icon),
            editor: viewer.editor,
            template: None,
            children: Vec::new(),
        }
    }

    /// Creates an application configured from the viewer settings.
    pub fn from_config(toolkit: Box<dyn Toolkit>, config: &ViewerConfig, images: Vec<PathBuf>) -> Self {
        Self::new(toolkit, Subject::new(images))
            .with_default_icon(&config.default_icon)
            .with_editor(&config.editor)
    }

    /// Sets the icon used when a window has none or an unreadable one.
    pub fn with_default_icon(mut self, icon: impl Into<PathBuf>) -> Self {
        self.default_icon = icon.into();
        self
    }

    /// Sets the external editor program.
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    /// The current subject.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The current subject, mutably.
    pub fn subject_mut(&mut self) -> &mut Subject {
        &mut self.subject
    }

    /// The application default icon.
    pub fn default_icon(&self) -> &Path {
        &self.default_icon
    }

    /// The external editor program.
    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// Picks the icon for a new window, falling back to the default icon.
    pub fn resolve_icon(&self, icon: Option<&Path>) -> PathBuf {
        match icon {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                warn!(
                    icon = %path.display(),
                    fallback = %self.default_icon.display(),
                    "Icon not found, using application default"
                );
                self.default_icon.clone()
            }
            None => self.default_icon.clone(),
        }
    }

    /// The toolkit.
    pub fn toolkit(&self) -> &dyn Toolkit {
        self.toolkit.as_ref()
    }

    /// The toolkit, mutably.
    pub fn toolkit_mut(&mut self) -> &mut dyn Toolkit {
        self.toolkit.as_mut()
    }

    /// Binds a key combo. Rebinding the same combo overwrites the previous binding.
    pub fn bind_key(&mut self, combo: &str, binding: KeyBinding) {
        self.toolkit.bind_key(combo);
        if let Some(old) = self.bindings.insert(combo.to_string(), binding) {
            debug!(combo = %combo, previous = %old.hotkey, "Key combo rebound");
        }
    }

    /// The binding for a key combo.
    pub fn binding(&self, combo: &str) -> Option<&KeyBinding> {
        self.bindings.get(combo)
    }

    /// Bound key combos, sorted.
    pub fn bound_combos(&self) -> Vec<&str> {
        let mut combos: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        combos.sort_unstable();
        combos
    }

    /// All windows.
    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    /// All windows, mutably.
    pub fn windows_mut(&mut self) -> &mut WindowRegistry {
        &mut self.windows
    }

    pub(crate) fn insert_window(&mut self, window: Window) {
        self.windows.insert(window);
    }

    /// Shows a hidden window. Returns `false` when no such window exists.
    pub fn show_window(&mut self, id: &WindowId) -> bool {
        self.set_window_visible(id, true)
    }

    /// Hides a window, as when the user closes it. The window and its
    /// contents are kept so a later render shows them again.
    pub fn hide_window(&mut self, id: &WindowId) -> bool {
        self.set_window_visible(id, false)
    }

    fn set_window_visible(&mut self, id: &WindowId, visible: bool) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        if window.is_visible() != visible {
            window.set_visible(visible);
            self.toolkit.set_visible(id, visible);
        }
        true
    }

    /// The lifecycle state of a window.
    pub fn window_state(&self, id: &WindowId) -> WindowState {
        self.windows.state(id)
    }

    /// Runs the command of a toolbar button.
    pub fn click(&mut self, id: &WindowId, index: usize) -> AppResult<()> {
        let command = self
            .windows
            .get(id)
            .and_then(|window| window.buttons().get(index))
            .map(|button| button.command.clone())
            .ok_or_else(|| AppError::not_found(format!("No button {index} on window '{id}'")))?;
        command(self)
    }

    /// Forwards a semantic event to every window view, hidden ones included.
    pub fn broadcast(&mut self, event: Event) {
        let subject = &self.subject;
        for window in self.windows.iter_mut() {
            if let Some(view) = window.view_mut() {
                view.update(event, subject);
            }
        }
    }

    pub(crate) fn track_child(&mut self, child: Child) {
        debug!(pid = child.id(), "Background program started");
        self.children.push(child);
    }

    /// Background programs not yet known to have exited.
    pub fn background_programs(&self) -> usize {
        self.children.len()
    }

    /// Reaps background programs that exited. Returns how many still run.
    pub fn reap_children(&mut self) -> usize {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), status = %status, "Background program exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "Cannot poll background program");
                false
            }
        });
        self.children.len()
    }

    /// Binds a compiled template to this application instance.
    pub fn set_template(&mut self, template: Arc<Template>) {
        self.template = Some(template);
    }

    /// The bound template.
    pub fn template(&self) -> Option<&Arc<Template>> {
        self.template.as_ref()
    }

    /// Renders the bound template, optionally only nodes of one kind.
    ///
    /// `render(Some(NodeKind::Panel))` reopens every panel without
    /// re-binding hotkeys or rebuilding toolbars.
    pub fn render(&mut self, filter: Option<NodeKind>) -> RenderReport {
        match self.template.clone() {
            Some(template) => template.render(self, filter),
            None => {
                warn!("Render requested before a template was bound");
                RenderReport::default()
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("toolkit", &self.toolkit)
            .field("windows", &self.windows.len())
            .field("bindings", &self.bindings.len())
            .field("subject", &self.subject)
            .field("default_icon", &self.default_icon)
            .field("editor", &self.editor)
            .field("has_template", &self.template.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::toolkit::{HeadlessToolkit, ToolkitCall};

    fn images() -> Vec<PathBuf> {
        vec![PathBuf::from("a.png"), PathBuf::from("b.png")]
    }

    #[test]
    fn test_subject_walk() {
        let mut subject = Subject::new(images());
        assert!(subject.take_changed());
        assert!(!subject.take_changed());
        assert_eq!(subject.current(), Some(Path::new("a.png")));

        assert_eq!(subject.advance(), Some(Path::new("b.png")));
        assert_eq!(subject.previous(), Some(Path::new("a.png")));
        assert!(subject.take_changed());

        assert_eq!(subject.advance(), None);
        assert!(subject.is_finished());
        assert_eq!(subject.advance(), None);
        assert_eq!(subject.previous(), Some(Path::new("b.png")));
    }

    #[test]
    fn test_empty_subject_is_finished() {
        let mut subject = Subject::new(Vec::new());
        assert!(subject.is_finished());
        assert!(!subject.take_changed());
    }

    #[test]
    fn test_missing_icon_falls_back() {
        let app = App::new(Box::new(HeadlessToolkit::new()), Subject::default())
            .with_default_icon("default.ico");
        assert_eq!(
            app.resolve_icon(Some(Path::new("/nonexistent/icon.ico"))),
            PathBuf::from("default.ico")
        );
        assert_eq!(app.resolve_icon(None), PathBuf::from("default.ico"));
    }

    #[test]
    fn test_hide_and_show_unknown_window() {
        let toolkit = HeadlessToolkit::new();
        let journal = toolkit.journal();
        let mut app = App::new(Box::new(toolkit), Subject::default());
        let id = WindowId::panel("History");
        assert!(!app.hide_window(&id));

        app.insert_window(Window::new(id.clone(), PathBuf::new()));
        assert!(app.hide_window(&id));
        assert_eq!(app.window_state(&id), WindowState::Hidden);
        assert!(app.show_window(&id));
        assert_eq!(app.window_state(&id), WindowState::Visible);
        assert_eq!(
            journal.calls(),
            vec![
                ToolkitCall::SetVisible { id: id.clone(), visible: false },
                ToolkitCall::SetVisible { id, visible: true },
            ]
        );
    }

    #[test]
    fn test_click_unknown_button_is_not_found() {
        let mut app = App::new(Box::new(HeadlessToolkit::new()), Subject::default());
        let err = app.click(&WindowId::toolbar("Nope"), 0).unwrap_err();
        assert_eq!(err.kind, imagerename_core::error::ErrorKind::NotFound);
    }
}
