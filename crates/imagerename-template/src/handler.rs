//! Handler calling conventions.
//!
//! Plugin handlers come in a few shapes. A hotkey handler either takes only
//! the running [`App`] or also the [`EventJobScheduler`]; a panel handler
//! either takes only its new [`Window`] or also the [`App`]. The shape is
//! fixed when the handler is registered, through marker-typed conversion
//! traits, so the compiled nodes know which convention to call without any
//! runtime inspection.

use std::sync::Arc;

use imagerename_core::AppResult;

use crate::host::app::App;
use crate::host::window::{ButtonImage, Window};
use crate::scheduler::EventJobScheduler;

/// Hotkey handler taking the running application.
pub type HotkeyFn = dyn Fn(&mut App) -> AppResult<()> + Send + Sync;

/// Hotkey handler taking the running application and the job table.
pub type HotkeyJobsFn = dyn Fn(&mut App, &mut EventJobScheduler) -> AppResult<()> + Send + Sync;

/// Panel handler taking only its window.
pub type PanelFn = dyn Fn(&mut Window) -> AppResult<()> + Send + Sync;

/// Panel handler taking its window and the running application.
pub type PanelAppFn = dyn Fn(&mut Window, &mut App) -> AppResult<()> + Send + Sync;

/// Toolbar handler: wires commands into placeholder buttons and lays them out.
pub type ToolbarFn =
    dyn Fn(&mut App, &mut Window, &[ButtonImage], &mut [Command]) -> AppResult<()> + Send + Sync;

/// A toolbar button command.
pub type Command = Arc<dyn Fn(&mut App) -> AppResult<()> + Send + Sync>;

/// Returns a command that does nothing, used as a button placeholder.
pub fn noop_command() -> Command {
    Arc::new(|_app: &mut App| Ok(()))
}

/// A registered hotkey handler with its calling convention.
#[derive(Clone)]
pub enum HotkeyHandler {
    /// Called as `handler(app)`.
    App(Arc<HotkeyFn>),
    /// Called as `handler(app, jobs)`.
    WithJobs(Arc<HotkeyJobsFn>),
}

impl HotkeyHandler {
    /// Whether the handler accepts the job table as a second parameter.
    pub fn wants_job_table(&self) -> bool {
        matches!(self, Self::WithJobs(_))
    }

    /// Invokes the handler with the convention it was registered with.
    pub fn call(&self, app: &mut App, jobs: &mut EventJobScheduler) -> AppResult<()> {
        match self {
            Self::App(handler) => handler(app),
            Self::WithJobs(handler) => handler(app, jobs),
        }
    }
}

impl std::fmt::Debug for HotkeyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::App(_) => f.write_str("HotkeyHandler::App(<fn>)"),
            Self::WithJobs(_) => f.write_str("HotkeyHandler::WithJobs(<fn>)"),
        }
    }
}

/// A registered panel handler with its calling convention.
#[derive(Clone)]
pub enum PanelHandler {
    /// Called as `handler(window)`.
    Window(Arc<PanelFn>),
    /// Called as `handler(window, app)`.
    WindowWithApp(Arc<PanelAppFn>),
}

impl PanelHandler {
    /// Whether the handler accepts the application as a second parameter.
    pub fn wants_app(&self) -> bool {
        matches!(self, Self::WindowWithApp(_))
    }

    /// Invokes the handler with the convention it was registered with.
    pub fn call(&self, window: &mut Window, app: &mut App) -> AppResult<()> {
        match self {
            Self::Window(handler) => handler(window),
            Self::WindowWithApp(handler) => handler(window, app),
        }
    }
}

impl std::fmt::Debug for PanelHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Window(_) => f.write_str("PanelHandler::Window(<fn>)"),
            Self::WindowWithApp(_) => f.write_str("PanelHandler::WindowWithApp(<fn>)"),
        }
    }
}

/// A registered toolbar handler.
#[derive(Clone)]
pub struct ToolbarHandler(Arc<ToolbarFn>);

impl ToolbarHandler {
    /// Invokes the handler.
    pub fn call(
        &self,
        app: &mut App,
        window: &mut Window,
        images: &[ButtonImage],
        commands: &mut [Command],
    ) -> AppResult<()> {
        (self.0)(app, window, images, commands)
    }
}

impl std::fmt::Debug for ToolbarHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ToolbarHandler(<fn>)")
    }
}

/// Marker: hotkey handler taking `&mut App`.
#[derive(Debug)]
pub struct AppOnly;

/// Marker: hotkey handler taking `&mut App` and `&mut EventJobScheduler`.
#[derive(Debug)]
pub struct AppAndJobs;

/// Marker: panel handler taking `&mut Window`.
#[derive(Debug)]
pub struct WindowOnly;

/// Marker: panel handler taking `&mut Window` and `&mut App`.
#[derive(Debug)]
pub struct WindowAndApp;

/// Marker: an already converted handler.
#[derive(Debug)]
pub struct Converted;

/// Conversion into a [`HotkeyHandler`].
pub trait IntoHotkeyHandler<Marker> {
    /// Performs the conversion.
    fn into_hotkey_handler(self) -> HotkeyHandler;
}

impl<F> IntoHotkeyHandler<AppOnly> for F
where
    F: Fn(&mut App) -> AppResult<()> + Send + Sync + 'static,
{
    fn into_hotkey_handler(self) -> HotkeyHandler {
        HotkeyHandler::App(Arc::new(self))
    }
}

impl<F> IntoHotkeyHandler<AppAndJobs> for F
where
    F: Fn(&mut App, &mut EventJobScheduler) -> AppResult<()> + Send + Sync + 'static,
{
    fn into_hotkey_handler(self) -> HotkeyHandler {
        HotkeyHandler::WithJobs(Arc::new(self))
    }
}

impl IntoHotkeyHandler<Converted> for HotkeyHandler {
    fn into_hotkey_handler(self) -> HotkeyHandler {
        self
    }
}

/// Conversion into a [`PanelHandler`].
pub trait IntoPanelHandler<Marker> {
    /// Performs the conversion.
    fn into_panel_handler(self) -> PanelHandler;
}

impl<F> IntoPanelHandler<WindowOnly> for F
where
    F: Fn(&mut Window) -> AppResult<()> + Send + Sync + 'static,
{
    fn into_panel_handler(self) -> PanelHandler {
        PanelHandler::Window(Arc::new(self))
    }
}

impl<F> IntoPanelHandler<WindowAndApp> for F
where
    F: Fn(&mut Window, &mut App) -> AppResult<()> + Send + Sync + 'static,
{
    fn into_panel_handler(self) -> PanelHandler {
        PanelHandler::WindowWithApp(Arc::new(self))
    }
}

/// Conversion into a [`ToolbarHandler`].
pub trait IntoToolbarHandler {
    /// Performs the conversion.
    fn into_toolbar_handler(self) -> ToolbarHandler;
}

impl<F> IntoToolbarHandler for F
where
    F: Fn(&mut App, &mut Window, &[ButtonImage], &mut [Command]) -> AppResult<()>
        + Send
        + Sync
        + 'static,
{
    fn into_toolbar_handler(self) -> ToolbarHandler {
        ToolbarHandler(Arc::new(self))
    }
}

/// Derives a handler's identity from its Rust type name.
///
/// For a function item such as `plugins::default_hotkeys::show_path` this is
/// `show_path`. Closures have no identity of their own and yield `None`.
pub fn handler_identity<F>() -> Option<String> {
    let type_name = std::any::type_name::<F>();
    if type_name.contains("{{closure}}") {
        return None;
    }
    type_name
        .rsplit("::")
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(_app: &mut App) -> AppResult<()> {
        Ok(())
    }

    fn with_jobs(_app: &mut App, _jobs: &mut EventJobScheduler) -> AppResult<()> {
        Ok(())
    }

    fn identity_of<F>(_f: &F) -> Option<String> {
        handler_identity::<F>()
    }

    #[test]
    fn test_convention_is_fixed_by_signature() {
        assert!(!plain.into_hotkey_handler().wants_job_table());
        assert!(with_jobs.into_hotkey_handler().wants_job_table());
    }

    #[test]
    fn test_panel_convention() {
        let window_only = |_w: &mut Window| -> AppResult<()> { Ok(()) };
        let with_app = |_w: &mut Window, _a: &mut App| -> AppResult<()> { Ok(()) };
        assert!(!window_only.into_panel_handler().wants_app());
        assert!(with_app.into_panel_handler().wants_app());
    }

    #[test]
    fn test_identity_of_function_item() {
        assert_eq!(identity_of(&plain), Some("plain".to_string()));
        assert_eq!(identity_of(&with_jobs), Some("with_jobs".to_string()));
    }

    #[test]
    fn test_closure_has_no_identity() {
        let closure = |_app: &mut App| -> AppResult<()> { Ok(()) };
        assert_eq!(identity_of(&closure), None);
    }
}
