//! Compiled, renderable units.
//!
//! A [`Node`] is produced by the parser and binds itself to a running
//! [`App`] when rendered:
//!
//! - a hotkey node binds each of its key combos,
//! - a panel node opens, re-shows or leaves alone its singleton window,
//! - a toolbar node does the same and wires its buttons on first open.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use imagerename_core::error::AppError;
use imagerename_core::AppResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::panic_message;
use crate::handler::{noop_command, Command, HotkeyHandler, PanelHandler, ToolbarHandler};
use crate::host::app::{App, KeyBinding};
use crate::host::window::{ButtonImage, ButtonSize, ToolbarButton, Window, WindowId, WindowState};

/// Node category. Also the category half of a window identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Key-bound action.
    Hotkey,
    /// Auxiliary window.
    Panel,
    /// Toolbar window.
    Toolbar,
}

impl NodeKind {
    /// Returns the category name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotkey => "hotkey",
            Self::Panel => "panel",
            Self::Toolbar => "toolbar",
        }
    }

    /// Parses a category name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hotkey" => Some(Self::Hotkey),
            "panel" => Some(Self::Panel),
            "toolbar" => Some(Self::Toolbar),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable variant tag, assigned once when a node is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    kind: NodeKind,
}

impl Token {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self { kind }
    }

    /// The tagged category.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// What a single render call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Key combos were bound.
    Bound {
        /// Combos bound, in declaration order.
        combos: Vec<String>,
    },
    /// A new window was created and its handler ran.
    Created,
    /// A hidden window was shown again.
    Shown,
    /// The window was already visible; nothing happened.
    AlreadyVisible,
}

/// Attaches a compiled unit to a running application.
pub trait Render {
    /// Renders into `app`.
    fn render(&self, app: &mut App) -> AppResult<RenderOutcome>;
}

/// A key-bound action.
#[derive(Debug, Clone)]
pub struct HotkeyNode {
    /// Logical hotkey name.
    pub name: String,
    /// The handler.
    pub handler: HotkeyHandler,
    /// Key combos, in declaration order.
    pub keys: Vec<String>,
    /// Whether the handler is called with the job table.
    pub wants_job_table: bool,
}

impl Render for HotkeyNode {
    fn render(&self, app: &mut App) -> AppResult<RenderOutcome> {
        for combo in &self.keys {
            app.bind_key(
                combo,
                KeyBinding {
                    hotkey: self.name.clone(),
                    handler: self.handler.clone(),
                },
            );
        }
        debug!(
            hotkey = %self.name,
            keys = ?self.keys,
            wants_job_table = self.wants_job_table,
            "Hotkey bound"
        );
        Ok(RenderOutcome::Bound {
            combos: self.keys.clone(),
        })
    }
}

/// An auxiliary window.
#[derive(Debug, Clone)]
pub struct PanelNode {
    /// Window title and uniqueness key.
    pub window_name: String,
    /// Builds the window contents on first open.
    pub handler: PanelHandler,
    /// Window icon; the application default is used when absent or missing.
    pub icon: Option<PathBuf>,
}

impl PanelNode {
    /// The singleton identity of this panel's window.
    pub fn window_id(&self) -> WindowId {
        WindowId::panel(&self.window_name)
    }
}

impl Render for PanelNode {
    fn render(&self, app: &mut App) -> AppResult<RenderOutcome> {
        let id = self.window_id();
        if let Some(outcome) = reuse_window(app, &id) {
            return Ok(outcome);
        }

        let mut window = open_window(app, &id, self.icon.as_deref())?;
        if let Err(e) = guard_build(&id, || self.handler.call(&mut window, app)) {
            app.toolkit_mut().destroy_window(&id);
            return Err(e);
        }
        app.insert_window(window);

        info!(window = %id, "Panel created");
        Ok(RenderOutcome::Created)
    }
}

/// A toolbar window.
#[derive(Debug, Clone)]
pub struct ToolbarNode {
    /// Window title and uniqueness key.
    pub window_name: String,
    /// Wires commands into the placeholder buttons.
    pub handler: ToolbarHandler,
    /// Button images, in button order.
    pub button_images: Vec<PathBuf>,
    /// Uniform button size; the natural image size is used when `None`.
    pub button_size: Option<ButtonSize>,
    /// Window icon; the application default is used when absent or missing.
    pub icon: Option<PathBuf>,
}

impl ToolbarNode {
    /// The singleton identity of this toolbar's window.
    pub fn window_id(&self) -> WindowId {
        WindowId::toolbar(&self.window_name)
    }

    fn placeholder_images(&self, app: &App) -> Vec<ButtonImage> {
        self.button_images
            .iter()
            .map(|path| ButtonImage {
                path: path.clone(),
                size: self
                    .button_size
                    .or_else(|| app.toolkit().image_size(path)),
            })
            .collect()
    }
}

impl Render for ToolbarNode {
    fn render(&self, app: &mut App) -> AppResult<RenderOutcome> {
        let id = self.window_id();
        if let Some(outcome) = reuse_window(app, &id) {
            return Ok(outcome);
        }

        let mut window = open_window(app, &id, self.icon.as_deref())?;
        let images = self.placeholder_images(app);
        let mut commands: Vec<Command> = images.iter().map(|_| noop_command()).collect();

        if let Err(e) = guard_build(&id, || {
            self.handler.call(app, &mut window, &images, &mut commands)
        }) {
            app.toolkit_mut().destroy_window(&id);
            return Err(e);
        }

        window.set_buttons(
            images
                .iter()
                .cloned()
                .zip(commands)
                .map(|(image, command)| ToolbarButton { image, command })
                .collect(),
        );
        let columns = window.columns();
        app.toolkit_mut().place_buttons(&id, &images, columns);
        app.insert_window(window);

        info!(window = %id, buttons = images.len(), columns, "Toolbar created");
        Ok(RenderOutcome::Created)
    }
}

/// Runs a window build handler, turning a panic into a render error.
fn guard_build(id: &WindowId, build: impl FnOnce() -> AppResult<()>) -> AppResult<()> {
    panic::catch_unwind(AssertUnwindSafe(build)).unwrap_or_else(|payload| {
        Err(AppError::render(format!(
            "Handler for window '{id}' panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

/// Shows a hidden window or reports a visible one. `None` when absent.
fn reuse_window(app: &mut App, id: &WindowId) -> Option<RenderOutcome> {
    match app.window_state(id) {
        WindowState::Visible => {
            debug!(window = %id, "Window already visible");
            Some(RenderOutcome::AlreadyVisible)
        }
        WindowState::Hidden => {
            app.show_window(id);
            debug!(window = %id, "Hidden window shown");
            Some(RenderOutcome::Shown)
        }
        WindowState::Absent => None,
    }
}

fn open_window(app: &mut App, id: &WindowId, icon: Option<&std::path::Path>) -> AppResult<Window> {
    let icon = app.resolve_icon(icon);
    app.toolkit_mut().open_window(id, id.name(), &icon)?;
    Ok(Window::new(id.clone(), icon))
}

/// The variant body of a node.
#[derive(Debug, Clone)]
pub enum NodeBody {
    /// See [`HotkeyNode`].
    Hotkey(HotkeyNode),
    /// See [`PanelNode`].
    Panel(PanelNode),
    /// See [`ToolbarNode`].
    Toolbar(ToolbarNode),
}

impl NodeBody {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Hotkey(_) => NodeKind::Hotkey,
            Self::Panel(_) => NodeKind::Panel,
            Self::Toolbar(_) => NodeKind::Toolbar,
        }
    }
}

/// A compiled unit with its variant token.
#[derive(Debug, Clone)]
pub struct Node {
    token: Token,
    body: NodeBody,
}

impl Node {
    pub(crate) fn compile(body: NodeBody) -> Self {
        Self {
            token: Token::new(body.kind()),
            body,
        }
    }

    /// The variant token.
    pub fn token(&self) -> Token {
        self.token
    }

    /// The node category.
    pub fn kind(&self) -> NodeKind {
        self.token.kind()
    }

    /// The variant body.
    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Logical name: hotkey name or window name.
    pub fn name(&self) -> &str {
        match &self.body {
            NodeBody::Hotkey(node) => &node.name,
            NodeBody::Panel(node) => &node.window_name,
            NodeBody::Toolbar(node) => &node.window_name,
        }
    }
}

impl Render for Node {
    fn render(&self, app: &mut App) -> AppResult<RenderOutcome> {
        match &self.body {
            NodeBody::Hotkey(node) => node.render(app),
            NodeBody::Panel(node) => node.render(app),
            NodeBody::Toolbar(node) => node.render(app),
        }
    }
}

/// A node that failed to render.
#[derive(Debug)]
pub struct RenderFailure {
    /// Node category.
    pub kind: NodeKind,
    /// Node name.
    pub name: String,
    /// The handler or toolkit error.
    pub error: AppError,
}

/// Result of one render pass.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Nodes rendered successfully, in render order.
    pub outcomes: Vec<(NodeKind, String, RenderOutcome)>,
    /// Nodes whose render failed.
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    /// Whether every rendered node succeeded.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of nodes that created a new window.
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, _, outcome)| *outcome == RenderOutcome::Created)
            .count()
    }
}

/// Ordered list of compiled nodes: hotkeys, then panels, then toolbars.
#[derive(Debug, Clone, Default)]
pub struct NodeList {
    nodes: Vec<Node>,
}

impl NodeList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Iterates nodes in render order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders every node, or only those of `filter`'s category.
    ///
    /// A failing node is logged and skipped; the pass continues.
    pub fn render(&self, app: &mut App, filter: Option<NodeKind>) -> RenderReport {
        let mut report = RenderReport::default();
        for node in self
            .nodes
            .iter()
            .filter(|node| filter.is_none_or(|kind| node.kind() == kind))
        {
            match node.render(app) {
                Ok(outcome) => {
                    report
                        .outcomes
                        .push((node.kind(), node.name().to_string(), outcome));
                }
                Err(e) => {
                    error!(
                        category = %node.kind(),
                        name = %node.name(),
                        error = %e,
                        "Node render failed"
                    );
                    report.failures.push(RenderFailure {
                        kind: node.kind(),
                        name: node.name().to_string(),
                        error: e,
                    });
                }
            }
        }
        report
    }
}
