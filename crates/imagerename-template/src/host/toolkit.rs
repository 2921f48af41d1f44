//! Windowing toolkit boundary.
//!
//! The engine never draws anything itself. Key-binding primitives, window
//! creation and widget layout belong to a [`Toolkit`] implementation owned by
//! the application. [`HeadlessToolkit`] records every call and is used by the
//! terminal host and by tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use imagerename_core::AppResult;
use tracing::debug;

use super::window::{ButtonImage, ButtonSize, WindowId};

/// Operations the engine needs from a windowing toolkit.
pub trait Toolkit: Send + std::fmt::Debug {
    /// Registers a platform key combo with the root window.
    fn bind_key(&mut self, combo: &str);

    /// Creates a top-level window parented to the root window.
    fn open_window(&mut self, id: &WindowId, title: &str, icon: &Path) -> AppResult<()>;

    /// Shows or hides an existing window.
    fn set_visible(&mut self, id: &WindowId, visible: bool);

    /// Tears a window down after its build handler failed.
    fn destroy_window(&mut self, id: &WindowId);

    /// Lays toolbar buttons out in rows of `columns`.
    fn place_buttons(&mut self, id: &WindowId, images: &[ButtonImage], columns: usize);

    /// Natural pixel size of an image, read from its header.
    fn image_size(&self, path: &Path) -> Option<ButtonSize> {
        image::image_dimensions(path)
            .ok()
            .map(|(width, height)| ButtonSize::new(width, height))
    }
}

/// A toolkit call recorded by [`HeadlessToolkit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitCall {
    /// `bind_key`
    BindKey(String),
    /// `open_window`
    OpenWindow {
        /// Window identity.
        id: WindowId,
        /// Applied icon.
        icon: PathBuf,
    },
    /// `set_visible`
    SetVisible {
        /// Window identity.
        id: WindowId,
        /// New visibility.
        visible: bool,
    },
    /// `destroy_window`
    DestroyWindow(WindowId),
    /// `place_buttons`
    PlaceButtons {
        /// Window identity.
        id: WindowId,
        /// Number of buttons placed.
        count: usize,
        /// Buttons per row.
        columns: usize,
    },
}

/// Shared, cloneable view of the calls a [`HeadlessToolkit`] received.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<ToolkitCall>>>,
}

impl Journal {
    fn record(&self, call: ToolkitCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// A snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<ToolkitCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of windows created for `id`.
    pub fn windows_opened(&self, id: &WindowId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ToolkitCall::OpenWindow { id: opened, .. } if opened == id))
            .count()
    }
}

/// A toolkit without a display. Logs and records every call.
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    journal: Journal,
}

impl HeadlessToolkit {
    /// Creates a headless toolkit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the recorded calls that outlives moving the toolkit into an app.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Toolkit for HeadlessToolkit {
    fn bind_key(&mut self, combo: &str) {
        debug!(combo = %combo, "Key bound");
        self.journal.record(ToolkitCall::BindKey(combo.to_string()));
    }

    fn open_window(&mut self, id: &WindowId, title: &str, icon: &Path) -> AppResult<()> {
        debug!(window = %id, title = %title, icon = %icon.display(), "Window opened");
        self.journal.record(ToolkitCall::OpenWindow {
            id: id.clone(),
            icon: icon.to_path_buf(),
        });
        Ok(())
    }

    fn set_visible(&mut self, id: &WindowId, visible: bool) {
        debug!(window = %id, visible, "Window visibility changed");
        self.journal.record(ToolkitCall::SetVisible {
            id: id.clone(),
            visible,
        });
    }

    fn destroy_window(&mut self, id: &WindowId) {
        debug!(window = %id, "Window destroyed");
        self.journal.record(ToolkitCall::DestroyWindow(id.clone()));
    }

    fn place_buttons(&mut self, id: &WindowId, images: &[ButtonImage], columns: usize) {
        debug!(window = %id, buttons = images.len(), columns, "Buttons placed");
        self.journal.record(ToolkitCall::PlaceButtons {
            id: id.clone(),
            count: images.len(),
            columns,
        });
    }
}
