//! Prelude for plugin authors.

pub use imagerename_core::{AppError, AppResult, Event};

pub use crate::handler::Command;
pub use crate::host::app::{App, Subject};
pub use crate::host::external::ExternalCommand;
pub use crate::host::window::{ButtonImage, Window};
pub use crate::library::Library;
pub use crate::node::NodeKind;
pub use crate::scheduler::{EventJobScheduler, Lifecycle};
pub use crate::views::{PanelView, ScrollableView, TabularView};
