//! # imagerename-template
//!
//! Plugin engine for ImageRename. Provides:
//!
//! - Per-plugin registration namespaces (`Library`) with decorator builders
//! - Plugin loading from builtins, TOML manifests and shared libraries
//! - Last-writer-wins merging with conflict warnings
//! - Compiled hotkey, panel and toolbar nodes with singleton windows
//! - A priority-ordered event job scheduler driven by semantic events

pub mod engine;
pub mod error;
pub mod handler;
pub mod host;
pub mod library;
pub mod loader;
pub mod manifest;
pub mod node;
pub mod parser;
pub mod plugins;
pub mod prelude;
pub mod scheduler;
pub mod template;
pub mod views;

pub use engine::{Engine, PluginLocation, StaticPlugin};
pub use error::TemplateError;
pub use host::{App, HeadlessToolkit, Session, Subject, Toolkit, Window, WindowId};
pub use library::Library;
pub use node::{NodeKind, NodeList, RenderReport};
pub use parser::{ConflictWarning, Parser};
pub use scheduler::{DispatchReport, EventJobScheduler, Lifecycle};
pub use template::Template;
