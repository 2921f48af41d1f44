//! Host-side collaborator interface: the running application, its windows,
//! the toolkit boundary and the interactive session.

pub mod app;
pub mod external;
pub mod session;
pub mod toolkit;
pub mod window;

pub use app::{App, KeyBinding, Subject};
pub use external::ExternalCommand;
pub use session::Session;
pub use toolkit::{HeadlessToolkit, Journal, Toolkit, ToolkitCall};
pub use window::{ButtonImage, ButtonSize, ToolbarButton, Window, WindowId, WindowRegistry, WindowState};
