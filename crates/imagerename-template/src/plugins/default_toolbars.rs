//! Default toolbar.

use std::sync::Arc;

use imagerename_core::AppResult;
use tracing::info;

use crate::handler::Command;
use crate::host::app::App;
use crate::host::external::{ExternalCommand, SUBJECT_PLACEHOLDER};
use crate::host::window::{ButtonImage, Window};
use crate::library::Library;
use crate::node::NodeKind;

/// Window title of the default toolbar.
pub const TOOLBAR_WINDOW: &str = "My Toolbar";

/// Buttons per row.
pub const BUTTONS_PER_ROW: usize = 2;

/// Registers the default toolbar.
pub fn register(lib: &mut Library) {
    lib.toolbar(
        TOOLBAR_WINDOW,
        ["icon/paint.png", "icon/panel.png", "icon/info.png"],
    )
    .button_size(48, 48)
    .icon("icon/toolbar.ico")
    .decorate(main_toolbar);
}

/// Wires the editor, reopen-panels and version buttons.
pub fn main_toolbar(
    _app: &mut App,
    window: &mut Window,
    _images: &[ButtonImage],
    commands: &mut [Command],
) -> AppResult<()> {
    let wiring: [Command; 3] = [
        Arc::new(edit_and_wait),
        Arc::new(reopen_panels),
        Arc::new(show_version),
    ];
    for (slot, command) in commands.iter_mut().zip(wiring) {
        *slot = command;
    }
    window.set_columns(BUTTONS_PER_ROW);
    Ok(())
}

/// Opens the current image in the editor and waits for it to close.
fn edit_and_wait(app: &mut App) -> AppResult<()> {
    if app.subject().current().is_none() {
        return Ok(());
    }
    let command = ExternalCommand::new(
        vec![app.editor().to_string(), SUBJECT_PLACEHOLDER.to_string()],
        true,
    )?;
    command.run(app)?;
    info!(image = ?app.subject().current(), "Editor closed");
    Ok(())
}

/// Shows every panel again, creating the ones that never opened.
fn reopen_panels(app: &mut App) -> AppResult<()> {
    let report = app.render(Some(NodeKind::Panel));
    info!(panels = report.outcomes.len(), failed = report.failures.len(), "Panels reopened");
    Ok(())
}

fn show_version(_app: &mut App) -> AppResult<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "ImageRename");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_register_resolves_assets() {
        let mut lib = Library::new("default_toolbars").with_base_dir("/opt/imagerename/assets");
        register(&mut lib);
        let entry = &lib.toolbars()["main_toolbar"];
        assert_eq!(entry.window_name, TOOLBAR_WINDOW);
        assert_eq!(entry.button_images.len(), 3);
        assert_eq!(
            entry.button_images[0],
            PathBuf::from("/opt/imagerename/assets/icon/paint.png")
        );
        assert_eq!(
            entry.icon,
            Some(PathBuf::from("/opt/imagerename/assets/icon/toolbar.ico"))
        );
    }
}
