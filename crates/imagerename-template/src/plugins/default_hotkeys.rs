//! Default key bindings.

use imagerename_core::{AppResult, Event};
use tracing::info;

use crate::host::app::App;
use crate::host::external::{ExternalCommand, SUBJECT_PLACEHOLDER};
use crate::library::Library;
use crate::scheduler::{EventJobScheduler, Lifecycle};

/// Job installed by [`watch_subject`].
pub const WATCH_JOB: &str = "watch_subject";

/// Registers the default hotkeys.
pub fn register(lib: &mut Library) {
    lib.hotkey("<Return>").decorate(commit);
    lib.hotkey(["<Tab>", "<F5>"]).decorate(skip);
    lib.hotkey("]").decorate(show_path);
    lib.hotkey(["<Alt-P>", "<Alt-p>"]).decorate(open_in_editor);
    lib.hotkey("<F9>").decorate(watch_subject);
}

/// Accepts the current image and moves on.
pub fn commit(app: &mut App) -> AppResult<()> {
    let subject = app.subject_mut();
    let Some(done) = subject.current().map(|path| path.display().to_string()) else {
        return Ok(());
    };
    let next = subject.advance().map(|path| path.display().to_string());
    info!(image = %done, next = ?next, "Image committed");
    Ok(())
}

/// Leaves the current image as is and moves on.
pub fn skip(app: &mut App) -> AppResult<()> {
    let subject = app.subject_mut();
    let Some(skipped) = subject.current().map(|path| path.display().to_string()) else {
        return Ok(());
    };
    subject.advance();
    info!(image = %skipped, "Image skipped");
    Ok(())
}

/// Logs the current and previous image paths.
pub fn show_path(app: &mut App) -> AppResult<()> {
    let subject = app.subject();
    info!(
        current = ?subject.current(),
        previous = ?subject.previous(),
        position = subject.position(),
        total = subject.len(),
        "Subject"
    );
    Ok(())
}

/// Opens the current image in the configured editor without waiting.
pub fn open_in_editor(app: &mut App) -> AppResult<()> {
    if app.subject().current().is_none() {
        return Ok(());
    }
    let command = ExternalCommand::new(
        vec![app.editor().to_string(), SUBJECT_PLACEHOLDER.to_string()],
        false,
    )?;
    command.run(app)
}

/// Toggles a job logging every new image.
pub fn watch_subject(_app: &mut App, jobs: &mut EventJobScheduler) -> AppResult<()> {
    if jobs.remove(WATCH_JOB) {
        info!("Stopped watching the subject");
        return Ok(());
    }
    jobs.install(
        WATCH_JOB,
        0,
        Event::ImgChange,
        Lifecycle::Forever,
        |app: &mut App, _: &mut EventJobScheduler| {
            info!(image = ?app.subject().current(), "Subject changed");
            Ok(())
        },
    );
    info!("Watching the subject");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::host::app::Subject;
    use crate::host::toolkit::HeadlessToolkit;

    fn app(images: &[&str]) -> App {
        App::new(
            Box::new(HeadlessToolkit::new()),
            Subject::new(images.iter().map(|image| PathBuf::from(*image)).collect()),
        )
    }

    #[test]
    fn test_register_declares_every_hotkey() {
        let mut lib = Library::new("default_hotkeys");
        register(&mut lib);
        let names: Vec<&str> = lib.hotkeys().keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["commit", "skip", "show_path", "open_in_editor", "watch_subject"]
        );
        assert!(lib.hotkeys()["watch_subject"].handler.wants_job_table());
        assert_eq!(lib.hotkeys()["skip"].keys, vec!["<Tab>", "<F5>"]);
    }

    #[test]
    fn test_commit_and_skip_advance() {
        let mut app = app(&["a.png", "b.png"]);
        commit(&mut app).expect("commit");
        assert_eq!(app.subject().current(), Some(Path::new("b.png")));
        skip(&mut app).expect("skip");
        assert!(app.subject().is_finished());
        // Nothing left to do.
        commit(&mut app).expect("commit when finished");
        open_in_editor(&mut app).expect("no subject, no editor");
    }

    #[test]
    fn test_watch_subject_toggles_job() {
        let mut app = app(&["a.png"]);
        let mut jobs = EventJobScheduler::new();
        watch_subject(&mut app, &mut jobs).expect("on");
        assert_eq!(
            jobs.get(WATCH_JOB).map(|info| (info.trigger, info.lifecycle)),
            Some((Event::ImgChange, Lifecycle::Forever))
        );
        watch_subject(&mut app, &mut jobs).expect("off");
        assert!(!jobs.contains(WATCH_JOB));
    }
}
