//! Integration tests for the host loop: hotkeys, jobs, panels and toolbars.

mod helpers;

use std::path::Path;

use imagerename_template::plugins::default_hotkeys::WATCH_JOB;
use imagerename_template::plugins::default_panels::{HISTORY_WINDOW, HistoryView};
use imagerename_template::plugins::default_toolbars::TOOLBAR_WINDOW;
use imagerename_template::views::TabularView;
use imagerename_template::host::WindowState;
use imagerename_template::{App, NodeKind, WindowId};

fn history_names(app: &App) -> Vec<String> {
    app.windows()
        .get(&WindowId::panel(HISTORY_WINDOW))
        .and_then(|window| window.view_as::<HistoryView>())
        .map(|view| view.rows().iter().map(|row| row[0].clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_panel_rendered_twice_opens_one_window() {
    let (mut session, journal) =
        helpers::TestApp::new(&["a.png"]).start(helpers::builtin_template());

    let report = session.app_mut().render(Some(NodeKind::Panel));
    assert_eq!(report.created(), 0);
    assert_eq!(journal.windows_opened(&WindowId::panel(HISTORY_WINDOW)), 1);
}

#[test]
fn test_hidden_panel_keeps_history() {
    let (mut session, journal) =
        helpers::TestApp::new(&["a.png", "b.png", "c.png"]).start(helpers::builtin_template());
    let panel = WindowId::panel(HISTORY_WINDOW);

    session.tick();
    assert!(session.press("<Return>").expect("press"));
    session.tick();
    assert_eq!(history_names(session.app()), vec!["b.png", "a.png"]);

    assert!(session.app_mut().hide_window(&panel));
    assert_eq!(session.app().window_state(&panel), WindowState::Hidden);

    // Hidden panels keep receiving subject changes.
    assert!(session.press("<Tab>").expect("press"));
    session.tick();

    session.app_mut().render(Some(NodeKind::Panel));
    assert_eq!(session.app().window_state(&panel), WindowState::Visible);
    assert_eq!(history_names(session.app()), vec!["c.png", "b.png", "a.png"]);
    assert_eq!(journal.windows_opened(&panel), 1);
}

#[test]
fn test_hotkey_toggles_job_run_on_img_change() {
    let (mut session, _) =
        helpers::TestApp::new(&["a.png", "b.png"]).start(helpers::builtin_template());
    session.tick();

    assert!(session.press("<F9>").expect("press"));
    assert!(session.jobs().contains(WATCH_JOB));

    // No image change, no ImgChange jobs.
    let idle = session.tick();
    assert!(idle.ran.is_empty());

    assert!(session.press("<Return>").expect("press"));
    let report = session.tick();
    assert_eq!(report.ran, vec![WATCH_JOB.to_string()]);
    assert!(session.jobs().contains(WATCH_JOB));

    assert!(session.press("<F9>").expect("press"));
    assert!(!session.jobs().contains(WATCH_JOB));
}

#[test]
fn test_unbound_combo_is_ignored() {
    let (mut session, _) = helpers::TestApp::new(&["a.png"]).start(helpers::builtin_template());
    assert!(!session.press("<Ctrl-Q>").expect("press"));
    assert_eq!(session.app().subject().current(), Some(Path::new("a.png")));
}

#[test]
fn test_toolbar_button_reopens_panels() {
    let (mut session, journal) =
        helpers::TestApp::new(&["a.png"]).start(helpers::builtin_template());
    let panel = WindowId::panel(HISTORY_WINDOW);
    let toolbar = WindowId::toolbar(TOOLBAR_WINDOW);

    let buttons = session
        .app()
        .windows()
        .get(&toolbar)
        .map(|window| (window.buttons().len(), window.columns()));
    assert_eq!(buttons, Some((3, 2)));

    session.app_mut().hide_window(&panel);
    session.click(&toolbar, 1).expect("click");

    assert_eq!(session.app().window_state(&panel), WindowState::Visible);
    assert_eq!(journal.windows_opened(&panel), 1);
    assert!(session.click(&toolbar, 7).is_err());
}

#[test]
fn test_session_finishes_after_last_image() {
    let (mut session, _) = helpers::TestApp::new(&["a.png"]).start(helpers::builtin_template());
    assert!(!session.is_finished());
    session.press("<F5>").expect("press");
    assert!(session.is_finished());

    let app = session.shutdown();
    assert!(app.subject().is_finished());
}
