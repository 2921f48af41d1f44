//! Integration tests for plugin loading, merge order and compilation.

mod helpers;

use std::path::{Path, PathBuf};

use imagerename_core::config::plugin::LoadOrder;
use imagerename_template::{NodeKind, Template, TemplateError};

/// A user plugin taking over `commit` on `<Return>`. Its action touches `marker`.
fn user_commit(dir: &Path, marker: &Path) -> PathBuf {
    helpers::write_manifest(
        dir,
        "user.toml",
        &format!(
            r#"
[register]
name = "user"

[[register.hotkeys]]
name = "commit"
keys = "<Return>"
run = ["touch", "{}"]
wait = true
"#,
            marker.display()
        ),
    )
}

#[cfg(unix)]
#[test]
fn test_user_plugin_merged_last_wins() {
    let temp = tempfile::tempdir().expect("tempdir");
    let marker = temp.path().join("user-commit-ran");
    let manifest = user_commit(temp.path(), &marker);

    let mut engine = helpers::engine(&[&manifest], LoadOrder::BuiltinsFirst);
    let template = Template::compile(&mut engine).expect("compile");

    assert_eq!(
        template.libraries(),
        ["default_hotkeys", "default_panels", "default_toolbars", "user"]
    );
    assert_eq!(template.conflicts().len(), 1);
    let conflict = &template.conflicts()[0];
    assert_eq!(conflict.category, NodeKind::Hotkey);
    assert_eq!(conflict.key, "commit");
    assert_eq!(conflict.library, "user");
    assert_eq!(conflict.displaced, "default_hotkeys::commit");
    assert_eq!(conflict.replacement, "user::commit");

    let (mut session, _) = helpers::TestApp::new(&["a.png", "b.png"]).start(template);
    assert!(session.press("<Return>").expect("press"));
    assert!(marker.exists());
    assert_eq!(session.app().subject().current(), Some(Path::new("a.png")));
}

#[cfg(unix)]
#[test]
fn test_builtins_merged_last_win() {
    let temp = tempfile::tempdir().expect("tempdir");
    let marker = temp.path().join("user-commit-ran");
    let manifest = user_commit(temp.path(), &marker);

    let mut engine = helpers::engine(&[&manifest], LoadOrder::UserFirst);
    let template = Template::compile(&mut engine).expect("compile");

    assert_eq!(template.libraries()[0], "user");
    assert_eq!(template.conflicts().len(), 1);
    let conflict = &template.conflicts()[0];
    assert_eq!(conflict.library, "default_hotkeys");
    assert_eq!(conflict.displaced, "user::commit");
    assert_eq!(conflict.replacement, "default_hotkeys::commit");

    let (mut session, _) = helpers::TestApp::new(&["a.png", "b.png"]).start(template);
    assert!(session.press("<Return>").expect("press"));
    assert!(!marker.exists());
    assert_eq!(session.app().subject().current(), Some(Path::new("b.png")));
}

#[test]
fn test_plugin_without_register_aborts_compile() {
    let temp = tempfile::tempdir().expect("tempdir");
    let manifest = helpers::write_manifest(temp.path(), "empty.toml", "title = \"nothing here\"\n");

    let mut engine = helpers::engine(&[&manifest], LoadOrder::BuiltinsFirst);
    let err = Template::compile(&mut engine).unwrap_err();

    assert!(matches!(err, TemplateError::InvalidPlugin { .. }));
    assert_eq!(err.location(), Some(manifest.display().to_string().as_str()));
}

#[test]
fn test_missing_plugin_file_aborts_compile() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("gone.toml");

    let mut engine = helpers::engine(&[&missing], LoadOrder::BuiltinsFirst);
    let err = Template::compile(&mut engine).unwrap_err();
    assert!(err.to_string().contains("file not found"));
}

#[test]
fn test_render_filter_touches_one_category() {
    let (session, journal) = {
        let mut test_app = helpers::TestApp::new(&["a.png"]);
        let template = helpers::builtin_template().install(&mut test_app.app);
        let report = template.render(&mut test_app.app, Some(NodeKind::Panel));
        assert_eq!(report.created(), 1);
        (imagerename_template::Session::new(test_app.app), test_app.journal)
    };

    assert!(session.app().bound_combos().is_empty());
    assert_eq!(session.app().windows().len(), 1);
    assert!(journal.calls().iter().all(|call| !matches!(
        call,
        imagerename_template::host::ToolkitCall::BindKey(_)
    )));
}
