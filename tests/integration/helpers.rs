//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use imagerename_core::config::plugin::LoadOrder;
use imagerename_template::host::toolkit::Journal;
use imagerename_template::{App, Engine, HeadlessToolkit, PluginLocation, Session, Subject, Template};

/// A headless application plus the journal of its toolkit calls.
pub struct TestApp {
    /// The application, not yet wrapped in a session.
    pub app: App,
    /// Calls the toolkit received.
    pub journal: Journal,
}

impl TestApp {
    /// Creates an application walking `images`.
    pub fn new(images: &[&str]) -> Self {
        let toolkit = HeadlessToolkit::new();
        let journal = toolkit.journal();
        let subject = Subject::new(images.iter().map(|image| PathBuf::from(*image)).collect());
        Self {
            app: App::new(Box::new(toolkit), subject),
            journal,
        }
    }

    /// Installs `template`, renders everything and starts a session.
    pub fn start(mut self, template: Template) -> (Session, Journal) {
        template.install(&mut self.app);
        let report = self.app.render(None);
        assert!(report.is_ok(), "render failed: {:?}", report.failures);
        (Session::new(self.app), self.journal)
    }
}

/// Writes a manifest plugin into `dir` and returns its path.
pub fn write_manifest(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, content).expect("Failed to write manifest");
    path
}

/// An engine with the builtin plugins plus the given user plugins.
pub fn engine(user: &[&Path], order: LoadOrder) -> Engine {
    Engine::new()
        .with_user_plugins(user.iter().map(|path| PluginLocation::from(path.to_path_buf())))
        .with_load_order(order)
}

/// The builtin template.
pub fn builtin_template() -> Template {
    Template::compile(&mut Engine::new()).expect("Failed to compile builtin template")
}
