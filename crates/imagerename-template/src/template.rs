//! Compiled plugin template bound to a running application.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::TemplateError;
use crate::host::app::App;
use crate::node::{NodeKind, NodeList, RenderReport};
use crate::parser::{ConflictWarning, ContributionSummary, Parser};

/// The compiled node list together with what was learned while merging.
#[derive(Debug, Clone, Default)]
pub struct Template {
    nodelist: NodeList,
    conflicts: Vec<ConflictWarning>,
    contributions: Vec<ContributionSummary>,
    libraries: Vec<String>,
}

impl Template {
    /// Loads every enabled plugin, merges and compiles them once.
    pub fn compile(engine: &mut Engine) -> Result<Self, TemplateError> {
        Self::compile_with_overrides(engine, &BTreeMap::new())
    }

    /// Like [`Template::compile`], re-binding hotkeys by logical name after merge.
    pub fn compile_with_overrides(
        engine: &mut Engine,
        key_overrides: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, TemplateError> {
        let libraries = engine.load()?;
        let names: Vec<String> = libraries.iter().map(|lib| lib.name().to_string()).collect();

        let mut parser = Parser::merge(libraries);
        let unknown = parser.apply_key_overrides(key_overrides);
        if !unknown.is_empty() {
            warn!(unknown = ?unknown, "Some key remaps matched no hotkey");
        }

        let mut template = Self::from_parser(&parser);
        template.libraries = names;
        info!(
            libraries = template.libraries.len(),
            nodes = template.nodelist.len(),
            conflicts = template.conflicts.len(),
            "Template compiled"
        );
        Ok(template)
    }

    /// Compiles an already merged parser.
    pub fn from_parser(parser: &Parser) -> Self {
        Self {
            nodelist: parser.compile(),
            conflicts: parser.conflicts().to_vec(),
            contributions: parser.contributions(),
            libraries: Vec::new(),
        }
    }

    /// The compiled nodes.
    pub fn nodes(&self) -> &NodeList {
        &self.nodelist
    }

    /// Conflicts found while merging.
    pub fn conflicts(&self) -> &[ConflictWarning] {
        &self.conflicts
    }

    /// Every merged contribution.
    pub fn contributions(&self) -> &[ContributionSummary] {
        &self.contributions
    }

    /// Names of the merged libraries, in load order.
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// Renders every node, or only nodes of `filter`'s category, into `app`.
    pub fn render(&self, app: &mut App, filter: Option<NodeKind>) -> RenderReport {
        let report = self.nodelist.render(app, filter);
        info!(
            filter = ?filter,
            rendered = report.outcomes.len(),
            created = report.created(),
            failed = report.failures.len(),
            "Template rendered"
        );
        report
    }

    /// Binds the template to `app` so handlers can re-render it.
    pub fn install(self, app: &mut App) -> Arc<Template> {
        let template = Arc::new(self);
        app.set_template(Arc::clone(&template));
        template
    }
}
