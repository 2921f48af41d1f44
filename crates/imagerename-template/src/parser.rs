//! Merges libraries into one namespace and compiles it into nodes.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::library::{HotkeyEntry, Library, PanelEntry, Registration, ToolbarEntry};
use crate::node::{HotkeyNode, Node, NodeBody, NodeKind, NodeList, PanelNode, ToolbarNode};

/// A later registration overwrote an earlier one under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictWarning {
    /// Contribution category.
    pub category: NodeKind,
    /// The incoming library that takes over.
    pub library: String,
    /// The colliding logical name.
    pub key: String,
    /// Handler being displaced.
    pub displaced: String,
    /// Handler taking over.
    pub replacement: String,
}

impl std::fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' from library '{}' overrides {} with {}",
            self.category, self.key, self.library, self.displaced, self.replacement
        )
    }
}

/// A merged entry with the library that contributed it.
#[derive(Debug, Clone)]
pub struct Contribution<T> {
    /// Contributing library name.
    pub library: String,
    /// The registration.
    pub entry: T,
}

/// Flat summary of one merged contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionSummary {
    /// Category.
    pub category: NodeKind,
    /// Logical name.
    pub name: String,
    /// Key combos or window name.
    pub detail: String,
    /// Contributing library.
    pub library: String,
    /// Qualified handler identity.
    pub handler: String,
}

/// Merges libraries with last-writer-wins semantics and compiles the result.
#[derive(Debug, Default)]
pub struct Parser {
    hotkeys: IndexMap<String, Contribution<HotkeyEntry>>,
    panels: IndexMap<String, Contribution<PanelEntry>>,
    toolbars: IndexMap<String, Contribution<ToolbarEntry>>,
    conflicts: Vec<ConflictWarning>,
}

impl Parser {
    /// Creates an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges libraries in order. Later libraries win on name collisions,
    /// each collision is logged as a warning and recorded.
    pub fn merge(libraries: impl IntoIterator<Item = Library>) -> Self {
        let mut parser = Self::new();
        for library in libraries {
            parser.merge_library(library);
        }
        info!(
            hotkeys = parser.hotkeys.len(),
            panels = parser.panels.len(),
            toolbars = parser.toolbars.len(),
            conflicts = parser.conflicts.len(),
            "Libraries merged"
        );
        parser
    }

    /// Merges one more library on top of what was merged so far.
    pub fn merge_library(&mut self, library: Library) {
        let (name, hotkeys, panels, toolbars) = library.into_parts();
        debug!(library = %name, "Merging library");

        merge_category(&mut self.hotkeys, hotkeys, NodeKind::Hotkey, &name, &mut self.conflicts);
        merge_category(&mut self.panels, panels, NodeKind::Panel, &name, &mut self.conflicts);
        merge_category(&mut self.toolbars, toolbars, NodeKind::Toolbar, &name, &mut self.conflicts);
    }

    /// Replaces the key combos of merged hotkeys by logical name.
    ///
    /// Returns the names that matched no merged hotkey.
    pub fn apply_key_overrides(&mut self, overrides: &BTreeMap<String, Vec<String>>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, keys) in overrides {
            match self.hotkeys.get_mut(name) {
                Some(contribution) if !keys.is_empty() => {
                    info!(hotkey = %name, keys = ?keys, "Hotkey keys remapped");
                    contribution.entry.keys = keys.clone();
                }
                Some(_) => {
                    warn!(hotkey = %name, "Ignoring empty key remap");
                }
                None => {
                    warn!(hotkey = %name, "Key remap names an unknown hotkey");
                    unknown.push(name.clone());
                }
            }
        }
        unknown
    }

    /// Merged hotkeys.
    pub fn hotkeys(&self) -> &IndexMap<String, Contribution<HotkeyEntry>> {
        &self.hotkeys
    }

    /// Merged panels.
    pub fn panels(&self) -> &IndexMap<String, Contribution<PanelEntry>> {
        &self.panels
    }

    /// Merged toolbars.
    pub fn toolbars(&self) -> &IndexMap<String, Contribution<ToolbarEntry>> {
        &self.toolbars
    }

    /// Recorded conflicts, in detection order.
    pub fn conflicts(&self) -> &[ConflictWarning] {
        &self.conflicts
    }

    /// Every merged contribution, hotkeys then panels then toolbars.
    pub fn contributions(&self) -> Vec<ContributionSummary> {
        let hotkeys = self.hotkeys.iter().map(|(name, c)| ContributionSummary {
            category: NodeKind::Hotkey,
            name: name.clone(),
            detail: c.entry.keys.join(" "),
            library: c.library.clone(),
            handler: c.entry.handler_name.clone(),
        });
        let panels = self.panels.iter().map(|(name, c)| ContributionSummary {
            category: NodeKind::Panel,
            name: name.clone(),
            detail: c.entry.window_name.clone(),
            library: c.library.clone(),
            handler: c.entry.handler_name.clone(),
        });
        let toolbars = self.toolbars.iter().map(|(name, c)| ContributionSummary {
            category: NodeKind::Toolbar,
            name: name.clone(),
            detail: c.entry.window_name.clone(),
            library: c.library.clone(),
            handler: c.entry.handler_name.clone(),
        });
        hotkeys.chain(panels).chain(toolbars).collect()
    }

    /// Compiles the merged mappings into a node list.
    pub fn compile(&self) -> NodeList {
        let mut nodes = NodeList::new();

        for (name, contribution) in &self.hotkeys {
            let entry = &contribution.entry;
            nodes.push(Node::compile(NodeBody::Hotkey(HotkeyNode {
                name: name.clone(),
                handler: entry.handler.clone(),
                keys: entry.keys.clone(),
                wants_job_table: entry.handler.wants_job_table(),
            })));
        }

        for contribution in self.panels.values() {
            let entry = &contribution.entry;
            nodes.push(Node::compile(NodeBody::Panel(PanelNode {
                window_name: entry.window_name.clone(),
                handler: entry.handler.clone(),
                icon: entry.icon.clone(),
            })));
        }

        for contribution in self.toolbars.values() {
            let entry = &contribution.entry;
            nodes.push(Node::compile(NodeBody::Toolbar(ToolbarNode {
                window_name: entry.window_name.clone(),
                handler: entry.handler.clone(),
                button_images: entry.button_images.clone(),
                button_size: entry.button_size,
                icon: entry.icon.clone(),
            })));
        }

        debug!(nodes = nodes.len(), "Template compiled");
        nodes
    }
}

fn merge_category<T: Registration>(
    merged: &mut IndexMap<String, Contribution<T>>,
    incoming: IndexMap<String, T>,
    category: NodeKind,
    library: &str,
    conflicts: &mut Vec<ConflictWarning>,
) {
    for (key, entry) in incoming {
        if let Some(existing) = merged.get(&key) {
            let conflict = ConflictWarning {
                category,
                library: library.to_string(),
                key: key.clone(),
                displaced: existing.entry.handler_name().to_string(),
                replacement: entry.handler_name().to_string(),
            };
            warn!(
                category = %conflict.category,
                library = %conflict.library,
                key = %conflict.key,
                displaced = %conflict.displaced,
                replacement = %conflict.replacement,
                "Registration conflict, later library wins"
            );
            conflicts.push(conflict);
        }
        merged.insert(
            key,
            Contribution {
                library: library.to_string(),
                entry,
            },
        );
    }
}
