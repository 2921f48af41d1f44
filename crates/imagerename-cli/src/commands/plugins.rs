//! Plugin inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::output::{self, OutputFormat};
use imagerename_core::error::AppError;
use imagerename_template::parser::{ConflictWarning, ContributionSummary};
use imagerename_template::{Engine, Template};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugins subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugin subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List merged hotkeys, panels and toolbars
    List {
        /// Only show one category (hotkey, panel, toolbar)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List name collisions between plugins
    Conflicts,
    /// Show plugin locations in load order
    Sources,
}

/// Table row for one merged contribution
#[derive(Debug, Serialize, Tabled)]
pub struct ContributionRow {
    /// Category
    #[tabled(rename = "Category")]
    pub category: String,
    /// Logical name
    #[tabled(rename = "Name")]
    pub name: String,
    /// Key combos or window
    #[tabled(rename = "Keys / Window")]
    pub detail: String,
    /// Library
    #[tabled(rename = "Library")]
    pub library: String,
    /// Handler
    #[tabled(rename = "Handler")]
    pub handler: String,
}

impl From<&ContributionSummary> for ContributionRow {
    fn from(summary: &ContributionSummary) -> Self {
        Self {
            category: summary.category.to_string(),
            name: summary.name.clone(),
            detail: summary.detail.clone(),
            library: summary.library.clone(),
            handler: summary.handler.clone(),
        }
    }
}

/// Table row for one conflict
#[derive(Debug, Serialize, Tabled)]
pub struct ConflictRow {
    /// Category
    #[tabled(rename = "Category")]
    pub category: String,
    /// Colliding name
    #[tabled(rename = "Name")]
    pub key: String,
    /// Library that wins
    #[tabled(rename = "Winning Library")]
    pub library: String,
    /// Displaced handler
    #[tabled(rename = "Displaced")]
    pub displaced: String,
    /// Replacing handler
    #[tabled(rename = "Replacement")]
    pub replacement: String,
}

impl From<&ConflictWarning> for ConflictRow {
    fn from(conflict: &ConflictWarning) -> Self {
        Self {
            category: conflict.category.to_string(),
            key: conflict.key.clone(),
            library: conflict.library.clone(),
            displaced: conflict.displaced.clone(),
            replacement: conflict.replacement.clone(),
        }
    }
}

/// Table row for one plugin location
#[derive(Debug, Serialize, Tabled)]
pub struct SourceRow {
    /// Load position
    #[tabled(rename = "#")]
    pub position: usize,
    /// Location
    #[tabled(rename = "Location")]
    pub location: String,
}

/// Execute plugin commands
pub async fn execute(
    args: &PluginsArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let mut engine = Engine::from_config(&config.plugins)?;
    debug!(locations = engine.locations().len(), command = ?args.command, "Plugin engine ready");

    match &args.command {
        PluginsCommand::Sources => {
            let rows: Vec<SourceRow> = engine
                .locations()
                .iter()
                .enumerate()
                .map(|(index, location)| SourceRow {
                    position: index + 1,
                    location: location.to_string(),
                })
                .collect();
            output::print_rows("Plugin sources", &rows, format);
        }
        PluginsCommand::List { category } => {
            let template = Template::compile_with_overrides(&mut engine, &config.hotkeys)?;
            let rows: Vec<ContributionRow> = template
                .contributions()
                .iter()
                .filter(|summary| {
                    category
                        .as_deref()
                        .is_none_or(|wanted| summary.category.as_str() == wanted)
                })
                .map(ContributionRow::from)
                .collect();
            output::print_rows("Contributions", &rows, format);
        }
        PluginsCommand::Conflicts => {
            let template = Template::compile_with_overrides(&mut engine, &config.hotkeys)?;
            let rows: Vec<ConflictRow> = template.conflicts().iter().map(ConflictRow::from).collect();
            if rows.is_empty() && format == OutputFormat::Table {
                output::print_success("No conflicts between plugins");
            } else {
                output::print_rows("Conflicts", &rows, format);
            }
        }
    }

    Ok(())
}
