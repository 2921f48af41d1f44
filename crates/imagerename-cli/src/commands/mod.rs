//! CLI command definitions and dispatch.

pub mod config;
pub mod plugins;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use imagerename_core::config::AppConfig;
use imagerename_core::error::AppError;

/// ImageRename — inspect plugins and configuration
#[derive(Debug, Parser)]
#[command(name = "imagerename-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plugin inspection
    Plugins(plugins::PluginsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config.as_deref();
        match &self.command {
            Commands::Plugins(args) => plugins::execute(args, config_path, self.format).await,
            Commands::Config(args) => config::execute(args, config_path, self.format).await,
        }
    }
}

/// Helper: load configuration from the optional file plus defaults and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}
