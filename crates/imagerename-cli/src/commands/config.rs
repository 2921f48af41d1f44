//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use tracing::{debug, info};

use crate::output::{self, OutputFormat};
use imagerename_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration and plugin locations
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            debug!(path = ?config_path, "Showing effective configuration");
            output::print_document(&config, format);
        }
        ConfigCommand::Validate => {
            let config = match super::load_config(config_path) {
                Ok(config) => config,
                Err(e) => {
                    output::print_error(&format!("Configuration invalid: {}", e));
                    return Err(e);
                }
            };
            output::print_success(&format!(
                "Configuration '{}' is valid",
                config_path.unwrap_or("config/default.toml")
            ));
            output::print_kv("Images", &config.viewer.image_dir);
            output::print_kv("Extensions", &config.viewer.extensions.join(", "));
            output::print_kv("Tick", &format!("{} ms", config.viewer.tick_interval_ms));
            output::print_kv("Editor", &config.viewer.editor);
            output::print_kv("Load order", &format!("{:?}", config.plugins.load_order));

            if !std::path::Path::new(&config.viewer.image_dir).is_dir() {
                output::print_warning(&format!(
                    "Image directory '{}' does not exist",
                    config.viewer.image_dir
                ));
            }
            for path in &config.plugins.paths {
                if !path.starts_with("builtin:") && !std::path::Path::new(path).exists() {
                    output::print_warning(&format!("Plugin '{}' not found", path));
                }
            }
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;
            info!(path = %out_path, bytes = default_config.len(), "Default config generated");

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_writes_default_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let out = temp.path().join("nested/imagerename.toml");
        let args = ConfigArgs {
            command: ConfigCommand::Generate {
                output: out.display().to_string(),
            },
        };

        execute(&args, None, OutputFormat::Table).await.expect("generate");

        let written = std::fs::read_to_string(&out).expect("read");
        assert!(written.contains("[viewer]"));
        assert!(written.contains("[plugins]"));
    }
}
