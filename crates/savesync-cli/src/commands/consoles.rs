//! Consoles command - list and register consoles

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use savesync_core::ports::catalog::CatalogClient;

use crate::commands::{connect, load_config};
use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Subcommand)]
pub enum ConsolesCommand {
    /// List consoles registered in the catalog
    List(ListArgs),
    /// Register a console in the catalog
    Register(RegisterArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Console name to register
    pub name: String,
}

impl ConsolesCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
        let reporter = Reporter::new(format);
        let config = load_config(config_path);
        config
            .validate()
            .context("Configuration is incomplete or malformed")?;

        let catalog = connect(&config).await?;

        match self {
            Self::List(_) => {
                let consoles = catalog
                    .list_consoles()
                    .await
                    .context("Failed to list consoles")?;

                if reporter.is_json() {
                    reporter.json(&serde_json::json!({
                        "consoles": consoles
                            .iter()
                            .map(|c| serde_json::json!({
                                "id": c.id.value(),
                                "name": c.name,
                                "configured": config.consoles.iter().any(|e| e.name == c.name),
                            }))
                            .collect::<Vec<_>>(),
                    }));
                } else if consoles.is_empty() {
                    reporter.detail("no consoles registered");
                } else {
                    reporter.success(&format!("{} console(s) registered", consoles.len()));
                    for console in &consoles {
                        let configured = config.consoles.iter().any(|e| e.name == console.name);
                        let marker = if configured { "" } else { " (not in local config)" };
                        reporter.detail(&format!("{} [{}]{marker}", console.name, console.id));
                    }
                }
            }
            Self::Register(args) => {
                if let Some(existing) = catalog
                    .find_console(&args.name)
                    .await
                    .context("Failed to look up console")?
                {
                    reporter.warn(&format!(
                        "console '{}' already registered with id {}",
                        existing.name, existing.id
                    ));
                } else {
                    let console = catalog
                        .register_console(&args.name)
                        .await
                        .context("Failed to register console")?;
                    reporter.success(&format!(
                        "registered console '{}' with id {}",
                        console.name, console.id
                    ));
                    if !config.consoles.iter().any(|e| e.name == console.name) {
                        reporter.detail(
                            "add it to the consoles section of the config file to include it in sync runs",
                        );
                    }
                }
            }
        }

        if let Err(err) = catalog.logout().await {
            tracing::warn!(error = %err, "logout failed");
        }

        Ok(())
    }
}
