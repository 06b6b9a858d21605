//! Config command - inspect the resolved configuration

use anyhow::Result;
use clap::{Args, Subcommand};

use savesync_core::config::Config;

use crate::commands::load_config;
use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration (credentials redacted)
    Show(ShowArgs),
    /// Print the default configuration file path
    Path(PathArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {}

#[derive(Debug, Args)]
pub struct PathArgs {}

impl ConfigCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
        let reporter = Reporter::new(format);

        match self {
            Self::Show(_) => {
                let mut config = load_config(config_path);
                if !config.api.password.is_empty() {
                    config.api.password = "<redacted>".to_string();
                }

                if reporter.is_json() {
                    reporter.json(&serde_json::to_value(&config)?);
                } else {
                    let yaml = serde_yaml::to_string(&config)?;
                    for line in yaml.lines() {
                        reporter.detail(line);
                    }
                }
            }
            Self::Path(_) => {
                let path = Config::default_path();
                if reporter.is_json() {
                    reporter.json(&serde_json::json!({
                        "path": path.display().to_string(),
                    }));
                } else {
                    reporter.detail(&path.display().to_string());
                }
            }
        }

        Ok(())
    }
}
