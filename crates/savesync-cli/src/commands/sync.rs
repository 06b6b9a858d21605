//! Sync command - reconcile save directories against the catalog
//!
//! Runs one reconciliation pass per configured console:
//! 1. Loads configuration and validates it (fatal before any I/O)
//! 2. Authenticates with the catalog
//! 3. Runs scan → match → decide → execute per console
//! 4. Renders per-console reports and logs out
//!
//! Per-file failures are reported, not fatal: the command exits zero as
//! long as the run itself could start.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use savesync_core::domain::modes::{ActionMode, CrawlMode, Direction};
use savesync_engine::run::{ReconcileRunner, RunOptions, RunOutcome};
use savesync_engine::store::LocalSaveStore;
use savesync_report::RunReport;

use crate::commands::{connect, load_config};
use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Crawl mode: which paths are eligible (u/f/n/a/l)
    #[arg(short = 'c', long = "crawl", value_name = "MODE")]
    pub crawl: Option<String>,

    /// Action mode: what to do with eligible paths (u/f/n/a/l)
    #[arg(short = 'd', long = "download", value_name = "MODE")]
    pub download: Option<String>,

    /// Authoritative side for overwrites (upload or download)
    #[arg(long, value_name = "SIDE")]
    pub direction: Option<String>,

    /// Only reconcile the named console
    #[arg(long, value_name = "NAME")]
    pub console: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
        let reporter = Reporter::new(format);

        // Step 1: Load and validate configuration.
        let config = load_config(config_path);
        config
            .validate()
            .context("Configuration is incomplete or malformed")?;

        // CLI flags override the configured run policies.
        let crawl = match &self.crawl {
            Some(code) => CrawlMode::from_code(code)?,
            None => config.run.crawl_mode()?,
        };
        let action = match &self.download {
            Some(code) => ActionMode::from_code(code)?,
            None => config.run.action_mode()?,
        };
        let direction = match &self.direction {
            Some(side) => side.parse::<Direction>()?,
            None => config.run.direction()?,
        };

        // Step 2: Select consoles.
        let consoles: Vec<_> = match &self.console {
            Some(name) => {
                let selected: Vec<_> = config
                    .consoles
                    .iter()
                    .filter(|entry| &entry.name == name)
                    .cloned()
                    .collect();
                if selected.is_empty() {
                    anyhow::bail!("console '{name}' is not in the configuration");
                }
                selected
            }
            None => config.consoles.clone(),
        };

        // Step 3: Authenticate and assemble the engine.
        let catalog = Arc::new(connect(&config).await?);
        let store = Arc::new(if config.scan.hash_contents {
            LocalSaveStore::with_content_hashing()
        } else {
            LocalSaveStore::new()
        });
        let runner = ReconcileRunner::new(catalog.clone(), store, &config.transfer);

        let opts = RunOptions {
            crawl,
            action,
            direction,
            dry_run: self.dry_run,
        };

        info!(
            consoles = consoles.len(),
            crawl = %crawl,
            action = %action,
            direction = %direction,
            dry_run = self.dry_run,
            "starting reconciliation run"
        );

        // Step 4: Wire cancellation to Ctrl-C. In-flight transfers finish;
        // undispatched actions report as cancelled.
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping dispatch");
                signal_cancel.cancel();
            }
        });

        // Step 5: Run and report.
        let runs = runner.run_all(&consoles, &opts, &cancel).await;

        let mut reports = Vec::new();
        let mut fatal_consoles = 0usize;

        for (name, run) in runs {
            match run {
                Ok(run) => match run.outcome {
                    RunOutcome::Planned(actions) => {
                        reporter.success(&format!(
                            "{name}: {} planned action(s) (dry run)",
                            actions.len()
                        ));
                        for (path, planned) in &actions {
                            reporter.detail(&format!("{planned}: {path}"));
                        }
                        if reporter.is_json() {
                            let planned: Vec<_> = actions
                                .iter()
                                .map(|(path, planned)| {
                                    serde_json::json!({
                                        "path": path.as_str(),
                                        "action": planned.to_string(),
                                    })
                                })
                                .collect();
                            reporter.json(&serde_json::json!({
                                "console": name,
                                "planned": planned,
                            }));
                        }
                    }
                    RunOutcome::Executed(results) => {
                        let report = RunReport::from_results(&name, &results, run.duration_ms);
                        report.emit();

                        if report.is_clean() {
                            reporter.success(&report.render()[0]);
                        } else {
                            for line in report.render() {
                                reporter.warn(&line);
                            }
                        }
                        reports.push(report);
                    }
                },
                Err(err) => {
                    fatal_consoles += 1;
                    reporter.error(&format!("{name}: {err:#}"));
                }
            }
        }

        if reporter.is_json() && !reports.is_empty() {
            let json = serde_json::json!({
                "reports": reports.iter().map(RunReport::to_json).collect::<Vec<_>>(),
            });
            reporter.json(&json);
        }

        // Step 6: Invalidate the session token.
        if let Err(err) = catalog.logout().await {
            warn!(error = %err, "logout failed");
        }

        if fatal_consoles > 0 {
            anyhow::bail!("{fatal_consoles} console(s) could not be reconciled");
        }

        Ok(())
    }
}
