//! Run reporting for Savesync
//!
//! Turns the per-path [`ActionResult`] list of one reconciliation pass
//! into a [`RunReport`]: counts per outcome class, explicit path lists for
//! failures and conflicts, and renderings for humans, JSON consumers, and
//! structured log collectors. All methods are non-fatal; reporting never
//! breaks a sync run.

use serde::Serialize;
use tracing::{info, warn};

use savesync_core::domain::actions::{ActionOutcome, ActionResult, SyncAction};
use savesync_core::domain::newtypes::SavePath;

/// Summary of one console's reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Console the pass operated on
    pub console: String,
    /// Local-only files sent to the catalog without registration
    pub uploaded: u32,
    /// Remote-only records fetched to the local root
    pub downloaded: u32,
    /// Matched pairs overwritten (either direction)
    pub overwritten: u32,
    /// Records created in the catalog for local-only files
    pub registered: u32,
    /// Paths left untouched
    pub skipped: u32,
    /// Paths whose action failed
    pub failed: u32,
    /// Divergent pairs requiring operator attention
    pub conflicted: u32,
    /// Failing paths with their reasons
    pub failures: Vec<(SavePath, String)>,
    /// Conflicted paths
    pub conflicts: Vec<SavePath>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Builds a report from a pass's result list.
    pub fn from_results(console: &str, results: &[ActionResult], duration_ms: u64) -> Self {
        let mut report = Self {
            console: console.to_string(),
            duration_ms,
            ..Self::default()
        };

        for result in results {
            match &result.outcome {
                ActionOutcome::Failed(reason) => {
                    report.failed += 1;
                    report
                        .failures
                        .push((result.path.clone(), reason.to_string()));
                }
                ActionOutcome::Success => match result.action {
                    SyncAction::Upload => report.uploaded += 1,
                    SyncAction::Download => report.downloaded += 1,
                    SyncAction::Overwrite(_) => report.overwritten += 1,
                    SyncAction::Register => report.registered += 1,
                    SyncAction::Skip => report.skipped += 1,
                    SyncAction::Conflict => {
                        report.conflicted += 1;
                        report.conflicts.push(result.path.clone());
                    }
                },
            }
        }

        report
    }

    /// Total number of paths the pass touched or considered.
    pub fn total(&self) -> u32 {
        self.uploaded
            + self.downloaded
            + self.overwritten
            + self.registered
            + self.skipped
            + self.failed
            + self.conflicted
    }

    /// True when every path either succeeded or was skipped.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.conflicted == 0
    }

    /// Emits the report as structured tracing events.
    ///
    /// One info event for the summary; one warn event per failure and
    /// per conflict, so log collectors see the exact paths.
    pub fn emit(&self) {
        info!(
            console = %self.console,
            uploaded = self.uploaded,
            downloaded = self.downloaded,
            overwritten = self.overwritten,
            registered = self.registered,
            skipped = self.skipped,
            failed = self.failed,
            conflicted = self.conflicted,
            duration_ms = self.duration_ms,
            "reconciliation pass summary"
        );

        for (path, reason) in &self.failures {
            warn!(console = %self.console, path = %path, %reason, "savefile failed");
        }
        for path in &self.conflicts {
            warn!(console = %self.console, path = %path, "savefile conflicted");
        }
    }

    /// Renders the report as human-readable lines.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{}: {} uploaded, {} downloaded, {} overwritten, {} registered, \
             {} skipped, {} failed, {} conflicted ({}ms)",
            self.console,
            self.uploaded,
            self.downloaded,
            self.overwritten,
            self.registered,
            self.skipped,
            self.failed,
            self.conflicted,
            self.duration_ms,
        )];

        for (path, reason) in &self.failures {
            lines.push(format!("  failed: {path} ({reason})"));
        }
        for path in &self.conflicts {
            lines.push(format!("  conflict: {path}"));
        }

        lines
    }

    /// Renders the report as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savesync_core::domain::actions::{FailureReason, OverwriteSource};

    fn path(s: &str) -> SavePath {
        SavePath::new(s).unwrap()
    }

    fn sample_results() -> Vec<ActionResult> {
        vec![
            ActionResult::success(path("a.bin"), SyncAction::Upload),
            ActionResult::success(path("b.bin"), SyncAction::Download),
            ActionResult::success(
                path("c.bin"),
                SyncAction::Overwrite(OverwriteSource::RemoteToLocal),
            ),
            ActionResult::success(path("d.bin"), SyncAction::Register),
            ActionResult::success(path("e.bin"), SyncAction::Skip),
            ActionResult::success(path("f.bin"), SyncAction::Conflict),
            ActionResult::failed(
                path("g.bin"),
                SyncAction::Upload,
                FailureReason::Timeout("upload".to_string()),
            ),
        ]
    }

    #[test]
    fn test_counts_per_outcome_class() {
        let report = RunReport::from_results("ps2", &sample_results(), 1234);

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.overwritten, 1);
        assert_eq!(report.registered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.conflicted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 7);
        assert_eq!(report.duration_ms, 1234);
    }

    #[test]
    fn test_failure_and_conflict_paths_are_listed() {
        let report = RunReport::from_results("ps2", &sample_results(), 0);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0.as_str(), "g.bin");
        assert!(report.failures[0].1.contains("timeout"));
        assert_eq!(report.conflicts, vec![path("f.bin")]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_run() {
        let results = vec![
            ActionResult::success(path("a.bin"), SyncAction::Upload),
            ActionResult::success(path("b.bin"), SyncAction::Skip),
        ];
        let report = RunReport::from_results("ps2", &results, 10);

        assert!(report.is_clean());
        assert!(report.failures.is_empty());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_failed_action_counts_only_as_failure() {
        // A failed download must not bump the downloaded counter.
        let results = vec![ActionResult::failed(
            path("a.bin"),
            SyncAction::Download,
            FailureReason::Transport("boom".to_string()),
        )];
        let report = RunReport::from_results("ps2", &results, 0);

        assert_eq!(report.downloaded, 0);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_render_lists_problems() {
        let report = RunReport::from_results("ps2", &sample_results(), 50);
        let lines = report.render();

        assert!(lines[0].starts_with("ps2:"));
        assert!(lines.iter().any(|l| l.contains("failed: g.bin")));
        assert!(lines.iter().any(|l| l.contains("conflict: f.bin")));
    }

    #[test]
    fn test_json_shape() {
        let report = RunReport::from_results("ps2", &sample_results(), 50);
        let json = report.to_json();

        assert_eq!(json["console"], "ps2");
        assert_eq!(json["uploaded"], 1);
        assert_eq!(json["failed"], 1);
        assert!(json["failures"].is_array());
    }

    #[test]
    fn test_empty_results() {
        let report = RunReport::from_results("ps2", &[], 5);
        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
    }
}
