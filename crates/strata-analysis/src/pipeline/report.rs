//! End-of-run report, serialized into `runs.report_json`.

use serde::{Deserialize, Serialize};
use strata_core::constants::REPORT_SAMPLE_PATHS;

use super::phase::Phase;
use crate::graph::{AnalyticsSummary, SizeGuardNotice};
use crate::health::HealthScore;
use crate::resolve::ResolutionDiagnostics;
use crate::scanner::FingerprintModeUsed;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    UpToDate,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::UpToDate => "up_to_date",
        }
    }
}

/// File counts by change class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub discovered: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub new: usize,
    pub deleted: usize,
    /// Unchanged files whose mtime moved (touched, not edited).
    pub touched: usize,
    pub parsed: usize,
    pub unreadable: usize,
    pub skipped_large: usize,
    pub skipped_filtered: usize,
    /// Unchanged files re-resolved because a name they use moved.
    pub re_resolved: usize,
}

/// Files whose parse failed or came back partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailures {
    pub failed: usize,
    pub partial: usize,
    pub unsupported: usize,
    /// At most [`REPORT_SAMPLE_PATHS`] failed or partial paths, sorted.
    pub sample_paths: Vec<String>,
}

impl ParseFailures {
    pub fn record_failed(&mut self, path: &str) {
        self.failed += 1;
        self.sample(path);
    }

    pub fn record_partial(&mut self, path: &str) {
        self.partial += 1;
        self.sample(path);
    }

    fn sample(&mut self, path: &str) {
        if self.sample_paths.len() < REPORT_SAMPLE_PATHS {
            self.sample_paths.push(path.to_string());
        }
    }

    pub fn count(&self) -> usize {
        self.failed + self.partial
    }
}

/// What the history refresh did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub enabled: bool,
    pub head: Option<String>,
    pub commits_walked: usize,
    pub commits_recorded: usize,
    /// HEAD no longer descended from the stored head; history was rebuilt.
    pub reset: bool,
    /// A git error that skipped the refresh. Stored history is kept.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: i64,
    pub status: RunStatus,
    pub phase: Phase,
    pub forced: bool,
    pub fingerprint: FingerprintModeUsed,
    pub files: FileCounts,
    pub symbols_written: usize,
    pub edges_written: usize,
    pub symbols_total: i64,
    pub edges_total: i64,
    pub resolution: ResolutionDiagnostics,
    pub parse_failures: ParseFailures,
    pub notices: Vec<SizeGuardNotice>,
    pub analytics: Option<AnalyticsSummary>,
    pub health: Option<HealthScore>,
    pub history: HistoryReport,
    pub cache_hit_rate: f64,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn new(run_id: i64, forced: bool) -> Self {
        Self {
            run_id,
            status: RunStatus::Completed,
            phase: Phase::Idle,
            forced,
            fingerprint: FingerprintModeUsed::default(),
            files: FileCounts::default(),
            symbols_written: 0,
            edges_written: 0,
            symbols_total: 0,
            edges_total: 0,
            resolution: ResolutionDiagnostics::default(),
            parse_failures: ParseFailures::default(),
            notices: Vec::new(),
            analytics: None,
            health: None,
            history: HistoryReport::default(),
            cache_hit_rate: 0.0,
            elapsed_ms: 0,
        }
    }

    pub fn is_up_to_date(&self) -> bool {
        self.status == RunStatus::UpToDate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_samples_are_capped() {
        let mut failures = ParseFailures::default();
        for i in 0..25 {
            failures.record_failed(&format!("src/f{i:02}.py"));
        }
        failures.record_partial("src/z.py");
        assert_eq!(failures.count(), 26);
        assert_eq!(failures.sample_paths.len(), REPORT_SAMPLE_PATHS);
        assert_eq!(failures.sample_paths[0], "src/f00.py");
    }

    #[test]
    fn test_report_serializes_status_and_phase() {
        let mut report = RunReport::new(7, false);
        report.status = RunStatus::UpToDate;
        report.phase = Phase::Committed;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "up_to_date");
        assert_eq!(json["phase"], "committed");
        assert_eq!(json["fingerprint"], "mtime");
        let back: RunReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
