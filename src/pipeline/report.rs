//! Per-target results and the run report

use crate::fetch::FailureKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// How a target was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Fetched from the network during this run
    Fetched,
    /// Served from the page cache
    Cached,
    /// Fetch failed permanently
    Failed { failure: FailureKind },
    /// Never attempted because the run was halted by a ban
    Aborted,
}

impl Resolution {
    /// Short label for report columns
    pub fn label(&self) -> String {
        match self {
            Self::Fetched => "fetched".to_string(),
            Self::Cached => "cached".to_string(),
            Self::Failed { failure } => failure.label(),
            Self::Aborted => "aborted".to_string(),
        }
    }
}

/// Outcome for one target. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub id: String,
    /// An expected ISSN appears in the page
    pub identity_match: bool,
    /// The platform signature appears in the page
    pub platform_match: bool,
    pub fetch_success: bool,
    pub resolution: Resolution,
    /// Network attempts issued for this target in this run
    pub attempts: u32,
}

impl MatchResult {
    /// Result for a target whose content is available
    pub fn matched(
        id: impl Into<String>,
        identity_match: bool,
        platform_match: bool,
        resolution: Resolution,
        attempts: u32,
    ) -> Self {
        Self {
            id: id.into(),
            identity_match,
            platform_match,
            fetch_success: true,
            resolution,
            attempts,
        }
    }

    /// Result for a target whose fetch failed; aborted failures are
    /// reported as [`Resolution::Aborted`]
    pub fn failed(id: impl Into<String>, failure: FailureKind, attempts: u32) -> Self {
        let resolution = match failure {
            FailureKind::Aborted => Resolution::Aborted,
            failure => Resolution::Failed { failure },
        };
        Self {
            id: id.into(),
            identity_match: false,
            platform_match: false,
            fetch_success: false,
            resolution,
            attempts,
        }
    }

    pub fn aborted(id: impl Into<String>) -> Self {
        Self::failed(id, FailureKind::Aborted, 0)
    }

    /// The three report booleans: identity, platform, fetch success
    pub fn flags(&self) -> (bool, bool, bool) {
        (self.identity_match, self.platform_match, self.fetch_success)
    }

    pub fn is_aborted(&self) -> bool {
        self.resolution == Resolution::Aborted
    }
}

/// Counts over a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
    pub aborted: usize,
    pub identity_matches: usize,
    pub platform_matches: usize,
}

/// All results of one run, keyed by target identifier
#[derive(Debug, Clone)]
pub struct Report {
    results: HashMap<String, MatchResult>,
    banned: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl Report {
    pub(crate) fn new(
        results: HashMap<String, MatchResult>,
        banned: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            results,
            banned,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MatchResult> {
        self.results.get(id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.values()
    }

    /// Whether a hard ban halted the run
    pub fn banned(&self) -> bool {
        self.banned
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Targets that did not produce content, sorted by identifier
    pub fn failures(&self) -> Vec<&MatchResult> {
        let mut failures: Vec<_> = self.iter().filter(|r| !r.fetch_success).collect();
        failures.sort_by(|a, b| a.id.cmp(&b.id));
        failures
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.results.len(),
            ..Summary::default()
        };

        for result in self.results.values() {
            match result.resolution {
                Resolution::Fetched => summary.fetched += 1,
                Resolution::Cached => summary.cached += 1,
                Resolution::Failed { .. } => summary.failed += 1,
                Resolution::Aborted => summary.aborted += 1,
            }
            if result.identity_match {
                summary.identity_matches += 1;
            }
            if result.platform_match {
                summary.platform_matches += 1;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(results: Vec<MatchResult>) -> Report {
        let map = results.into_iter().map(|r| (r.id.clone(), r)).collect();
        Report::new(map, false, Utc::now())
    }

    #[test]
    fn aborted_failure_maps_to_aborted_resolution() {
        let result = MatchResult::failed("a", FailureKind::Aborted, 2);
        assert!(result.is_aborted());
        assert_eq!(result.attempts, 2);
        assert_eq!(result.flags(), (false, false, false));
    }

    #[test]
    fn summary_counts() {
        let report = report(vec![
            MatchResult::matched("a", true, true, Resolution::Fetched, 1),
            MatchResult::matched("b", false, true, Resolution::Cached, 0),
            MatchResult::failed("c", FailureKind::HttpStatus { status: 404 }, 1),
            MatchResult::aborted("d"),
        ]);

        let summary = report.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.cached, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.identity_matches, 1);
        assert_eq!(summary.platform_matches, 2);

        let failures: Vec<_> = report.failures().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(failures, vec!["c", "d"]);
    }

    #[test]
    fn resolution_labels_and_serialization() {
        let failed = Resolution::Failed {
            failure: FailureKind::HttpStatus { status: 410 },
        };
        assert_eq!(failed.label(), "http_410");
        assert_eq!(Resolution::Cached.label(), "cached");

        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains(r#""status":"failed""#));
        assert!(json.contains(r#""kind":"http_status""#));
    }
}
