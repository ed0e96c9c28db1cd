//! Turns raw GitHub responses into the numbers of one tracker row.
//!
//!  - Issues triaged and resolved come from the user's event feed.
//!  - PR counts and the open snapshot come from the search API.
//!  - Commits combine push events (resolved through the compare API) with the repository commit
//!    listing, deduplicated by SHA.

pub mod aggregate;

use chrono::NaiveDate;
use serde::Serialize;

/// Automatic columns of a tracker row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyMetrics {
    pub issues_triaged: u64,
    pub issues_resolved: u64,
    pub prs_created: u64,
    pub prs_merged: u64,
    pub commits: u64,
    pub open_issues: u64,
    pub open_prs: u64,
}

impl DailyMetrics {
    /// Values in column order, B through H.
    pub fn columns(&self) -> [u64; 7] {
        [
            self.issues_triaged,
            self.issues_resolved,
            self.prs_created,
            self.prs_merged,
            self.commits,
            self.open_issues,
            self.open_prs,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub metrics: DailyMetrics,
    /// False when the event feed may not reach back to `date`. Triage, resolved and commit counts
    /// can be too low in that case.
    pub events_complete: bool,
}
