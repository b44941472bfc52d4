//! Presentation grouping for job discovery logs.

use crate::model::{JobDiscoveryLogEntry, JobDiscoveryStatus, RunSummary};

/// Job discovery logs split into companies with jobs and everything else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ClassifiedLogs<'a> {
    pub successful: Vec<&'a JobDiscoveryLogEntry>,
    pub other: Vec<&'a JobDiscoveryLogEntry>,
}

/// Partition logs by `status == success`, keeping the original order in both halves.
pub(crate) fn classify(logs: &[JobDiscoveryLogEntry]) -> ClassifiedLogs<'_> {
    let (successful, other) = logs
        .iter()
        .partition(|entry| entry.status == JobDiscoveryStatus::Success);
    ClassifiedLogs { successful, other }
}

/// Report where a remote run summary disagrees with its own contract.
///
/// The summary is still shown verbatim; callers only log these.
pub(crate) fn summary_mismatches(summary: &RunSummary, log_count: usize) -> Vec<String> {
    let mut out = Vec::new();
    let reached = summary.actual_successful >= summary.target_successful;
    if summary.completed != reached {
        out.push(format!(
            "completed={} but {} of {} successful",
            summary.completed, summary.actual_successful, summary.target_successful
        ));
    }
    if summary.total_processed as usize != log_count {
        out.push(format!(
            "totalProcessed={} but {} log entries",
            summary.total_processed, log_count
        ));
    }
    out
}
