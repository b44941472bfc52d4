//! Post-run reporting: wrap a finished run into a serializable [`RunReport`].

use crate::model::{DiscoveryConfig, DiscoverySnapshot, RunOutcome, RunReport};
use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn timestamp(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).context("format timestamp")
}

pub(crate) fn build_report(
    cfg: &DiscoveryConfig,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    outcome: RunOutcome,
    snapshot: DiscoverySnapshot,
) -> Result<RunReport> {
    Ok(RunReport {
        run_id: cfg.run_id.clone(),
        base_url: cfg.base_url.clone(),
        started_at: timestamp(started_at)?,
        finished_at: timestamp(finished_at)?,
        outcome,
        snapshot,
    })
}

/// Whether a CLI run should exit non-zero.
pub(crate) fn is_failure(outcome: &RunOutcome) -> bool {
    matches!(outcome, RunOutcome::Failed { .. } | RunOutcome::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiscoveryPhase, RunSummary};
    use std::time::Duration;
    use time::macros::datetime;

    fn cfg() -> DiscoveryConfig {
        DiscoveryConfig {
            base_url: "http://localhost:4000".into(),
            run_id: "42".into(),
            query: None,
            company_count: 50,
            target_successful: 10,
            inter_phase_delay: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(600),
            user_agent: "jobscout/test".into(),
            user_id: "demo-user".into(),
        }
    }

    #[test]
    fn report_carries_run_identity_and_rfc3339_times() {
        let report = build_report(
            &cfg(),
            datetime!(2025-03-01 10:00:00 UTC),
            datetime!(2025-03-01 10:02:30 UTC),
            RunOutcome::Completed {
                summary: RunSummary::default(),
            },
            DiscoverySnapshot::default(),
        )
        .unwrap();

        assert_eq!(report.run_id, "42");
        assert_eq!(report.started_at, "2025-03-01T10:00:00Z");
        assert_eq!(report.finished_at, "2025-03-01T10:02:30Z");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["outcome"], "completed");
        assert_eq!(json["snapshot"]["phase"], "idle");
    }

    #[test]
    fn failures_and_rejections_fail_the_process() {
        assert!(is_failure(&RunOutcome::Failed {
            phase: DiscoveryPhase::FindingJobs,
            reason: "boom".into()
        }));
        assert!(is_failure(&RunOutcome::Rejected));
        assert!(!is_failure(&RunOutcome::Partial {
            summary: RunSummary::default()
        }));
    }
}
