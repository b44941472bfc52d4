//! Two-phase discovery run: find companies, pause, then find jobs for them.
//!
//! The controller is the only writer of the run state. Readers either take a
//! [`DiscoverySnapshot`] or subscribe to the watch channel and re-render on change.

use super::classify::summary_mismatches;
use super::phase::Transition;
use crate::api::{CompanyDiscoverer, JobDiscoverer};
use crate::model::{DiscoveryConfig, DiscoverySnapshot, RunOutcome, StatusMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

pub(crate) const DEFAULT_COMPANY_COUNT: u32 = 50;
pub(crate) const DEFAULT_TARGET_SUCCESSFUL: u32 = 10;
pub(crate) const DEFAULT_INTER_PHASE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy)]
pub(crate) struct DiscoverySettings {
    pub company_count: u32,
    pub target_successful: u32,
    /// Cosmetic pause so phase-1 results are visible before phase 2 starts.
    pub inter_phase_delay: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            company_count: DEFAULT_COMPANY_COUNT,
            target_successful: DEFAULT_TARGET_SUCCESSFUL,
            inter_phase_delay: DEFAULT_INTER_PHASE_DELAY,
        }
    }
}

impl From<&DiscoveryConfig> for DiscoverySettings {
    fn from(cfg: &DiscoveryConfig) -> Self {
        Self {
            company_count: cfg.company_count,
            target_successful: cfg.target_successful,
            inter_phase_delay: cfg.inter_phase_delay,
        }
    }
}

pub(crate) struct PhaseController<C, J> {
    companies: C,
    jobs: J,
    settings: DiscoverySettings,
    state: watch::Sender<DiscoverySnapshot>,
    // Bumped by every accepted start and every reset; a run only writes while it still owns it.
    generation: AtomicU64,
}

impl<C, J> PhaseController<C, J>
where
    C: CompanyDiscoverer,
    J: JobDiscoverer,
{
    pub fn new(companies: C, jobs: J, settings: DiscoverySettings) -> Self {
        let (state, _) = watch::channel(DiscoverySnapshot::default());
        Self {
            companies,
            jobs,
            settings,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> DiscoverySnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DiscoverySnapshot> {
        self.state.subscribe()
    }

    /// Run the full pipeline. A no-op returning [`RunOutcome::Rejected`] unless idle.
    pub async fn start(&self, query: Option<String>) -> RunOutcome {
        let query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        let Some(run) = self.begin(query.clone()) else {
            tracing::debug!("start ignored: a run is already active");
            return RunOutcome::Rejected;
        };
        tracing::info!(run, ?query, "discovery run started");

        // Phase 1: companies.
        let companies = self
            .companies
            .discover_companies(query.as_deref(), self.settings.company_count)
            .await;
        let companies = match companies {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(run, e),
        };
        tracing::info!(
            run,
            discovered = companies.summary.discovered,
            new = companies.summary.new_companies,
            "company discovery finished"
        );
        let stored = self.apply(run, Transition::CompaniesDiscovered, |s| {
            s.status = Some(StatusMessage::CompaniesFound {
                discovered: companies.summary.discovered,
                new_companies: companies.summary.new_companies,
            });
            s.company_summary = Some(companies.summary);
            s.companies = companies.companies;
            s.company_logs = companies.logs;
        });
        if !stored {
            return RunOutcome::Superseded;
        }

        if !self.settings.inter_phase_delay.is_zero() {
            tokio::time::sleep(self.settings.inter_phase_delay).await;
        }

        // Phase 2: jobs.
        let started = self.apply(run, Transition::JobsStarted, |s| {
            s.status = Some(StatusMessage::FindingJobs);
        });
        if !started {
            return RunOutcome::Superseded;
        }
        let jobs = match self
            .jobs
            .run_job_discovery(self.settings.target_successful)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(run, e),
        };

        let summary = jobs.summary;
        for problem in summary_mismatches(&summary, jobs.logs.len()) {
            tracing::warn!(run, "job discovery summary is inconsistent: {problem}");
        }
        let status = if summary.completed {
            StatusMessage::Complete {
                total_jobs: summary.total_jobs,
                successful: summary.actual_successful,
            }
        } else {
            StatusMessage::Partial {
                actual: summary.actual_successful,
                target: summary.target_successful,
            }
        };
        let stored = self.apply(run, Transition::JobsDiscovered, |s| {
            s.job_logs = jobs.logs;
            s.run_summary = Some(summary);
            s.status = Some(status);
        });
        if !stored {
            return RunOutcome::Superseded;
        }

        tracing::info!(
            run,
            processed = summary.total_processed,
            successful = summary.actual_successful,
            jobs = summary.total_jobs,
            completed = summary.completed,
            "discovery run finished"
        );
        if summary.completed {
            RunOutcome::Completed { summary }
        } else {
            RunOutcome::Partial { summary }
        }
    }

    /// Return to the initial idle state. Results of a run still in flight are dropped.
    pub fn reset(&self) {
        self.state.send_if_modified(|s| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            // Reset is accepted from every phase.
            let phase = s.phase.advance(Transition::Reset).unwrap_or_default();
            let idle = DiscoverySnapshot {
                phase,
                ..Default::default()
            };
            if *s == idle {
                return false;
            }
            *s = idle;
            true
        });
        tracing::debug!("discovery state reset");
    }

    /// Accept a start if idle; clears the previous run and returns the new run's generation.
    fn begin(&self, query: Option<String>) -> Option<u64> {
        let mut run = None;
        self.state.send_if_modified(|s| {
            let Ok(phase) = s.phase.advance(Transition::Start) else {
                return false;
            };
            run = Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *s = DiscoverySnapshot {
                phase,
                search_query: query,
                status: Some(StatusMessage::DiscoveringCompanies),
                ..Default::default()
            };
            true
        });
        run
    }

    /// Apply `transition` and `update` atomically if `run` still owns the state.
    fn apply<F>(&self, run: u64, transition: Transition, update: F) -> bool
    where
        F: FnOnce(&mut DiscoverySnapshot),
    {
        let mut applied = false;
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != run {
                return false;
            }
            match s.phase.advance(transition) {
                Ok(next) => {
                    s.phase = next;
                    update(s);
                    applied = true;
                    true
                }
                Err(e) => {
                    tracing::error!(run, "discovery state out of sync: {e}");
                    false
                }
            }
        });
        if !applied {
            tracing::debug!(run, ?transition, "run superseded; dropping result");
        }
        applied
    }

    fn fail(&self, run: u64, error: anyhow::Error) -> RunOutcome {
        let phase = self.snapshot().phase;
        tracing::warn!(run, ?phase, "discovery run failed: {error:#}");
        let stored = self.apply(run, Transition::Fail, |s| {
            s.status = Some(StatusMessage::Failed);
        });
        if !stored {
            return RunOutcome::Superseded;
        }
        RunOutcome::Failed {
            phase,
            reason: format!("{error:#}"),
        }
    }
}
