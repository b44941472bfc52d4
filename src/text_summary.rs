//! Text summary builder for CLI output.
//!
//! Formats discovery runs and board listings as human-readable lines for text mode.

use crate::board::LIST_TAG_LIMIT;
use crate::model::{
    CompanyFromApi, DiscoverySnapshot, DiscoveryStatus, Job, RunOutcome, SavedJobsPage,
};
use crate::orchestrator::classify;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the end-of-run summary from the final snapshot.
pub(crate) fn build_text_summary(snapshot: &DiscoverySnapshot, outcome: &RunOutcome) -> TextSummary {
    let mut lines = Vec::new();

    if let Some(status) = snapshot.status {
        lines.push(status.to_string());
    }
    if let Some(query) = snapshot.search_query.as_deref() {
        lines.push(format!("Query: {query}"));
    }

    if let Some(cs) = snapshot.company_summary {
        lines.push(format!(
            "Companies: {} discovered, {} new, {} in database",
            cs.discovered, cs.new_companies, cs.total_in_database
        ));
        for company in snapshot.companies.iter().filter(|c| c.is_new) {
            let industry = company.industry.as_deref().unwrap_or("-");
            lines.push(format!("  NEW {} ({industry}) {}", company.name, company.homepage_url));
        }
    }

    if let Some(summary) = snapshot.run_summary {
        lines.push(format!(
            "Jobs: {} total, {} new, {} of {} target companies with jobs, {} processed",
            summary.total_jobs,
            summary.total_new_jobs,
            summary.actual_successful,
            summary.target_successful,
            summary.total_processed
        ));

        let classified = classify(&snapshot.job_logs);
        lines.push(format!("Companies with jobs ({}):", classified.successful.len()));
        for entry in &classified.successful {
            let page = entry.career_page.as_deref().unwrap_or("-");
            lines.push(format!(
                "  {} {} - {} jobs ({} new) {page}",
                entry.status.marker(),
                entry.company,
                entry.jobs_found,
                entry.new_jobs
            ));
        }
        lines.push(format!("Other companies ({}):", classified.other.len()));
        for entry in &classified.other {
            lines.push(format!(
                "  {} {}: {}",
                entry.status.marker(),
                entry.company,
                entry.message
            ));
        }
    }

    match outcome {
        RunOutcome::Failed { phase, reason } => {
            lines.push(format!("Failed while {}: {reason}", phase.label().to_lowercase()));
        }
        RunOutcome::Rejected => lines.push("A discovery run is already active.".to_string()),
        RunOutcome::Superseded => lines.push("Run was reset before it finished.".to_string()),
        RunOutcome::Completed { .. } | RunOutcome::Partial { .. } => {}
    }

    TextSummary { lines }
}

pub(crate) fn job_list_lines(jobs: &[Job]) -> Vec<String> {
    if jobs.is_empty() {
        return vec!["No jobs found.".to_string()];
    }
    jobs.iter()
        .map(|j| {
            let tags = j
                .tags
                .iter()
                .take(LIST_TAG_LIMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}  {} @ {}  [{}] {}  {}  {}",
                j.id,
                j.title,
                j.company,
                j.job_type.label(),
                j.location,
                j.posted_at,
                tags
            )
        })
        .collect()
}

pub(crate) fn job_detail_lines(job: &Job, saved: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{} @ {}", job.title, job.company),
        format!("Location: {} ({})", job.location, job.job_type.label()),
        format!("Posted: {}", job.posted_at),
        format!("Experience: {}", job.experience),
        format!("Source: {}", job.source.label()),
        format!("Apply: {}", job.apply_url),
        format!("Saved: {}", if saved { "yes" } else { "no" }),
    ];
    if !job.tags.is_empty() {
        lines.push(format!("Skills: {}", job.tags.join(", ")));
    }
    if !job.requirements.is_empty() {
        lines.push("Requirements:".to_string());
        lines.extend(job.requirements.iter().map(|r| format!("  - {r}")));
    }
    if !job.description.trim().is_empty() {
        lines.push(String::new());
        lines.extend(job.description.lines().map(str::to_string));
    }
    lines
}

pub(crate) fn company_lines(companies: &[CompanyFromApi]) -> Vec<String> {
    if companies.is_empty() {
        return vec!["No companies with jobs available yet.".to_string()];
    }
    companies
        .iter()
        .map(|c| {
            let noun = if c.job_count == 1 { "job" } else { "jobs" };
            format!("{}  {} {noun}", c.name, c.job_count)
        })
        .collect()
}

pub(crate) fn saved_lines(page: &SavedJobsPage) -> Vec<String> {
    let mut lines = vec![format!("{} saved jobs", page.count)];
    for saved in &page.saved_jobs {
        let what = match &saved.job {
            Some(job) => format!("{} @ {} ({})", job.role, job.company_name, job.id),
            None => "(job no longer available)".to_string(),
        };
        let notes = saved
            .notes
            .as_deref()
            .map(|n| format!("  notes: {n}"))
            .unwrap_or_default();
        lines.push(format!("  {what}  saved {}{notes}", saved.saved_at));
    }
    lines
}

pub(crate) fn discovery_status_lines(status: &DiscoveryStatus) -> Vec<String> {
    vec![
        format!("Total companies: {}", status.total_companies),
        format!("With career page: {}", status.companies_with_career_page),
        format!("Checked today: {}", status.companies_checked_today),
        format!("Pending: {}", status.pending_companies),
    ]
}
