use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub base_url: String,
    pub run_id: String,
    #[serde(default)]
    pub query: Option<String>,
    pub company_count: u32,
    pub target_successful: u32,
    #[serde(with = "humantime_serde")]
    pub inter_phase_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    pub user_id: String,
}

/// Stage of a discovery run. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPhase {
    #[default]
    Idle,
    DiscoveringCompanies,
    FindingJobs,
    Complete,
}

impl DiscoveryPhase {
    pub fn label(self) -> &'static str {
        match self {
            DiscoveryPhase::Idle => "Idle",
            DiscoveryPhase::DiscoveringCompanies => "Discovering companies",
            DiscoveryPhase::FindingJobs => "Finding jobs",
            DiscoveryPhase::Complete => "Complete",
        }
    }

    /// A remote call is in flight (or the inter-phase pause is running).
    pub fn is_running(self) -> bool {
        matches!(
            self,
            DiscoveryPhase::DiscoveringCompanies | DiscoveryPhase::FindingJobs
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredCompany {
    pub name: String,
    pub homepage_url: String,
    #[serde(default)]
    pub industry: Option<String>,
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDiscoverySummary {
    pub discovered: u32,
    pub new_companies: u32,
    pub total_in_database: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDiscoveryLogLine {
    pub step: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDiscoveryOutcome {
    pub summary: CompanyDiscoverySummary,
    #[serde(default)]
    pub companies: Vec<DiscoveredCompany>,
    #[serde(default)]
    pub logs: Vec<CompanyDiscoveryLogLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobDiscoveryStatus {
    Success,
    NoJobs,
    NoCareerPage,
    Error,
}

impl JobDiscoveryStatus {
    /// Marker used by list views for the non-successful outcomes.
    pub fn marker(self) -> &'static str {
        match self {
            JobDiscoveryStatus::Success => "✓",
            JobDiscoveryStatus::NoJobs => "○",
            JobDiscoveryStatus::NoCareerPage => "✗",
            JobDiscoveryStatus::Error => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDiscoveryLogEntry {
    pub company: String,
    pub status: JobDiscoveryStatus,
    pub message: String,
    pub jobs_found: u32,
    pub new_jobs: u32,
    #[serde(default)]
    pub career_page: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub target_successful: u32,
    pub actual_successful: u32,
    pub total_processed: u32,
    pub total_jobs: u32,
    pub total_new_jobs: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDiscoveryOutcome {
    pub summary: RunSummary,
    #[serde(default)]
    pub logs: Vec<JobDiscoveryLogEntry>,
}

/// The single status line shown for a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusMessage {
    DiscoveringCompanies,
    CompaniesFound { discovered: u32, new_companies: u32 },
    FindingJobs,
    Complete { total_jobs: u32, successful: u32 },
    Partial { actual: u32, target: u32 },
    Failed,
}

impl StatusMessage {
    pub fn is_failure(self) -> bool {
        matches!(self, StatusMessage::Failed)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::DiscoveringCompanies => {
                write!(f, "🔍 AI agent discovering companies…")
            }
            StatusMessage::CompaniesFound {
                discovered,
                new_companies,
            } => write!(f, "✓ Found {discovered} companies ({new_companies} new)"),
            StatusMessage::FindingJobs => {
                write!(f, "🚀 Finding jobs from discovered companies…")
            }
            StatusMessage::Complete {
                total_jobs,
                successful,
            } => write!(
                f,
                "✅ Complete! Found {total_jobs} jobs from {successful} companies"
            ),
            StatusMessage::Partial { actual, target } => write!(
                f,
                "⚠️ Found {actual} companies with jobs (target: {target})"
            ),
            StatusMessage::Failed => write!(f, "❌ Discovery failed. Please try again."),
        }
    }
}

/// Immutable view of the discovery controller's working state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscoverySnapshot {
    pub phase: DiscoveryPhase,
    pub search_query: Option<String>,
    pub companies: Vec<DiscoveredCompany>,
    pub company_summary: Option<CompanyDiscoverySummary>,
    pub company_logs: Vec<CompanyDiscoveryLogLine>,
    pub job_logs: Vec<JobDiscoveryLogEntry>,
    pub run_summary: Option<RunSummary>,
    pub status: Option<StatusMessage>,
}

impl DiscoverySnapshot {
    pub fn new_company_count(&self) -> usize {
        self.companies.iter().filter(|c| c.is_new).count()
    }
}

/// Final result of one `start` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Another run was active; nothing changed.
    Rejected,
    Completed { summary: RunSummary },
    Partial { summary: RunSummary },
    Failed { phase: DiscoveryPhase, reason: String },
    /// A reset happened while a remote call was in flight; its results were dropped.
    Superseded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub outcome: RunOutcome,
    pub snapshot: DiscoverySnapshot,
}

// Board types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum JobSource {
    CompanyWebsite,
    GoogleJobs,
}

impl JobSource {
    pub fn label(self) -> &'static str {
        match self {
            JobSource::CompanyWebsite => "Company Website",
            JobSource::GoogleJobs => "Google Jobs",
        }
    }

    pub fn as_query_str(self) -> &'static str {
        match self {
            JobSource::CompanyWebsite => "company_website",
            JobSource::GoogleJobs => "google_jobs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFromApi {
    pub id: String,
    pub company_name: String,
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub apply_url: String,
    pub source: JobSource,
    pub posted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailFromApi {
    #[serde(flatten)]
    pub job: JobFromApi,
    #[serde(default)]
    pub min_experience: Option<u32>,
    #[serde(default)]
    pub max_experience: Option<u32>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFromApi {
    pub name: String,
    pub job_count: u32,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStatus {
    pub total_companies: u32,
    pub companies_with_career_page: u32,
    pub companies_checked_today: u32,
    pub pending_companies: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResult {
    pub message: String,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub message: String,
    pub deleted_jobs: u32,
    pub deleted_companies: u32,
    #[serde(default)]
    pub deleted_company_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobFromApi {
    pub id: String,
    pub saved_at: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub job: Option<JobFromApi>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobsPage {
    pub count: u32,
    #[serde(default)]
    pub saved_jobs: Vec<SavedJobFromApi>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobResult {
    pub message: String,
    pub saved_job_id: String,
}

/// Display shape of a job, derived from the API record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary: String,
    pub posted_at: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub logo: String,
    pub tags: Vec<String>,
    pub apply_url: String,
    pub source: JobSource,
    pub experience: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum JobType {
    Remote,
    Hybrid,
    Onsite,
}

impl JobType {
    pub fn label(self) -> &'static str {
        match self {
            JobType::Remote => "Remote",
            JobType::Hybrid => "Hybrid",
            JobType::Onsite => "Onsite",
        }
    }
}
