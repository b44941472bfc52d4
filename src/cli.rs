use crate::api::{ApiClient, JobQuery};
use crate::board;
use crate::model::{
    DiscoveryConfig, DiscoverySnapshot, JobSource, JobType, RunReport, StatusMessage,
};
use crate::orchestrator::discovery::{DEFAULT_COMPANY_COUNT, DEFAULT_TARGET_SUCCESSFUL};
use crate::orchestrator::{build_report, is_failure, DiscoverySettings, PhaseController};
use crate::text_summary;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::RngCore;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::mpsc;

pub const DEFAULT_BASE_URL: &str = "https://job-agent-backend.vercel.app";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

type OutputTx = mpsc::UnboundedSender<OutputLine>;

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (OutputTx, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "jobscout",
    version,
    about = "Job board client with an AI company and job discovery panel"
)]
pub struct Cli {
    /// Base URL of the job board backend
    #[arg(long, env = "JOBSCOUT_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Print JSON and exit (no TUI)
    #[arg(long, global = true, conflicts_with = "text")]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long, global = true)]
    pub text: bool,

    /// Free-text focus for company discovery (e.g. "AI startups in fintech")
    #[arg(long)]
    pub query: Option<String>,

    /// Number of companies to request from company discovery
    #[arg(long, default_value_t = DEFAULT_COMPANY_COUNT)]
    pub company_count: u32,

    /// Companies with at least one job needed for a complete run
    #[arg(long, default_value_t = DEFAULT_TARGET_SUCCESSFUL)]
    pub target_successful: u32,

    /// Pause between company discovery and job discovery
    #[arg(long, default_value = "1500ms")]
    pub inter_phase_delay: humantime::Duration,

    /// Transport timeout for each backend request
    #[arg(long, default_value = "10m", global = true)]
    pub request_timeout: humantime::Duration,

    /// User id for saved jobs
    #[arg(long, env = "JOBSCOUT_USER_ID", default_value = "demo-user", global = true)]
    pub user_id: String,

    /// Export the run report as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Log debug output (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List jobs
    Jobs {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_enum)]
        source: Option<JobSource>,
        /// Remote, Hybrid or Onsite, derived from the location
        #[arg(long = "type", value_enum, ignore_case = true)]
        job_type: Option<JobType>,
    },
    /// Show one job in detail
    Job { id: String },
    /// List companies that have jobs
    Companies {
        #[arg(long)]
        search: Option<String>,
    },
    /// List jobs for one company
    Company { name: String },
    /// Manage saved jobs
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    /// Discovery maintenance
    Discovery {
        #[command(subcommand)]
        action: DiscoveryCommand,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum SavedCommand {
    List,
    Add {
        job_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    Remove { job_id: String },
    Check { job_id: String },
}

#[derive(Debug, Subcommand, Clone)]
pub enum DiscoveryCommand {
    /// Company counts on the backend
    Status,
    /// Load the built-in company list
    Seed,
    /// Delete companies without jobs
    Cleanup,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        self.command.is_none() && !self.json && !self.text
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if let Some(command) = args.command.clone() {
        return run_board(&args, command).await;
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args).await;
        }
    }

    if args.json {
        return run_json(args).await;
    }

    run_text(args).await
}

/// Generate a random id for a discovery run.
fn gen_run_id() -> String {
    let mut b = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut b);
    u64::from_le_bytes(b).to_string()
}

/// Build a `DiscoveryConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> DiscoveryConfig {
    DiscoveryConfig {
        base_url: args.base_url.clone(),
        run_id: gen_run_id(),
        query: args.query.clone(),
        company_count: args.company_count,
        target_successful: args.target_successful,
        inter_phase_delay: Duration::from(args.inter_phase_delay),
        request_timeout: Duration::from(args.request_timeout),
        user_agent: format!("jobscout/{}", env!("CARGO_PKG_VERSION")),
        user_id: args.user_id.clone(),
    }
}

/// Run the discovery pipeline once. With `progress`, status changes go to stderr as they happen.
async fn run_discovery(args: &Cli, progress: Option<&OutputTx>) -> Result<RunReport> {
    let cfg = build_config(args);
    let client = ApiClient::new(&cfg)?;
    let controller = PhaseController::new(client.clone(), client, DiscoverySettings::from(&cfg));
    tracing::info!(run_id = %cfg.run_id, base_url = %cfg.base_url, "starting discovery");

    let started_at = OffsetDateTime::now_utc();
    let mut status_rx = controller.subscribe();
    let run = controller.start(cfg.query.clone());
    tokio::pin!(run);

    let mut last_status = None;
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break (&mut run).await;
                }
                let snapshot = status_rx.borrow_and_update().clone();
                report_progress(progress, &mut last_status, &snapshot);
            }
        }
    };
    report_progress(progress, &mut last_status, &controller.snapshot());

    let report = build_report(
        &cfg,
        started_at,
        OffsetDateTime::now_utc(),
        outcome,
        controller.snapshot(),
    )?;
    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, &report)?;
    }
    Ok(report)
}

fn report_progress(
    progress: Option<&OutputTx>,
    last: &mut Option<StatusMessage>,
    snapshot: &DiscoverySnapshot,
) {
    for status in unseen_statuses(*last, snapshot) {
        if let Some(tx) = progress {
            let _ = tx.send(OutputLine::Stderr(status.to_string()));
        }
        *last = Some(status);
    }
}

/// Statuses to print for `snapshot` given the last one printed.
///
/// Watch updates coalesce, so the phase-1 result can be replaced before it is observed.
/// It is rebuilt from the stored company summary in that case.
fn unseen_statuses(
    last: Option<StatusMessage>,
    snapshot: &DiscoverySnapshot,
) -> Vec<StatusMessage> {
    let Some(current) = snapshot.status else {
        return Vec::new();
    };
    if last == Some(current) {
        return Vec::new();
    }
    let mut out = Vec::new();
    let before_found = matches!(last, None | Some(StatusMessage::DiscoveringCompanies));
    let past_found = !matches!(
        current,
        StatusMessage::DiscoveringCompanies | StatusMessage::CompaniesFound { .. }
    );
    if before_found && past_found {
        if let Some(found) = snapshot.company_summary {
            out.push(StatusMessage::CompaniesFound {
                discovered: found.discovered,
                new_companies: found.new_companies,
            });
        }
    }
    out.push(current);
    out
}

fn ensure_success(report: &RunReport) -> Result<()> {
    if is_failure(&report.outcome) {
        anyhow::bail!("discovery run {} did not succeed", report.run_id);
    }
    Ok(())
}

async fn run_json(args: Cli) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let report = run_discovery(&args, None).await;
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            drop(out_tx);
            let _ = out_handle.await;
            return Err(e);
        }
    };

    let out = serde_json::to_string_pretty(&report)?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    drop(out_tx);
    let _ = out_handle.await;
    ensure_success(&report)
}

async fn run_text(args: Cli) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let report = match run_discovery(&args, Some(&out_tx)).await {
        Ok(r) => r,
        Err(e) => {
            drop(out_tx);
            let _ = out_handle.await;
            return Err(e);
        }
    };

    let summary = text_summary::build_text_summary(&report.snapshot, &report.outcome);
    for line in summary.lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    if let Some(p) = args.export_json.as_deref() {
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
    }
    drop(out_tx);
    let _ = out_handle.await;
    ensure_success(&report)
}

/// Print `value` as JSON in `--json` mode, otherwise the given text lines.
fn emit<T: Serialize>(out: &OutputTx, json: bool, value: &T, lines: Vec<String>) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(value).context("serialize output")?;
        let _ = out.send(OutputLine::Stdout(text));
    } else {
        for line in lines {
            let _ = out.send(OutputLine::Stdout(line));
        }
    }
    Ok(())
}

async fn run_board(args: &Cli, command: Command) -> Result<()> {
    let cfg = build_config(args);
    let client = ApiClient::new(&cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();
    let res = board_command(&client, &cfg, args.json, command, &out_tx).await;
    drop(out_tx);
    let _ = out_handle.await;
    res
}

async fn board_command(
    client: &ApiClient,
    cfg: &DiscoveryConfig,
    json: bool,
    command: Command,
    out: &OutputTx,
) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    match command {
        Command::Jobs {
            role,
            location,
            source,
            job_type,
        } => {
            let query = JobQuery {
                role,
                location,
                source,
            };
            let jobs = client.jobs(&query).await?;
            let jobs = jobs.iter().map(|j| board::map_job(j, now)).collect();
            let jobs = board::filter_by_type(jobs, job_type);
            emit(out, json, &jobs, text_summary::job_list_lines(&jobs))
        }
        Command::Job { id } => {
            let detail = client.job(&id).await?;
            let job = board::map_job_detail(&detail, now);
            let saved = client.is_job_saved(&cfg.user_id, &job.id).await;
            emit(out, json, &job, text_summary::job_detail_lines(&job, saved))
        }
        Command::Companies { search } => {
            let companies = client.companies().await?;
            let companies = board::filter_companies(companies, search.as_deref());
            emit(out, json, &companies, text_summary::company_lines(&companies))
        }
        Command::Company { name } => {
            let jobs = client.company_jobs(&name).await?;
            let jobs: Vec<_> = jobs.iter().map(|j| board::map_job(j, now)).collect();
            emit(out, json, &jobs, text_summary::job_list_lines(&jobs))
        }
        Command::Saved { action } => match action {
            SavedCommand::List => {
                let page = client.saved_jobs(&cfg.user_id).await?;
                emit(out, json, &page, text_summary::saved_lines(&page))
            }
            SavedCommand::Add { job_id, notes } => {
                let res = client
                    .save_job(&cfg.user_id, &job_id, notes.as_deref())
                    .await?;
                let line = format!("{} ({})", res.message, res.saved_job_id);
                emit(out, json, &res, vec![line])
            }
            SavedCommand::Remove { job_id } => {
                client.unsave_job(&cfg.user_id, &job_id).await?;
                let value = serde_json::json!({ "jobId": job_id, "isSaved": false });
                emit(out, json, &value, vec![format!("Removed {job_id}")])
            }
            SavedCommand::Check { job_id } => {
                let saved = client.is_job_saved(&cfg.user_id, &job_id).await;
                let value = serde_json::json!({ "jobId": job_id, "isSaved": saved });
                let line = if saved { "saved" } else { "not saved" };
                emit(out, json, &value, vec![line.to_string()])
            }
        },
        Command::Discovery { action } => match action {
            DiscoveryCommand::Status => {
                let status = client.discovery_status().await?;
                emit(out, json, &status, text_summary::discovery_status_lines(&status))
            }
            DiscoveryCommand::Seed => {
                let res = client.seed_companies().await?;
                let line = format!("{} ({} companies)", res.message, res.total);
                emit(out, json, &res, vec![line])
            }
            DiscoveryCommand::Cleanup => {
                let res = client.cleanup_empty_companies().await?;
                let mut lines = vec![format!(
                    "{} ({} jobs, {} companies deleted)",
                    res.message, res.deleted_jobs, res.deleted_companies
                )];
                lines.extend(res.deleted_company_names.iter().map(|n| format!("  {n}")));
                emit(out, json, &res, lines)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_discovery_panel() {
        let args = Cli::try_parse_from(["jobscout", "--text"]).unwrap();
        let cfg = build_config(&args);

        assert_eq!(cfg.company_count, 50);
        assert_eq!(cfg.target_successful, 10);
        assert_eq!(cfg.inter_phase_delay, Duration::from_millis(1500));
        assert_eq!(cfg.request_timeout, Duration::from_secs(600));
        assert!(cfg.user_agent.starts_with("jobscout/"));
        assert!(!cfg.run_id.is_empty());
        assert!(!args.is_interactive());
    }

    #[test]
    fn coalesced_phase_one_status_is_still_reported() {
        use crate::model::{CompanyDiscoverySummary, DiscoveryPhase};

        let snapshot = DiscoverySnapshot {
            phase: DiscoveryPhase::FindingJobs,
            status: Some(StatusMessage::FindingJobs),
            company_summary: Some(CompanyDiscoverySummary {
                discovered: 50,
                new_companies: 10,
                total_in_database: 200,
            }),
            ..Default::default()
        };
        let found = StatusMessage::CompaniesFound {
            discovered: 50,
            new_companies: 10,
        };

        assert_eq!(
            unseen_statuses(Some(StatusMessage::DiscoveringCompanies), &snapshot),
            vec![found, StatusMessage::FindingJobs]
        );
        assert_eq!(
            unseen_statuses(Some(found), &snapshot),
            vec![StatusMessage::FindingJobs]
        );
        assert!(unseen_statuses(Some(StatusMessage::FindingJobs), &snapshot).is_empty());

        // A phase-1 failure has no company summary to report.
        let failed = DiscoverySnapshot {
            status: Some(StatusMessage::Failed),
            ..Default::default()
        };
        assert_eq!(
            unseen_statuses(Some(StatusMessage::DiscoveringCompanies), &failed),
            vec![StatusMessage::Failed]
        );
    }

    #[test]
    fn json_and_text_conflict() {
        assert!(Cli::try_parse_from(["jobscout", "--json", "--text"]).is_err());
    }

    #[test]
    fn run_flags_are_parsed() {
        let args = Cli::try_parse_from([
            "jobscout",
            "--json",
            "--query",
            "AI startups in fintech",
            "--target-successful",
            "3",
            "--inter-phase-delay",
            "0s",
        ])
        .unwrap();
        let cfg = build_config(&args);

        assert_eq!(cfg.query.as_deref(), Some("AI startups in fintech"));
        assert_eq!(cfg.target_successful, 3);
        assert!(cfg.inter_phase_delay.is_zero());
    }

    #[test]
    fn board_subcommands_parse() {
        let args = Cli::try_parse_from([
            "jobscout", "jobs", "--type", "remote", "--source", "google_jobs",
        ])
        .unwrap();
        match args.command {
            Some(Command::Jobs {
                job_type, source, ..
            }) => {
                assert_eq!(job_type, Some(JobType::Remote));
                assert_eq!(source, Some(JobSource::GoogleJobs));
            }
            other => panic!("unexpected {other:?}"),
        }

        let args = Cli::try_parse_from([
            "jobscout", "saved", "add", "j1", "--notes", "apply monday", "--user-id", "me",
        ])
        .unwrap();
        assert_eq!(args.user_id, "me");
        assert!(matches!(
            args.command,
            Some(Command::Saved {
                action: SavedCommand::Add { .. }
            })
        ));
    }

    #[test]
    fn run_ids_differ() {
        assert_ne!(gen_run_id(), gen_run_id());
    }
}
