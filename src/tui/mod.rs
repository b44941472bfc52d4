mod help;
mod state;

use crate::api::ApiClient;
use crate::cli::{build_config, Cli};
use crate::model::{
    DiscoveryConfig, DiscoveryPhase, DiscoverySnapshot, JobDiscoveryLogEntry,
    JobDiscoveryStatus, RunOutcome, StatusMessage,
};
use crate::orchestrator::{self, classify, DiscoverySettings, PhaseController, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use help::draw_help;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{push_wrapped_status_kv, KeyAction, UiState, TAB_DISCOVER};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = ApiClient::new(&cfg)?;
    let controller = Arc::new(PhaseController::new(
        client.clone(),
        client,
        DiscoverySettings::from(&cfg),
    ));

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<RunOutcome>();
    let snapshot_rx = controller.subscribe();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || {
        run_threaded(ui_args, cfg, snapshot_rx, outcome_rx, cmd_tx)
    });

    let res = orchestrator::run_controller(controller, cmd_rx, outcome_tx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    cfg: DiscoveryConfig,
    mut snapshot_rx: watch::Receiver<DiscoverySnapshot>,
    mut outcome_rx: UnboundedReceiver<RunOutcome>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only.
    let mut state = UiState {
        query: args.query.clone().unwrap_or_default(),
        log_path: crate::storage::log_dir().ok().map(|d| d.join("jobscout.log")),
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        if snapshot_rx.has_changed().unwrap_or(false) {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            state.apply_snapshot(snapshot);
        }
        while let Ok(outcome) = outcome_rx.try_recv() {
            handle_outcome(&args, &cfg, &mut state, outcome);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(k) {
                    KeyAction::None => {}
                    KeyAction::Send(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    KeyAction::Export => export_last_run(&cfg, &mut state),
                    KeyAction::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn handle_outcome(args: &Cli, cfg: &DiscoveryConfig, state: &mut UiState, outcome: RunOutcome) {
    let finished = !matches!(outcome, RunOutcome::Rejected | RunOutcome::Superseded);
    state.apply_outcome(outcome);
    if !finished {
        return;
    }
    if let (Some(path), Some(report)) = (args.export_json.as_deref(), current_report(cfg, state)) {
        match crate::storage::export_json(path, &report) {
            Ok(()) => state.info = format!("Exported JSON: {}", path.display()),
            Err(e) => state.info = format!("Export JSON failed: {e:#}"),
        }
    }
}

fn current_report(cfg: &DiscoveryConfig, state: &UiState) -> Option<crate::model::RunReport> {
    let outcome = state.last_outcome.clone()?;
    let started_at = state.started_at?;
    match orchestrator::build_report(
        cfg,
        started_at,
        time::OffsetDateTime::now_utc(),
        outcome,
        state.snapshot.clone(),
    ) {
        Ok(r) => Some(r),
        Err(e) => {
            tracing::warn!("could not build run report: {e:#}");
            None
        }
    }
}

fn export_last_run(cfg: &DiscoveryConfig, state: &mut UiState) {
    let Some(report) = current_report(cfg, state) else {
        state.info = "No finished run to export yet.".into();
        return;
    };
    let path = match std::env::current_dir().context("get current directory") {
        Ok(dir) => dir.join(crate::storage::default_export_name(&report)),
        Err(e) => {
            state.info = format!("JSON export failed: {e:#}");
            return;
        }
    };
    state.info = match crate::storage::export_json(&path, &report) {
        Ok(()) => format!("Exported JSON: {}", path.display()),
        Err(e) => format!("JSON export failed: {e:#}"),
    };
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Discover"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("jobscout"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_DISCOVER => draw_discover(chunks[1], f, state),
        _ => draw_help(chunks[1], f, state.log_path.as_deref()),
    }
}

fn draw_discover(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Search focus
                Constraint::Length(5), // Status + phase progress
                Constraint::Min(0),    // Companies | job results
                Constraint::Length(3), // Info line
            ]
            .as_ref(),
        )
        .split(area);

    draw_query(main[0], f, state);
    draw_status(main[1], f, state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(main[2]);
    draw_companies(body[0], f, &state.snapshot);
    draw_results(body[1], f, state);

    let info = Paragraph::new(state.info.as_str())
        .block(Block::default().borders(Borders::ALL).title("Info"));
    f.render_widget(info, main[3]);
}

fn draw_query(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let (text, style) = if state.editing_query {
        (format!("{}▏", state.query), Style::default().fg(Color::Yellow))
    } else if state.query.is_empty() {
        (
            "e.g. AI startups in fintech (optional)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (state.query.clone(), Style::default())
    };
    let title = if state.editing_query {
        "Search focus (Enter to start, Esc to cancel)"
    } else {
        "Search focus (/ to edit)"
    };
    let p = Paragraph::new(Span::styled(text, style))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn status_color(status: StatusMessage) -> Color {
    match status {
        StatusMessage::Failed => Color::Red,
        StatusMessage::Partial { .. } => Color::Yellow,
        StatusMessage::Complete { .. } | StatusMessage::CompaniesFound { .. } => Color::Green,
        StatusMessage::DiscoveringCompanies | StatusMessage::FindingJobs => Color::Cyan,
    }
}

/// Progress through the three visible steps of a run.
fn phase_ratio(phase: DiscoveryPhase) -> f64 {
    match phase {
        DiscoveryPhase::Idle => 0.0,
        DiscoveryPhase::DiscoveringCompanies => 1.0 / 3.0,
        DiscoveryPhase::FindingJobs => 2.0 / 3.0,
        DiscoveryPhase::Complete => 1.0,
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let snapshot = &state.snapshot;
    let status_line = match snapshot.status {
        Some(s) => Line::from(Span::styled(
            s.to_string(),
            Style::default()
                .fg(status_color(s))
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "Ready",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let elapsed = state
        .elapsed()
        .map(|d| format!(" {:.1}s ", d.as_secs_f64()))
        .unwrap_or_default();
    let p = Paragraph::new(status_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Status{elapsed}")),
    );
    f.render_widget(p, rows[0]);

    let label = ["Discover companies", "Find jobs", "Complete"]
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let reached = phase_ratio(snapshot.phase) * 3.0 >= (i + 1) as f64 - 0.01;
            if reached {
                format!("[{step}]")
            } else {
                step.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" → ");
    let gauge_color = match snapshot.status {
        Some(s) if s.is_failure() => Color::Red,
        _ => Color::Green,
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(phase_ratio(snapshot.phase))
        .label(label);
    f.render_widget(gauge, rows[1]);
}

fn draw_companies(area: Rect, f: &mut ratatui::Frame, snapshot: &DiscoverySnapshot) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    if let Some(summary) = snapshot.company_summary {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}", summary.discovered),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(" discovered  "),
            Span::styled(
                format!("{}", summary.new_companies),
                Style::default().fg(Color::Green),
            ),
            Span::raw(" new  "),
            Span::styled(
                format!("{}", summary.total_in_database),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(" in database"),
        ]));
        lines.push(Line::from(""));
    }

    for log in &snapshot.company_logs {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", log.step), Style::default().fg(Color::Gray)),
            Span::raw(log.message.clone()),
        ]));
    }
    if !snapshot.company_logs.is_empty() && !snapshot.companies.is_empty() {
        lines.push(Line::from(""));
    }

    for company in &snapshot.companies {
        let mut spans = vec![Span::raw(company.name.clone())];
        if let Some(industry) = company.industry.as_deref() {
            spans.push(Span::styled(
                format!(" · {industry}"),
                Style::default().fg(Color::Gray),
            ));
        }
        if company.is_new {
            spans.push(Span::styled(
                " NEW",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No companies yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = format!(
        "Companies ({} · {} new)",
        snapshot.companies.len(),
        snapshot.new_company_count()
    );
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn entry_line(entry: &JobDiscoveryLogEntry) -> Line<'static> {
    let color = match entry.status {
        JobDiscoveryStatus::Success => Color::Green,
        JobDiscoveryStatus::NoJobs => Color::Gray,
        JobDiscoveryStatus::NoCareerPage => Color::Red,
        JobDiscoveryStatus::Error => Color::Yellow,
    };
    let detail = match entry.status {
        JobDiscoveryStatus::Success => {
            format!(" {} jobs ({} new)", entry.jobs_found, entry.new_jobs)
        }
        _ => format!(" {}", entry.message),
    };
    Line::from(vec![
        Span::styled(entry.status.marker(), Style::default().fg(color)),
        Span::raw(" "),
        Span::raw(entry.company.clone()),
        Span::styled(detail, Style::default().fg(Color::Gray)),
    ])
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let snapshot = &state.snapshot;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if let Some(summary) = snapshot.run_summary {
        let card = |label: &'static str, value: u32, color: Color| {
            vec![
                Span::styled(format!("{value}"), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {label}   ")),
            ]
        };
        let mut cards = Vec::new();
        cards.extend(card("target", summary.target_successful, Color::Cyan));
        cards.extend(card(
            "with jobs",
            summary.actual_successful,
            if summary.completed { Color::Green } else { Color::Yellow },
        ));
        cards.extend(card("processed", summary.total_processed, Color::Gray));
        cards.extend(card("jobs", summary.total_jobs, Color::Green));
        cards.extend(card("new jobs", summary.total_new_jobs, Color::Magenta));
        lines.push(Line::from(cards));
        lines.push(Line::from(""));
    }

    if let Some(query) = snapshot.search_query.as_deref() {
        push_wrapped_status_kv(&mut lines, "Focus", query, area.width);
    }

    let classified = classify(&snapshot.job_logs);
    if !snapshot.job_logs.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Companies with jobs ({})", classified.successful.len()),
            Style::default().fg(Color::Green),
        )));
        lines.extend(classified.successful.iter().map(|e| entry_line(e)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Other companies ({})", classified.other.len()),
            Style::default().fg(Color::Gray),
        )));
        lines.extend(classified.other.iter().map(|e| entry_line(e)));
    } else if snapshot.phase == DiscoveryPhase::FindingJobs {
        lines.push(Line::from("Scanning career pages…"));
    }

    if let Some(RunOutcome::Failed { reason, .. }) = state.last_outcome.as_ref() {
        lines.push(Line::from(""));
        push_wrapped_status_kv(&mut lines, "Error", reason, area.width);
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Job results appear here once companies have been scanned.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let p = Paragraph::new(lines)
        .scroll((state.results_scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Job discovery"));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompanyDiscoverySummary, DiscoveredCompany, RunSummary};
    use crate::orchestrator::classify::tests::entry;
    use ratatui::backend::TestBackend;

    fn rendered(state: &UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f.area(), f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn idle_panel_shows_placeholders() {
        let screen = rendered(&UiState::default());
        assert!(screen.contains("Ready"));
        assert!(screen.contains("No companies yet."));
    }

    #[test]
    fn complete_panel_shows_companies_and_results() {
        let mut state = UiState::default();
        state.apply_snapshot(DiscoverySnapshot {
            phase: DiscoveryPhase::Complete,
            companies: vec![DiscoveredCompany {
                name: "Acme".into(),
                homepage_url: "https://acme.dev".into(),
                industry: None,
                is_new: true,
            }],
            company_summary: Some(CompanyDiscoverySummary {
                discovered: 1,
                new_companies: 1,
                total_in_database: 9,
            }),
            job_logs: vec![
                entry("Acme", JobDiscoveryStatus::Success, 4),
                entry("Bolt", JobDiscoveryStatus::NoJobs, 0),
            ],
            run_summary: Some(RunSummary {
                target_successful: 1,
                actual_successful: 1,
                total_processed: 2,
                total_jobs: 4,
                total_new_jobs: 2,
                completed: true,
            }),
            status: Some(StatusMessage::Complete {
                total_jobs: 4,
                successful: 1,
            }),
            ..Default::default()
        });

        let screen = rendered(&state);

        assert!(screen.contains("Complete! Found 4 jobs from 1 companies"));
        assert!(screen.contains("Companies with jobs (1)"));
        assert!(screen.contains("Other companies (1)"));
        assert!(screen.contains("NEW"));
    }

    #[test]
    fn phase_progress_is_monotonic() {
        let phases = [
            DiscoveryPhase::Idle,
            DiscoveryPhase::DiscoveringCompanies,
            DiscoveryPhase::FindingJobs,
            DiscoveryPhase::Complete,
        ];
        assert!(phases
            .windows(2)
            .all(|w| phase_ratio(w[0]) < phase_ratio(w[1])));
    }
}
