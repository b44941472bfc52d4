use crate::model::{DiscoverySnapshot, RunOutcome};
use crate::orchestrator::UiCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};
use std::path::PathBuf;
use std::time::Instant;
use time::OffsetDateTime;

pub const TAB_DISCOVER: usize = 0;
pub const TAB_HELP: usize = 1;
const TAB_COUNT: usize = 2;

pub struct UiState {
    pub tab: usize,
    pub info: String,

    // Search focus input
    pub query: String,
    pub editing_query: bool,

    /// Latest controller state; replaced wholesale on every change.
    pub snapshot: DiscoverySnapshot,
    pub run_start: Option<Instant>,
    pub started_at: Option<OffsetDateTime>,
    pub run_elapsed: Option<std::time::Duration>,
    pub last_outcome: Option<RunOutcome>,

    pub results_scroll: u16,
    pub log_path: Option<PathBuf>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: TAB_DISCOVER,
            info: "Press Enter to start discovery, / to set a focus, ? for help".into(),
            query: String::new(),
            editing_query: false,
            snapshot: DiscoverySnapshot::default(),
            run_start: None,
            started_at: None,
            run_elapsed: None,
            last_outcome: None,
            results_scroll: 0,
            log_path: None,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Send(UiCommand),
    Export,
    Quit,
}

impl UiState {
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if (key.modifiers, key.code) == (KeyModifiers::CONTROL, KeyCode::Char('c')) {
            return KeyAction::Quit;
        }

        if self.editing_query {
            match key.code {
                KeyCode::Esc => self.editing_query = false,
                KeyCode::Enter => {
                    self.editing_query = false;
                    return self.request_start();
                }
                KeyCode::Backspace => {
                    self.query.pop();
                }
                KeyCode::Char(c) => self.query.push(c),
                _ => {}
            }
            return KeyAction::None;
        }

        match key.code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Tab => {
                self.tab = (self.tab + 1) % TAB_COUNT;
                KeyAction::None
            }
            KeyCode::Char('?') => {
                self.tab = TAB_HELP;
                KeyAction::None
            }
            KeyCode::Char('/') => {
                self.tab = TAB_DISCOVER;
                if self.snapshot.phase.is_running() {
                    self.info = "Discovery is running; the focus applies to the next run.".into();
                }
                self.editing_query = true;
                KeyAction::None
            }
            KeyCode::Enter | KeyCode::Char('s') => self.request_start(),
            KeyCode::Char('r') => {
                self.info = "Reset.".into();
                self.run_start = None;
                self.started_at = None;
                self.run_elapsed = None;
                self.last_outcome = None;
                self.results_scroll = 0;
                KeyAction::Send(UiCommand::Reset)
            }
            KeyCode::Char('e') => KeyAction::Export,
            KeyCode::Up | KeyCode::Char('k') => {
                self.results_scroll = self.results_scroll.saturating_sub(1);
                KeyAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.results_scroll = self.results_scroll.saturating_add(1);
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    // Mirrors the controller's start guard so the user gets feedback.
    fn request_start(&mut self) -> KeyAction {
        let phase = self.snapshot.phase;
        if phase.is_running() {
            self.info = "A discovery run is already in progress.".into();
            return KeyAction::None;
        }
        if phase != crate::model::DiscoveryPhase::Idle {
            self.info = "Press r to reset before starting a new run.".into();
            return KeyAction::None;
        }
        self.tab = TAB_DISCOVER;
        self.info = "Starting discovery…".into();
        self.run_start = Some(Instant::now());
        self.started_at = Some(OffsetDateTime::now_utc());
        self.run_elapsed = None;
        self.last_outcome = None;
        self.results_scroll = 0;
        let query = Some(self.query.clone()).filter(|q| !q.trim().is_empty());
        KeyAction::Send(UiCommand::Start(query))
    }

    pub fn apply_snapshot(&mut self, snapshot: DiscoverySnapshot) {
        if self.snapshot.phase.is_running() && !snapshot.phase.is_running() {
            self.run_elapsed = self.run_start.map(|t| t.elapsed());
        }
        self.snapshot = snapshot;
    }

    pub fn apply_outcome(&mut self, outcome: RunOutcome) {
        match &outcome {
            RunOutcome::Rejected => {
                self.info = "A discovery run is already in progress.".into();
                return;
            }
            RunOutcome::Superseded => return,
            RunOutcome::Failed { reason, .. } => {
                self.info = format!("Discovery failed: {reason}");
            }
            RunOutcome::Completed { .. } | RunOutcome::Partial { .. } => {
                self.info = "Done. Press e to export JSON, r to reset.".into();
            }
        }
        self.last_outcome = Some(outcome);
    }

    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.run_elapsed.or_else(|| {
            self.run_start
                .filter(|_| self.snapshot.phase.is_running())
                .map(|t| t.elapsed())
        })
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Borders take 2 columns on each side.
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiscoveryPhase, RunSummary};

    fn press(state: &mut UiState, code: KeyCode) -> KeyAction {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_a_focus_then_enter_starts_with_it() {
        let mut state = UiState::default();

        assert_eq!(press(&mut state, KeyCode::Char('/')), KeyAction::None);
        for c in "fintech q".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Backspace);
        press(&mut state, KeyCode::Backspace);

        assert_eq!(
            press(&mut state, KeyCode::Enter),
            KeyAction::Send(UiCommand::Start(Some("fintech".into())))
        );
        assert!(!state.editing_query);
        assert!(state.run_start.is_some());
    }

    #[test]
    fn blank_focus_starts_without_query() {
        let mut state = UiState {
            query: "   ".into(),
            ..Default::default()
        };
        assert_eq!(
            press(&mut state, KeyCode::Char('s')),
            KeyAction::Send(UiCommand::Start(None))
        );
    }

    #[test]
    fn start_is_not_sent_while_running_or_complete() {
        let mut state = UiState::default();
        state.snapshot.phase = DiscoveryPhase::FindingJobs;
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::None);

        state.snapshot.phase = DiscoveryPhase::Complete;
        assert_eq!(press(&mut state, KeyCode::Enter), KeyAction::None);
        assert_eq!(
            press(&mut state, KeyCode::Char('r')),
            KeyAction::Send(UiCommand::Reset)
        );
    }

    #[test]
    fn quit_keys() {
        let mut state = UiState::default();
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(
            state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );

        // While editing, 'q' is text.
        state.editing_query = true;
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::None);
        assert_eq!(state.query, "q");
    }

    #[test]
    fn tab_cycles_and_question_mark_opens_help() {
        let mut state = UiState::default();
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, TAB_HELP);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, TAB_DISCOVER);
        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.tab, TAB_HELP);
    }

    #[test]
    fn rejected_outcome_does_not_replace_the_last_result() {
        let mut state = UiState::default();
        state.apply_outcome(RunOutcome::Completed {
            summary: RunSummary::default(),
        });
        state.apply_outcome(RunOutcome::Rejected);

        assert!(matches!(state.last_outcome, Some(RunOutcome::Completed { .. })));
        assert!(state.info.contains("already in progress"));
    }

    #[test]
    fn wrapped_value_continues_on_indented_lines() {
        let mut out = Vec::new();
        push_wrapped_status_kv(&mut out, "Query", "abcdefghij", 12);
        // usable 8, first line 8 - 7 = 1 char, then 6 per line
        assert_eq!(out.len(), 3);
        push_wrapped_status_kv(&mut out, "Empty", "  ", 40);
        assert_eq!(out.len(), 3);
    }
}
