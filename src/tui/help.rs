use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::path::Path;

fn key_line(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<12}"), Style::default().fg(Color::Magenta)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, log_path: Option<&Path>) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("q / Ctrl-C", "Quit"),
        key_line("Enter / s", "Start discovery"),
        key_line("/", "Edit search focus (Enter starts, Esc cancels)"),
        key_line("r", "Reset"),
        key_line("e", "Export last run as JSON"),
        key_line("↑/↓ or j/k", "Scroll results"),
        key_line("tab", "Switch tabs"),
        key_line("?", "Show this help"),
        Line::from(""),
        Line::from("Discovery:"),
        Line::from("  1. An AI agent finds companies (optionally matching the search focus)."),
        Line::from("  2. Career pages are scanned until enough companies with jobs are found."),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("✓", Style::default().fg(Color::Green)),
            Span::raw(" jobs found  "),
            Span::styled("○", Style::default().fg(Color::Gray)),
            Span::raw(" no jobs  "),
            Span::styled("✗", Style::default().fg(Color::Red)),
            Span::raw(" no career page  "),
            Span::styled("⚠", Style::default().fg(Color::Yellow)),
            Span::raw(" error"),
        ]),
        Line::from(""),
        Line::from("Logs:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                log_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unavailable".into()),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
