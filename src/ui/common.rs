//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use statusboard_types::Status;

use crate::app::{App, View};
use crate::data::duration::format_ago;

/// Render the header bar: overall state, per-status service counts and source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" STATUSBOARD ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("| {} | Loading...", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (ok, warn, error, no_data) = data.status_counts();
    let dim = Style::default().add_modifier(Modifier::DIM);

    let count = |n: usize, status: Status| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.status_style(status.into()))
        } else {
            Span::styled("0", dim)
        }
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(data.overall.day_status())),
        Span::styled("STATUSBOARD ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count(ok, Status::Ok),
        Span::raw(" ok "),
        count(warn, Status::Warn),
        Span::raw(" warn "),
        count(error, Status::Error),
        Span::raw(" error "),
    ];
    if no_data > 0 {
        spans.push(Span::styled(format!("{} unchecked ", no_data), dim));
    }
    spans.push(Span::raw(format!("│ {} │ ", app.source_description())));
    spans.push(Span::raw(format!("tz {}", app.options.zone)));
    if !data.rejected.is_empty() {
        spans.push(Span::styled(
            format!(" │ {} bad rows", data.rejected.len()),
            app.theme.status_style(Status::Warn.into()),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Dashboard "), Line::from(" 2:History ")];

    let selected = match app.current_view {
        View::Dashboard => 0,
        View::History => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Temporary messages win; otherwise shows the last update, any load error
/// and the context-sensitive controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Dashboard if app.filter_active => "Type to search | Enter:apply Esc:cancel",
        View::Dashboard => "/:search s:sort Tab:switch Enter:detail r:reload ?:help q:quit",
        View::History => "←→:day ↑↓:week Tab:switch Enter:detail r:reload ?:help q:quit",
    };

    let (status, style) = match (&app.data, &app.load_error) {
        (Some(data), Some(err)) => (
            format!(
                " {} | Updated {} | Refresh failed: {} | {}",
                app.current_view.label(),
                format_ago(data.last_updated.elapsed()),
                err,
                controls
            ),
            app.theme.status_style(Status::Warn.into()),
        ),
        (Some(data), None) => (
            format!(
                " {} | Updated {} | {}",
                app.current_view.label(),
                format_ago(data.last_updated.elapsed()),
                controls
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (None, Some(err)) => (
            format!(" Error: {} | q:quit r:retry", err),
            app.theme.status_style(Status::Error.into()),
        ),
        (None, None) => (
            " Loading... | q:quit".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab/1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Select service"),
        Line::from("  PgUp/PgDn   Jump 10 services"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Day detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" History"),
        Line::from("  ←/→ h/l     Previous/next day"),
        Line::from("  ↑/↓ j/k     Previous/next week"),
        Line::from("  Home/End    Oldest day/today"),
        Line::from(""),
        section(" Dashboard"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
