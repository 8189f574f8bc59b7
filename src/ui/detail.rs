//! Day detail overlay rendering.
//!
//! Lists every service's rollup for one day: worst status, check counts,
//! mean response time and the latest check's HTTP status and message.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use statusboard_types::{DailyBucketEntry, DateKey, Status};

use crate::app::{App, View};
use crate::data::duration::format_millis;
use crate::ui::Theme;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the day detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };

    let date = app.detail_date();
    let entries = data.buckets.entries(&date);
    let day_status = data.buckets.day_status(&date);

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // Header
        Constraint::Min(5),    // Entries
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== HEADER =====
    let mut header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", date), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  Worst: "),
            Span::styled(
                day_status.label(),
                app.theme.status_style(day_status).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "    Services: {}    Checks: {}",
                entries.len(),
                entries.iter().map(|e| e.total_checks()).sum::<u32>()
            )),
        ]),
        Line::from(""),
    ];

    if app.current_view == View::Dashboard {
        if let Some(service) = app.selected_service() {
            let mut spans = vec![
                Span::raw(" Selected: "),
                Span::styled(service.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ];
            if let Some(ref url) = service.url {
                spans.push(Span::raw(format!("  {}", url)));
            }
            if let Some(threshold) = service.threshold_ms {
                spans.push(Span::raw(format!("  (slow above {}ms)", threshold)));
            }
            header_lines.push(Line::from(spans));
        }
    }

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(" Day Detail ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // ===== ENTRIES =====
    render_entries(frame, app, date, entries, chunks[1]);

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}

fn render_entries(
    frame: &mut Frame,
    app: &App,
    date: DateKey,
    entries: &[DailyBucketEntry],
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" Services ({}) ", entries.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if entries.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  No data recorded for {}", date),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Service"),
        Cell::from("Worst"),
        Cell::from("OK"),
        Cell::from("WARN"),
        Cell::from("ERROR"),
        Cell::from("Avg"),
        Cell::from("HTTP"),
        Cell::from("Last check"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = entries.iter().map(|e| entry_row(e, app, &app.theme)).collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Fill(3),
    ];

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn entry_row<'a>(entry: &'a DailyBucketEntry, app: &App, theme: &Theme) -> Row<'a> {
    let worst = entry.worst();
    let latest = &entry.latest;
    let last_check = format!(
        "{} {}",
        app.options.zone.format(&latest.at, "%H:%M"),
        latest.message.as_deref().unwrap_or(latest.status.symbol())
    );

    Row::new(vec![
        Cell::from(entry.display_name()),
        Cell::from(worst.symbol()).style(theme.status_style(worst.into())),
        Cell::from(entry.ok_count.to_string()),
        Cell::from(count_cell(entry.warn_count)).style(if entry.warn_count > 0 {
            theme.status_style(Status::Warn.into())
        } else {
            Style::default()
        }),
        Cell::from(count_cell(entry.error_count)).style(if entry.error_count > 0 {
            theme.status_style(Status::Error.into())
        } else {
            Style::default()
        }),
        Cell::from(
            entry
                .mean_response_time()
                .map(format_millis)
                .unwrap_or_else(|| "-".to_string()),
        ),
        Cell::from(
            latest
                .http_status
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
        ),
        Cell::from(last_check),
    ])
}

fn count_cell(n: u32) -> String {
    if n == 0 {
        "-".to_string()
    } else {
        n.to_string()
    }
}
