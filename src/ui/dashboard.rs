//! Dashboard view rendering.
//!
//! An overall banner above a table of services, each with its current
//! status, time since the last check, uptime and a strip of recent days.

use std::cmp::Ordering;

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use statusboard_types::{DayStatus, Status};

use crate::app::App;
use crate::data::duration::format_ago;
use crate::data::ServiceRow;
use crate::ui::Theme;

const STRIP_CELL: &str = "■";

const NAME_WIDTH: u16 = 24;
const STATUS_WIDTH: u16 = 7;
const CHECKED_WIDTH: u16 = 10;
const UPTIME_WIDTH: u16 = 8;

/// Column to sort by in the Dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Name,
    Status,
    LastChecked,
    Uptime,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Status,
            SortColumn::Status => SortColumn::LastChecked,
            SortColumn::LastChecked => SortColumn::Uptime,
            SortColumn::Uptime => SortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Status => "status",
            SortColumn::LastChecked => "checked",
            SortColumn::Uptime => "uptime",
        }
    }
}

/// Severity rank with no data below OK.
fn severity(status: DayStatus) -> i8 {
    match status {
        DayStatus::NoData => -1,
        DayStatus::Reported(Status::Ok) => 0,
        DayStatus::Reported(Status::Warn) => 1,
        DayStatus::Reported(Status::Error) => 2,
    }
}

/// Sort services by the given column and direction, then by name.
pub fn sort_services_by(services: &mut [&ServiceRow], column: SortColumn, ascending: bool) {
    services.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::Status => severity(a.current).cmp(&severity(b.current)),
            SortColumn::LastChecked => a.last_checked.cmp(&b.last_checked),
            SortColumn::Uptime => a
                .uptime
                .partial_cmp(&b.uptime)
                .unwrap_or(Ordering::Equal),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.name.cmp(&b.name)
        } else {
            primary
        }
    });
}

/// Render the Dashboard: banner on top, service table below.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_placeholder(frame, app, area);
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).split(area);

    // Banner
    let overall = data.overall;
    let banner_style = app
        .theme
        .status_style(overall.day_status())
        .add_modifier(Modifier::BOLD);
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("● ", banner_style),
        Span::styled(overall.message(), banner_style),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.status_color(overall.day_status()))),
    );
    frame.render_widget(banner, chunks[0]);

    let services = app.visible_services();
    let strip_width = strip_width(chunks[1].width);

    let header = Row::new(vec![
        Cell::from(format_header("Service", SortColumn::Name, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from(format_header("Checked", SortColumn::LastChecked, app)),
        Cell::from(format_header("Uptime", SortColumn::Uptime, app)),
        Cell::from(format!("Last {} days", strip_width.min(app.options.strip_days))),
    ])
    .height(1)
    .style(app.theme.header);

    let now = Utc::now();
    let rows: Vec<Row> = services
        .iter()
        .map(|s| {
            let checked = s
                .last_checked
                .map(|t| format_ago((now - t).to_std().unwrap_or_default()))
                .unwrap_or_else(|| "-".to_string());
            let uptime = s
                .uptime
                .map(|u| format!("{:.2}%", u * 100.0))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(s.name.clone()),
                Cell::from(s.current.symbol()).style(app.theme.status_style(s.current)),
                Cell::from(checked),
                Cell::from(uptime),
                Cell::from(strip_line(&s.strip, strip_width, &app.theme)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(NAME_WIDTH),
        Constraint::Length(STATUS_WIDTH),
        Constraint::Length(CHECKED_WIDTH),
        Constraint::Length(UPTIME_WIDTH),
        Constraint::Fill(1),
    ];

    let selected = app.selected_service_index.min(services.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !services.is_empty() {
        format!(" [{}/{}]", selected + 1, services.len())
    } else {
        String::new()
    };

    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };
    let title = format!(
        " Services ({}/{}) [s:sort {}{}]{}{} ",
        services.len(),
        data.services.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !services.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.load_error {
        Some(ref err) => format!("Failed to load status data: {}\n\nPress r to retry", err),
        None => "Loading status data...".to_string(),
    };
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
    frame.render_widget(paragraph, area);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Cells left for the strip once borders, highlight symbol and fixed columns are taken.
fn strip_width(table_width: u16) -> usize {
    let fixed = 2 + 2 + NAME_WIDTH + STATUS_WIDTH + CHECKED_WIDTH + UPTIME_WIDTH + 4;
    table_width.saturating_sub(fixed) as usize
}

/// The most recent `width` days of a strip, one colored cell per day.
fn strip_line(
    strip: &[(statusboard_types::DateKey, DayStatus)],
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let skip = strip.len().saturating_sub(width);
    Line::from(
        strip[skip..]
            .iter()
            .map(|(_, status)| {
                Span::styled(STRIP_CELL, Style::default().fg(theme.status_color(*status)))
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusboard_types::DateKey;

    fn row(name: &str, current: DayStatus, uptime: Option<f64>) -> ServiceRow {
        ServiceRow {
            id: name.into(),
            name: name.to_string(),
            url: None,
            threshold_ms: None,
            current,
            last_checked: None,
            uptime,
            strip: Vec::new(),
        }
    }

    #[test]
    fn test_sort_by_status_puts_no_data_lowest() {
        let a = row("a", DayStatus::Reported(Status::Error), None);
        let b = row("b", DayStatus::NoData, None);
        let c = row("c", DayStatus::Reported(Status::Ok), None);
        let mut services = vec![&a, &b, &c];

        sort_services_by(&mut services, SortColumn::Status, true);
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        sort_services_by(&mut services, SortColumn::Status, false);
        assert_eq!(services[0].name, "a");
    }

    #[test]
    fn test_sort_by_uptime_ties_break_on_name() {
        let a = row("zeta", DayStatus::NoData, Some(0.5));
        let b = row("alpha", DayStatus::NoData, Some(0.5));
        let c = row("mid", DayStatus::NoData, Some(1.0));
        let mut services = vec![&a, &b, &c];

        sort_services_by(&mut services, SortColumn::Uptime, false);
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_sort_column_cycle() {
        let mut col = SortColumn::default();
        for _ in 0..4 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Name);
    }

    #[test]
    fn test_strip_line_keeps_most_recent_days() {
        let theme = Theme::dark();
        let day = |d| DateKey::from_ymd(2025, 12, d).unwrap();
        let strip = vec![
            (day(1), DayStatus::Reported(Status::Error)),
            (day(2), DayStatus::NoData),
            (day(3), DayStatus::Reported(Status::Ok)),
        ];

        let line = strip_line(&strip, 2, &theme);
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].style.fg, Some(theme.no_data));
        assert_eq!(line.spans[1].style.fg, Some(theme.ok));

        assert_eq!(strip_line(&strip, 10, &theme).spans.len(), 3);
    }

    #[test]
    fn test_strip_width_saturates() {
        assert_eq!(strip_width(10), 0);
        assert_eq!(strip_width(200), 200 - 57);
    }
}
