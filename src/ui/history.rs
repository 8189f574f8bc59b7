//! History view rendering.
//!
//! Shows the last few months as calendars. Each day is colored by the worst
//! status recorded across all services that day; days without any check keep
//! their own grey and are never shown as OK.

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use statusboard_types::{recent_months, DateKey, DayStatus, MonthGrid, Status, WEEKDAYS};

use crate::app::App;
use crate::data::BoardData;
use crate::ui::Theme;

/// One month box: seven 3-char cells plus borders.
const MONTH_WIDTH: u16 = 7 * 3 + 2;
/// Title row, weekday row and up to six weeks, plus borders.
const MONTH_HEIGHT: u16 = 1 + 6 + 2;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        frame.render_widget(
            Paragraph::new(" Loading status data...").block(outer_block(app, " History ")),
            area,
        );
        return;
    };

    let outer = outer_block(app, " History [←↓↑→ move day, Enter:detail] ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::vertical([Constraint::Min(MONTH_HEIGHT), Constraint::Length(2)])
        .split(inner);

    let months = recent_months(data.today, app.options.calendar_months);
    let per_row = (chunks[0].width / (MONTH_WIDTH + 1)).max(1) as usize;
    let cursor = app.cursor_date();

    // Newest months first so the current month is always visible.
    let ordered: Vec<_> = months.iter().rev().collect();
    for (i, month) in ordered.iter().enumerate() {
        let col = (i % per_row) as u16;
        let row = (i / per_row) as u16;
        let x = chunks[0].x + col * (MONTH_WIDTH + 1);
        let y = chunks[0].y + row * MONTH_HEIGHT;
        if y + MONTH_HEIGHT > chunks[0].y + chunks[0].height {
            break;
        }

        let grid = MonthGrid::new(**month);
        let mut lines = vec![Line::from(
            WEEKDAYS
                .iter()
                .map(|d| Span::styled(format!("{:>2} ", &d[..2]), app.theme.header))
                .collect::<Vec<_>>(),
        )];
        for week in grid.weeks() {
            lines.push(Line::from(
                week.iter()
                    .map(|day| match day {
                        Some(date) => day_cell(data, date.date(), cursor, &app.theme),
                        None => Span::raw("   "),
                    })
                    .collect::<Vec<_>>(),
            ));
        }

        let block = Block::default()
            .title(format!(" {} ", month.title()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let month_area = Rect::new(x, y, MONTH_WIDTH, MONTH_HEIGHT);
        frame.render_widget(Paragraph::new(lines).block(block), month_area);
    }

    frame.render_widget(Paragraph::new(footer(data, cursor, &app.theme)), chunks[1]);
}

fn outer_block(app: &App, title: &str) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// The status a calendar day shows; days after today have none.
fn day_status(data: &BoardData, date: NaiveDate) -> Option<DayStatus> {
    if date > data.today {
        return None;
    }
    Some(data.buckets.day_status(&DateKey::new(date)))
}

fn day_cell(data: &BoardData, date: NaiveDate, cursor: NaiveDate, theme: &Theme) -> Span<'static> {
    let text = format!("{:>2} ", date.day());
    let mut style = match day_status(data, date) {
        None => Style::default().add_modifier(Modifier::DIM),
        Some(DayStatus::NoData) => Style::default().fg(theme.no_data),
        Some(status) => theme.cell_style(status).fg(Color::Black),
    };
    if date == cursor {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED | Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn footer(data: &BoardData, cursor: NaiveDate, theme: &Theme) -> Vec<Line<'static>> {
    let key: DateKey = cursor.into();
    let status = data.buckets.day_status(&key);
    let entries = data.buckets.entries(&key);
    let checks: u32 = entries.iter().map(|e| e.total_checks()).sum();

    let summary = if status.is_no_data() {
        format!(" {}: no data recorded", key)
    } else {
        format!(
            " {}: {} ({} services, {} checks)",
            key,
            status.label(),
            entries.len(),
            checks
        )
    };

    let legend = Line::from(vec![
        Span::raw(" "),
        Span::styled("  ", theme.cell_style(Status::Ok.into())),
        Span::raw(" OK  "),
        Span::styled("  ", theme.cell_style(Status::Warn.into())),
        Span::raw(" WARN  "),
        Span::styled("  ", theme.cell_style(Status::Error.into())),
        Span::raw(" ERROR  "),
        Span::styled("  ", theme.cell_style(DayStatus::NoData)),
        Span::raw(" no data"),
    ]);

    vec![
        Line::from(Span::styled(
            summary,
            theme.status_style(status).add_modifier(Modifier::BOLD),
        )),
        legend,
    ]
}
