//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use statusboard_types::{DayStatus, Status};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub ok: Color,
    pub warn: Color,
    pub error: Color,
    /// Days and services without any recorded check. Never the OK color.
    pub no_data: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            ok: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            no_data: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            ok: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            no_data: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn status_color(&self, status: DayStatus) -> Color {
        match status {
            DayStatus::NoData => self.no_data,
            DayStatus::Reported(Status::Ok) => self.ok,
            DayStatus::Reported(Status::Warn) => self.warn,
            DayStatus::Reported(Status::Error) => self.error,
        }
    }

    /// Text style for a status label.
    pub fn status_style(&self, status: DayStatus) -> Style {
        let style = Style::default().fg(self.status_color(status));
        match status {
            DayStatus::Reported(Status::Error) => style.add_modifier(Modifier::BOLD),
            DayStatus::NoData => style.add_modifier(Modifier::DIM),
            _ => style,
        }
    }

    /// Background fill for a strip or calendar cell.
    pub fn cell_style(&self, status: DayStatus) -> Style {
        Style::default().bg(self.status_color(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_is_never_ok_color() {
        for theme in [Theme::dark(), Theme::light()] {
            assert_ne!(theme.status_color(DayStatus::NoData), theme.ok);
            assert_eq!(theme.status_color(Status::Ok.into()), theme.ok);
            assert_eq!(theme.cell_style(Status::Error.into()).bg, Some(theme.error));
        }
    }
}
