//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use statusboard_types::{recent_months, DateKey};

use crate::config::{Settings, ViewerZone};
use crate::data::{BoardData, ExportDocument, ServiceRow};
use crate::source::DataSource;
use crate::ui::dashboard::{sort_services_by, SortColumn};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Day detail is an overlay (`App::show_detail_overlay`), not a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Overall banner plus one row per service with its uptime strip.
    Dashboard,
    /// Month calendars of the worst status per day.
    History,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::History,
            View::History => View::Dashboard,
        }
    }

    pub fn prev(self) -> Self {
        // Two views, so both directions land on the other one.
        self.next()
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::History => "History",
        }
    }
}

/// View-related settings fixed for the lifetime of the app.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub zone: ViewerZone,
    pub strip_days: usize,
    pub calendar_months: usize,
    pub export_path: PathBuf,
}

impl ViewOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            zone: settings.view.zone()?,
            strip_days: settings.view.strip_days,
            calendar_months: settings.view.calendar_months,
            export_path: PathBuf::from("statusboard_export.json"),
        })
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            zone: ViewerZone::Local,
            strip_days: 90,
            calendar_months: 6,
            export_path: PathBuf::from("statusboard_export.json"),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<BoardData>,
    pub load_error: Option<String>,
    pub options: ViewOptions,

    // Navigation state
    pub selected_service_index: usize,
    pub selected_date: Option<NaiveDate>,

    // Sorting (Dashboard view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, options: ViewOptions) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            load_error: None,
            options,
            selected_service_index: 0,
            selected_date: None,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for a new batch.
    ///
    /// Returns true if new data was applied. A source error is recorded
    /// but the last good data stays on screen.
    pub fn reload_data(&mut self) -> bool {
        let batch = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(batch) = batch else {
            return false;
        };

        let today = self.options.zone.today();
        let data = BoardData::build(batch, &self.options.zone, today, self.options.strip_days);
        debug!(
            generation = data.generation,
            services = data.services.len(),
            rejected = data.rejected.len(),
            "Applied new batch"
        );

        let count = self.visible_count(&data);
        if self.selected_service_index >= count {
            self.selected_service_index = count.saturating_sub(1);
        }
        self.data = Some(data);
        self.clamp_selected_date();
        true
    }

    /// Ask the source for fresh data; it arrives on a later [`reload_data`](Self::reload_data).
    pub fn request_refresh(&mut self) {
        info!(source = self.source.description(), "Refresh requested");
        self.source.refresh();
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Viewer-local today, from the data if loaded.
    pub fn today(&self) -> NaiveDate {
        self.data
            .as_ref()
            .map_or_else(|| self.options.zone.today(), |d| d.today)
    }

    /// The oldest date shown in the history calendar.
    pub fn earliest_date(&self) -> NaiveDate {
        let today = self.today();
        recent_months(today, self.options.calendar_months)
            .first()
            .and_then(|m| m.first_day())
            .unwrap_or(today)
    }

    /// The day the History cursor is on; today until moved.
    pub fn cursor_date(&self) -> NaiveDate {
        self.selected_date.unwrap_or_else(|| self.today())
    }

    /// The day the detail overlay describes.
    pub fn detail_date(&self) -> DateKey {
        match self.current_view {
            View::History => DateKey::new(self.cursor_date()),
            View::Dashboard => DateKey::new(self.today()),
        }
    }

    /// Move the History cursor by `days`, staying inside the calendar.
    pub fn move_date(&mut self, days: i64) {
        let current = self.cursor_date();
        let step = Days::new(days.unsigned_abs());
        let moved = if days >= 0 {
            current.checked_add_days(step)
        } else {
            current.checked_sub_days(step)
        };
        if let Some(date) = moved {
            self.selected_date = Some(date.clamp(self.earliest_date(), self.today()));
        }
    }

    fn clamp_selected_date(&mut self) {
        if let Some(date) = self.selected_date {
            self.selected_date = Some(date.clamp(self.earliest_date(), self.today()));
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move down by n services, or forward by n weeks in History.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Dashboard => {
                if let Some(ref data) = self.data {
                    let max = self.visible_count(data).saturating_sub(1);
                    self.selected_service_index = (self.selected_service_index + n).min(max);
                }
            }
            View::History => self.move_date(7 * n as i64),
        }
    }

    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Dashboard => {
                self.selected_service_index = self.selected_service_index.saturating_sub(n);
            }
            View::History => self.move_date(-7 * n as i64),
        }
    }

    pub fn select_first(&mut self) {
        match self.current_view {
            View::Dashboard => self.selected_service_index = 0,
            View::History => self.selected_date = Some(self.earliest_date()),
        }
    }

    pub fn select_last(&mut self) {
        match self.current_view {
            View::Dashboard => {
                if let Some(ref data) = self.data {
                    self.selected_service_index = self.visible_count(data).saturating_sub(1);
                }
            }
            View::History => self.selected_date = None,
        }
    }

    fn visible_count(&self, data: &BoardData) -> usize {
        data.services
            .iter()
            .filter(|s| self.matches_filter(&s.name))
            .count()
    }

    /// Services after filtering and sorting, in display order.
    pub fn visible_services(&self) -> Vec<&ServiceRow> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut services: Vec<&ServiceRow> = data
            .services
            .iter()
            .filter(|s| self.matches_filter(&s.name))
            .collect();
        sort_services_by(&mut services, self.sort_column, self.sort_ascending);
        services
    }

    pub fn selected_service(&self) -> Option<&ServiceRow> {
        self.visible_services()
            .get(self.selected_service_index)
            .copied()
    }

    pub fn enter_detail(&mut self) {
        self.show_detail_overlay = true;
    }

    /// Close an overlay first, otherwise return to the Dashboard.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        self.current_view = View::Dashboard;
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_service_index = 0;
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Case-insensitive substring match on the service name.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current board to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        ExportDocument::from_board(data, &self.options.zone).write_to(path)?;
        info!(path = %path.display(), "Exported board");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use chrono::FixedOffset;
    use statusboard_types::{Status, StatusEvent};

    fn app_with(events: Vec<StatusEvent>) -> (App, tokio::sync::watch::Sender<Vec<StatusEvent>>) {
        let (tx, source) = ChannelSource::create("test");
        let options = ViewOptions {
            zone: ViewerZone::Fixed(FixedOffset::east_opt(0).unwrap()),
            ..ViewOptions::default()
        };
        let mut app = App::new(Box::new(source), options);
        tx.send(events).unwrap();
        assert!(app.reload_data());
        (app, tx)
    }

    fn now_event(id: &str, name: &str, status: Status) -> StatusEvent {
        let now = statusboard_types::canonical(&chrono::Utc::now());
        StatusEvent::new(id, now, status).with_service(name, format!("https://{}", id))
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dashboard.next(), View::History);
        assert_eq!(View::History.next(), View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::History);
        assert_eq!(View::History.label(), "History");
    }

    #[test]
    fn test_reload_applies_batch() {
        let (app, _tx) = app_with(vec![
            now_event("a", "Billing", Status::Ok),
            now_event("b", "Auth", Status::Error),
        ]);

        let data = app.data.as_ref().unwrap();
        assert_eq!(data.services.len(), 2);
        // Default sort is by name.
        let names: Vec<_> = app.visible_services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Auth", "Billing"]);
    }

    #[test]
    fn test_selection_clamps() {
        let (mut app, _tx) = app_with(vec![
            now_event("a", "Billing", Status::Ok),
            now_event("b", "Auth", Status::Ok),
        ]);

        app.select_next_n(10);
        assert_eq!(app.selected_service_index, 1);
        app.select_prev_n(10);
        assert_eq!(app.selected_service_index, 0);
        app.select_last();
        assert_eq!(app.selected_service().unwrap().name, "Billing");
    }

    #[test]
    fn test_filter_limits_services() {
        let (mut app, _tx) = app_with(vec![
            now_event("a", "Billing", Status::Ok),
            now_event("b", "Auth", Status::Ok),
        ]);

        app.filter_push('B');
        app.filter_push('i');
        assert_eq!(app.visible_services().len(), 1);
        assert_eq!(app.selected_service().unwrap().name, "Billing");

        app.clear_filter();
        assert_eq!(app.visible_services().len(), 2);
    }

    #[test]
    fn test_history_cursor_stays_in_range() {
        let (mut app, _tx) = app_with(vec![now_event("a", "Billing", Status::Ok)]);
        app.set_view(View::History);
        let today = app.today();

        // Cannot move into the future.
        app.move_date(3);
        assert_eq!(app.cursor_date(), today);

        app.select_prev();
        assert_eq!(app.cursor_date(), today - Days::new(7));
        assert_eq!(app.detail_date(), DateKey::new(today - Days::new(7)));

        app.select_first();
        assert_eq!(app.cursor_date(), app.earliest_date());
        app.move_date(-1);
        assert_eq!(app.cursor_date(), app.earliest_date());

        app.select_last();
        assert_eq!(app.cursor_date(), today);
    }

    #[test]
    fn test_go_back_closes_overlay_first() {
        let (mut app, _tx) = app_with(Vec::new());
        app.set_view(View::History);
        app.enter_detail();

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::History);

        app.go_back();
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_export_requires_data() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), ViewOptions::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("out.json")).is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let (app, _tx) = app_with(vec![now_event("a", "Billing", Status::Warn)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        app.export_state(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_status_message_expires() {
        let (mut app, _tx) = app_with(Vec::new());
        app.set_status_message("Exported".to_string());
        assert_eq!(app.get_status_message(), Some("Exported"));

        app.status_message = Some((
            "old".to_string(),
            Instant::now() - Duration::from_secs(5),
        ));
        assert!(app.get_status_message().is_none());
    }

    #[test]
    fn test_no_new_batch_keeps_data() {
        let (mut app, _tx) = app_with(vec![now_event("a", "Billing", Status::Ok)]);
        assert!(!app.reload_data());
        assert!(app.data.is_some());
    }
}
