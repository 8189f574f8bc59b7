//! Layered settings and the viewer's timezone.
//!
//! Settings come from an optional TOML file, then `STATUSBOARD_*` environment
//! variables (`__` separates sections, e.g. `STATUSBOARD_BACKEND__URL`), then
//! command-line flags applied by the binary.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;

use statusboard_types::{aggregate, Aggregation, StatusEvent};

use crate::data::duration::parse_interval;

/// All settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub view: ViewSettings,
    pub notify: NotifySettings,
}

/// Where status data lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    /// Signed-in user token for admin writes.
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub max_rows: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            access_token: None,
            timeout_secs: 10,
            page_size: 1000,
            max_rows: 50_000,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What the TUI shows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Days in each service's uptime strip.
    pub strip_days: usize,
    /// Months in the history calendar.
    pub calendar_months: usize,
    /// How far back to fetch events.
    pub history_days: i64,
    /// `local`, an IANA zone name, or a fixed `±HH:MM` offset.
    pub timezone: String,
    /// How often to re-fetch, e.g. `60s` or `5m`.
    pub refresh: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            strip_days: 90,
            calendar_months: 6,
            history_days: 365,
            timezone: "local".to_string(),
            refresh: "60s".to_string(),
        }
    }
}

impl ViewSettings {
    pub fn zone(&self) -> Result<ViewerZone> {
        self.timezone.parse()
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_interval(&self.refresh)
    }
}

/// Slack alert settings for `check`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub slack_token: Option<String>,
    pub slack_channel: Option<String>,
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("STATUSBOARD")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.backend.page_size == 0 {
            bail!("backend.page_size must be at least 1");
        }
        if self.view.history_days < 1 {
            bail!("view.history_days must be at least 1");
        }
        self.view.zone()?;
        self.view.refresh_interval()?;
        Ok(())
    }
}

/// The timezone whose calendar days the viewer sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerZone {
    /// The machine's local zone.
    Local,
    Fixed(FixedOffset),
    Named(chrono_tz::Tz),
}

impl ViewerZone {
    /// Group events into days as seen from this zone.
    pub fn aggregate(&self, events: &[StatusEvent]) -> Aggregation {
        match self {
            ViewerZone::Local => aggregate(events, &Local),
            ViewerZone::Fixed(offset) => aggregate(events, offset),
            ViewerZone::Named(tz) => aggregate(events, tz),
        }
    }

    /// The calendar date in this zone at `now`.
    pub fn date_at(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            ViewerZone::Local => now.with_timezone(&Local).date_naive(),
            ViewerZone::Fixed(offset) => now.with_timezone(offset).date_naive(),
            ViewerZone::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    /// Local wall-clock rendering of an instant.
    pub fn format(&self, instant: &DateTime<Utc>, fmt: &str) -> String {
        match self {
            ViewerZone::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            ViewerZone::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
            ViewerZone::Named(tz) => instant.with_timezone(tz).format(fmt).to_string(),
        }
    }
}

impl fmt::Display for ViewerZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerZone::Local => f.write_str("local"),
            ViewerZone::Fixed(offset) => write!(f, "{}", offset),
            ViewerZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for ViewerZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(ViewerZone::Local);
        }
        if s.starts_with('+') || s.starts_with('-') {
            return parse_offset(s).map(ViewerZone::Fixed);
        }
        s.parse::<chrono_tz::Tz>()
            .map(ViewerZone::Named)
            .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", s))
    }
}

/// Parse `±HH:MM` or `±HH`.
fn parse_offset(s: &str) -> Result<FixedOffset> {
    let sign = if s.starts_with('-') { -1 } else { 1 };
    let body = &s[1..];
    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None => (body, "0"),
    };

    let hours: i32 = hours
        .parse()
        .with_context(|| format!("Invalid UTC offset: {}", s))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("Invalid UTC offset: {}", s))?;
    if !(0..60).contains(&minutes) {
        bail!("Invalid UTC offset: {}", s);
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("UTC offset out of range: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend.timeout_secs, 10);
        assert_eq!(settings.backend.page_size, 1000);
        assert_eq!(settings.backend.max_rows, 50_000);
        assert_eq!(settings.view.strip_days, 90);
        assert_eq!(settings.view.calendar_months, 6);
        assert_eq!(settings.view.zone().unwrap(), ViewerZone::Local);
        assert_eq!(settings.view.refresh_interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[backend]
url = "https://project.supabase.co"
api_key = "anon"
page_size = 200

[view]
strip_days = 30
timezone = "Asia/Seoul"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.backend.url.as_deref(), Some("https://project.supabase.co"));
        assert_eq!(settings.backend.page_size, 200);
        // Unset keys keep their defaults.
        assert_eq!(settings.backend.max_rows, 50_000);
        assert_eq!(settings.view.strip_days, 30);
        assert_eq!(
            settings.view.zone().unwrap(),
            ViewerZone::Named(chrono_tz::Asia::Seoul)
        );
    }

    #[test]
    fn test_load_rejects_bad_timezone() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[view]\ntimezone = \"Mars/Olympus\"").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_parse_zones() {
        assert_eq!("LOCAL".parse::<ViewerZone>().unwrap(), ViewerZone::Local);
        assert_eq!(
            "+09:00".parse::<ViewerZone>().unwrap(),
            ViewerZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap())
        );
        assert_eq!(
            "-05:30".parse::<ViewerZone>().unwrap(),
            ViewerZone::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert_eq!(
            "-03".parse::<ViewerZone>().unwrap(),
            ViewerZone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap())
        );
        assert_eq!(
            "UTC".parse::<ViewerZone>().unwrap(),
            ViewerZone::Named(chrono_tz::UTC)
        );
        assert!("+9:75".parse::<ViewerZone>().is_err());
        assert!("+99:00".parse::<ViewerZone>().is_err());
        assert!("Nowhere/City".parse::<ViewerZone>().is_err());
    }

    #[test]
    fn test_date_at_follows_zone() {
        let now = Utc.with_ymd_and_hms(2025, 12, 9, 23, 55, 0).unwrap();
        let seoul = ViewerZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let utc = ViewerZone::Named(chrono_tz::UTC);

        assert_eq!(seoul.date_at(now), NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
        assert_eq!(utc.date_at(now), NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
    }

    #[test]
    fn test_aggregate_dispatches_to_zone() {
        let events = vec![
            StatusEvent::new("A", "2025-12-09 23:55:00+00", statusboard_types::Status::Ok),
            StatusEvent::new("A", "2025-12-10 00:05:00+00", statusboard_types::Status::Error),
        ];
        let seoul = ViewerZone::Named(chrono_tz::Asia::Seoul);
        let result = seoul.aggregate(&events);
        assert_eq!(result.buckets.len(), 1);
        assert_eq!(result.buckets.dates()[0].to_string(), "2025-12-10");
    }
}
