//! Timestamp normalization and local calendar-date keys.
//!
//! The backend emits instants like `2025-12-28 06:07:09.312465+00`: a space
//! instead of `T`, and an hour-only UTC offset. Both are repaired before
//! RFC 3339 parsing. Day bucketing always uses the viewer's calendar fields,
//! because the UTC day and the local day differ near midnight.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

use crate::TimestampError;

/// Parse a backend timestamp into a UTC instant.
///
/// Accepts strict RFC 3339 plus the backend's variants: a space date/time
/// separator and `±HH` / `±HHMM` offsets. Text without any offset is
/// ambiguous and rejected.
///
/// ```rust
/// use statusboard_types::{canonical, normalize};
///
/// let instant = normalize("2025-12-28 06:07:09.312465+00").unwrap();
/// assert_eq!(canonical(&instant), "2025-12-28T06:07:09.312465Z");
/// assert!(normalize("not-a-date").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let repaired =
        repair(raw.trim()).ok_or_else(|| TimestampError::malformed(raw, "missing UTC offset"))?;

    DateTime::parse_from_rfc3339(&repaired)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TimestampError::malformed(raw, e.to_string()))
}

/// Canonical text form of an instant: RFC 3339 in UTC with a `Z` suffix.
///
/// `normalize(&canonical(&t))` always yields `t` again.
pub fn canonical(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Rewrite the backend's timestamp shape into RFC 3339.
///
/// Returns `None` when a time part is present but carries no offset.
fn repair(s: &str) -> Option<String> {
    let mut out = s.to_string();

    if out.as_bytes().get(10) == Some(&b' ') {
        out.replace_range(10..11, "T");
    }

    // Date-only or garbage input: leave it for the parser to reject.
    let Some(time) = out.get(11..) else {
        return Some(out);
    };
    if time.is_empty() || time.ends_with(|c| c == 'Z' || c == 'z') {
        return Some(out);
    }

    let sign_at = 11 + time.rfind(|c| c == '+' || c == '-')?;
    let digits = &out[sign_at + 1..];
    let fixed = match (digits.len(), digits.bytes().all(|b| b.is_ascii_digit())) {
        (2, true) => format!("{}:00", digits),
        (4, true) => format!("{}:{}", &digits[..2], &digits[2..]),
        _ => return Some(out),
    };
    out.replace_range(sign_at + 1.., &fixed);

    Some(out)
}

/// A calendar day in the viewer's timezone, displayed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from calendar fields; `None` for an invalid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl FromStr for DateKey {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| TimestampError::malformed(s, e.to_string()))
    }
}

/// The viewer-local calendar day an instant falls on.
///
/// `zone` is whatever the viewer sees as "today": `chrono::Local`, a
/// `FixedOffset`, or a named zone.
pub fn local_date_key<Tz: TimeZone>(instant: &DateTime<Utc>, zone: &Tz) -> DateKey {
    DateKey(instant.with_timezone(zone).date_naive())
}
