//! Daily aggregation of status events.
//!
//! One pass over the events builds a map from [`DateKey`] to a [`DayBucket`]
//! holding one [`DailyBucketEntry`] per service. Calendar and strip cells then
//! read it with keyed lookups instead of re-scanning the event list per cell.
//!
//! ```text
//! [StatusEvent] ──normalize──▶ instant ──local_date_key──▶ DateKey
//!                                                              │
//!                         DailyBuckets { DateKey ─▶ DayBucket { ServiceId ─▶ entry } }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::warn;

use crate::{
    local_date_key, normalize, strip_dates, DailySummary, DateKey, DayStatus, ServiceId, Status,
    StatusEvent, TimestampError,
};

/// Auxiliary fields of one check, kept for the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDetail {
    pub at: DateTime<Utc>,
    pub status: Status,
    pub response_time: Option<u32>,
    pub http_status: Option<u16>,
    pub message: Option<String>,
}

impl CheckDetail {
    fn from_event(event: &StatusEvent, at: DateTime<Utc>) -> Self {
        Self {
            at,
            status: event.status,
            response_time: event.measured_response_time(),
            http_status: event.http_status,
            message: event.message.clone(),
        }
    }
}

/// Rollup of one service's checks on one day.
///
/// Only created from at least one check, so [`worst`](Self::worst) is
/// always a real status.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucketEntry {
    pub service_id: ServiceId,
    pub service_name: Option<String>,
    pub ok_count: u32,
    pub warn_count: u32,
    pub error_count: u32,
    response_total: u64,
    response_samples: u32,
    /// Earliest check of the day.
    pub first_check: DateTime<Utc>,
    /// Most recent check of the day.
    pub latest: CheckDetail,
}

impl DailyBucketEntry {
    fn open(event: &StatusEvent, at: DateTime<Utc>) -> Self {
        let mut entry = Self {
            service_id: event.service_id.clone(),
            service_name: event.service.as_ref().map(|s| s.name.clone()),
            ok_count: 0,
            warn_count: 0,
            error_count: 0,
            response_total: 0,
            response_samples: 0,
            first_check: at,
            latest: CheckDetail::from_event(event, at),
        };
        entry.record(event, at);
        entry
    }

    fn record(&mut self, event: &StatusEvent, at: DateTime<Utc>) {
        match event.status {
            Status::Ok => self.ok_count += 1,
            Status::Warn => self.warn_count += 1,
            Status::Error => self.error_count += 1,
        }

        if event.status != Status::Error {
            if let Some(ms) = event.measured_response_time() {
                self.response_total += u64::from(ms);
                self.response_samples += 1;
            }
        }

        if self.service_name.is_none() {
            self.service_name = event.service.as_ref().map(|s| s.name.clone());
        }
        if at < self.first_check {
            self.first_check = at;
        }
        if at >= self.latest.at {
            self.latest = CheckDetail::from_event(event, at);
        }
    }

    /// Worst status recorded for this service on this day.
    pub fn worst(&self) -> Status {
        if self.error_count > 0 {
            Status::Error
        } else if self.warn_count > 0 {
            Status::Warn
        } else {
            Status::Ok
        }
    }

    /// Number of checks with the given status.
    pub fn count(&self, status: Status) -> u32 {
        match status {
            Status::Ok => self.ok_count,
            Status::Warn => self.warn_count,
            Status::Error => self.error_count,
        }
    }

    pub fn total_checks(&self) -> u32 {
        self.ok_count + self.warn_count + self.error_count
    }

    /// Mean response time over non-error checks that measured one.
    pub fn mean_response_time(&self) -> Option<f64> {
        (self.response_samples > 0)
            .then(|| self.response_total as f64 / f64::from(self.response_samples))
    }

    /// Name if known, otherwise the raw service id.
    pub fn display_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or_else(|| self.service_id.as_str())
    }

    /// This rollup in summary-table form.
    pub fn to_summary(&self, date: DateKey) -> DailySummary {
        DailySummary {
            date,
            service_id: self.service_id.clone(),
            service_name: self.service_name.clone(),
            worst_status: self.worst(),
            ok_count: self.ok_count,
            warn_count: self.warn_count,
            error_count: self.error_count,
            avg_response_time: self.mean_response_time(),
        }
    }
}

/// All service rollups for one day, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DayBucket {
    entries: Vec<DailyBucketEntry>,
    index: HashMap<ServiceId, usize>,
}

impl DayBucket {
    fn merge(&mut self, event: &StatusEvent, at: DateTime<Utc>) {
        match self.index.get(&event.service_id) {
            Some(&i) => self.entries[i].record(event, at),
            None => {
                self.index.insert(event.service_id.clone(), self.entries.len());
                self.entries.push(DailyBucketEntry::open(event, at));
            }
        }
    }

    pub fn entries(&self) -> &[DailyBucketEntry] {
        &self.entries
    }

    pub fn get(&self, service: &ServiceId) -> Option<&DailyBucketEntry> {
        self.index.get(service).map(|&i| &self.entries[i])
    }

    /// Worst status across every service that reported this day.
    pub fn worst(&self) -> DayStatus {
        crate::worst(self.entries.iter().map(|e| e.worst())).into()
    }

    pub fn total_checks(&self) -> u32 {
        self.entries.iter().map(|e| e.total_checks()).sum()
    }
}

/// Immutable result of one aggregation pass.
///
/// Lookups by date are hash lookups, so painting N cells costs O(N)
/// regardless of how many events went in.
#[derive(Debug, Clone, Default)]
pub struct DailyBuckets {
    days: HashMap<DateKey, DayBucket>,
    event_count: usize,
}

impl DailyBuckets {
    /// An empty map; every lookup yields [`DayStatus::NoData`].
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, date: DateKey, event: &StatusEvent, at: DateTime<Utc>) {
        self.days.entry(date).or_default().merge(event, at);
        self.event_count += 1;
    }

    pub fn get(&self, date: &DateKey) -> Option<&DayBucket> {
        self.days.get(date)
    }

    /// Entries for a date; empty when nothing was recorded.
    pub fn entries(&self, date: &DateKey) -> &[DailyBucketEntry] {
        self.days.get(date).map(DayBucket::entries).unwrap_or(&[])
    }

    pub fn entry(&self, date: &DateKey, service: &ServiceId) -> Option<&DailyBucketEntry> {
        self.days.get(date)?.get(service)
    }

    /// Display state of one service on one day.
    pub fn status(&self, date: &DateKey, service: &ServiceId) -> DayStatus {
        self.entry(date, service)
            .map_or(DayStatus::NoData, |e| DayStatus::Reported(e.worst()))
    }

    /// Display state of one day across all services.
    pub fn day_status(&self, date: &DateKey) -> DayStatus {
        self.days.get(date).map_or(DayStatus::NoData, DayBucket::worst)
    }

    /// The last `days` days ending at `today`, oldest first, for one service.
    pub fn strip(
        &self,
        service: &ServiceId,
        today: NaiveDate,
        days: usize,
    ) -> Vec<(DateKey, DayStatus)> {
        strip_dates(today, days)
            .into_iter()
            .map(|date| (date, self.status(&date, service)))
            .collect()
    }

    /// Share of non-error checks for a service over the given dates.
    ///
    /// `None` when no check was recorded on any of them.
    pub fn uptime<I>(&self, service: &ServiceId, dates: I) -> Option<f64>
    where
        I: IntoIterator<Item = DateKey>,
    {
        let (up, total) = dates
            .into_iter()
            .filter_map(|date| self.entry(&date, service))
            .fold((0u64, 0u64), |(up, total), e| {
                (
                    up + u64::from(e.ok_count + e.warn_count),
                    total + u64::from(e.total_checks()),
                )
            });

        (total > 0).then(|| up as f64 / total as f64)
    }

    /// Dates that have at least one entry, in calendar order.
    pub fn dates(&self) -> Vec<DateKey> {
        let mut dates: Vec<DateKey> = self.days.keys().copied().collect();
        dates.sort();
        dates
    }

    /// Derived summary rows, ordered by date then first-seen service.
    pub fn summaries(&self) -> Vec<DailySummary> {
        self.dates()
            .into_iter()
            .flat_map(|date| self.entries(&date).iter().map(move |e| e.to_summary(date)))
            .collect()
    }

    /// Number of days with data.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of events that made it into a bucket.
    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

/// An event left out of aggregation because its timestamp was unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    /// Position in the input sequence.
    pub index: usize,
    pub service_id: ServiceId,
    pub error: TimestampError,
}

/// Output of [`aggregate`]: the bucket map plus every row that was left out.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub buckets: DailyBuckets,
    pub rejected: Vec<RejectedEvent>,
}

impl Aggregation {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Group events by viewer-local day and service in a single pass.
///
/// A malformed timestamp excludes that event only. It is logged and
/// returned in [`Aggregation::rejected`]; the rest of the batch still lands.
pub fn aggregate<'a, I, Tz>(events: I, zone: &Tz) -> Aggregation
where
    I: IntoIterator<Item = &'a StatusEvent>,
    Tz: TimeZone,
{
    let mut result = Aggregation::default();

    for (index, event) in events.into_iter().enumerate() {
        match normalize(&event.timestamp) {
            Ok(at) => {
                let date = local_date_key(&at, zone);
                result.buckets.insert(date, event, at);
            }
            Err(error) => {
                warn!(
                    index,
                    service_id = %event.service_id,
                    error = %error,
                    "Excluding status event with malformed timestamp"
                );
                result.rejected.push(RejectedEvent {
                    index,
                    service_id: event.service_id.clone(),
                    error,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn utc_plus(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    fn event(service: &str, ts: &str, status: Status) -> StatusEvent {
        StatusEvent::new(service, ts, status)
    }

    #[test]
    fn empty_input_gives_empty_map() {
        let result = aggregate(&Vec::<StatusEvent>::new(), &Utc);
        assert!(result.buckets.is_empty());
        assert!(result.is_clean());

        let day = key("2025-12-10");
        assert_eq!(result.buckets.day_status(&day), DayStatus::NoData);
        assert_eq!(result.buckets.status(&day, &"A".into()), DayStatus::NoData);
        assert!(result.buckets.entries(&day).is_empty());
    }

    #[test]
    fn counts_and_worst_for_one_day() {
        let events = vec![
            event("S", "2025-12-10 01:00:00+00", Status::Ok).with_response_time(100),
            event("S", "2025-12-10 02:00:00+00", Status::Ok).with_response_time(200),
            event("S", "2025-12-10 03:00:00+00", Status::Warn).with_response_time(3300),
            event("S", "2025-12-10 04:00:00+00", Status::Ok).with_response_time(0),
        ];

        let result = aggregate(&events, &Utc);
        let entry = result.buckets.entry(&key("2025-12-10"), &"S".into()).unwrap();

        assert_eq!(entry.worst(), Status::Warn);
        assert_eq!(entry.ok_count, 3);
        assert_eq!(entry.warn_count, 1);
        assert_eq!(entry.error_count, 0);
        assert_eq!(entry.total_checks(), 4);
        // The zero-timing check is left out of the mean.
        assert_eq!(entry.mean_response_time(), Some(1200.0));
    }

    #[test]
    fn error_checks_are_excluded_from_mean_response_time() {
        let events = vec![
            event("S", "2025-12-10 01:00:00+00", Status::Ok).with_response_time(100),
            event("S", "2025-12-10 02:00:00+00", Status::Error).with_response_time(10_000),
        ];
        let result = aggregate(&events, &Utc);
        let entry = result.buckets.entry(&key("2025-12-10"), &"S".into()).unwrap();
        assert_eq!(entry.mean_response_time(), Some(100.0));
    }

    #[test]
    fn mean_is_none_without_timed_checks() {
        let events = vec![event("S", "2025-12-10 01:00:00+00", Status::Error)];
        let result = aggregate(&events, &Utc);
        let entry = result.buckets.entry(&key("2025-12-10"), &"S".into()).unwrap();
        assert_eq!(entry.mean_response_time(), None);
    }

    #[test]
    fn buckets_by_viewer_local_day() {
        let events = vec![
            event("A", "2025-12-09 23:55:00+00", Status::Ok),
            event("A", "2025-12-10 00:05:00+00", Status::Error),
        ];

        let result = aggregate(&events, &utc_plus(9));
        let buckets = &result.buckets;

        assert_eq!(
            buckets.status(&key("2025-12-10"), &"A".into()),
            DayStatus::Reported(Status::Error)
        );
        assert_eq!(buckets.status(&key("2025-12-09"), &"A".into()), DayStatus::NoData);

        let entry = buckets.entry(&key("2025-12-10"), &"A".into()).unwrap();
        assert_eq!(entry.ok_count, 1);
        assert_eq!(entry.error_count, 1);
    }

    #[test]
    fn same_events_split_differently_in_utc() {
        let events = vec![
            event("A", "2025-12-09 23:55:00+00", Status::Ok),
            event("A", "2025-12-10 00:05:00+00", Status::Error),
        ];

        let result = aggregate(&events, &Utc);
        assert_eq!(
            result.buckets.status(&key("2025-12-09"), &"A".into()),
            DayStatus::Reported(Status::Ok)
        );
        assert_eq!(
            result.buckets.status(&key("2025-12-10"), &"A".into()),
            DayStatus::Reported(Status::Error)
        );
    }

    #[test]
    fn services_are_kept_apart_within_a_day() {
        let events = vec![
            event("A", "2025-12-10 01:00:00+00", Status::Ok).with_service("Alpha", "https://a"),
            event("B", "2025-12-10 01:00:00+00", Status::Warn),
            event("A", "2025-12-10 02:00:00+00", Status::Ok),
        ];

        let result = aggregate(&events, &Utc);
        let day = key("2025-12-10");
        let entries = result.buckets.entries(&day);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].service_id.as_str(), "A");
        assert_eq!(entries[0].display_name(), "Alpha");
        assert_eq!(entries[0].ok_count, 2);
        assert_eq!(entries[1].display_name(), "B");
        assert_eq!(result.buckets.day_status(&day), DayStatus::Reported(Status::Warn));
    }

    #[test]
    fn malformed_row_does_not_blank_the_batch() {
        let events = vec![
            event("A", "2025-12-10 01:00:00+00", Status::Ok),
            event("A", "not-a-date", Status::Error),
            event("B", "2025-12-11 01:00:00+00", Status::Warn),
        ];

        let result = aggregate(&events, &Utc);

        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 1);
        assert_eq!(result.rejected[0].error.raw(), "not-a-date");
        assert_eq!(result.buckets.event_count(), 2);

        // The bad ERROR row is not silently attributed to any day.
        assert_eq!(
            result.buckets.status(&key("2025-12-10"), &"A".into()),
            DayStatus::Reported(Status::Ok)
        );
        assert_eq!(
            result.buckets.status(&key("2025-12-11"), &"B".into()),
            DayStatus::Reported(Status::Warn)
        );
    }

    #[test]
    fn latest_check_tracks_most_recent_instant() {
        let events = vec![
            event("A", "2025-12-10 09:00:00+00", Status::Error)
                .with_http_status(503)
                .with_message("upstream down"),
            event("A", "2025-12-10 01:00:00+00", Status::Ok).with_http_status(200),
        ];

        let result = aggregate(&events, &Utc);
        let entry = result.buckets.entry(&key("2025-12-10"), &"A".into()).unwrap();

        assert_eq!(entry.latest.http_status, Some(503));
        assert_eq!(entry.latest.message.as_deref(), Some("upstream down"));
        assert_eq!(entry.first_check, normalize("2025-12-10 01:00:00+00").unwrap());
    }

    #[test]
    fn strip_fills_missing_days_with_no_data() {
        let events = vec![
            event("A", "2025-12-08 12:00:00+00", Status::Ok),
            event("A", "2025-12-10 12:00:00+00", Status::Warn),
        ];
        let result = aggregate(&events, &Utc);
        let today = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();

        let strip = result.buckets.strip(&"A".into(), today, 4);
        let cells: Vec<(String, DayStatus)> =
            strip.into_iter().map(|(d, s)| (d.to_string(), s)).collect();

        assert_eq!(
            cells,
            vec![
                ("2025-12-07".to_string(), DayStatus::NoData),
                ("2025-12-08".to_string(), DayStatus::Reported(Status::Ok)),
                ("2025-12-09".to_string(), DayStatus::NoData),
                ("2025-12-10".to_string(), DayStatus::Reported(Status::Warn)),
            ]
        );
    }

    #[test]
    fn uptime_counts_non_error_checks() {
        let events = vec![
            event("A", "2025-12-09 12:00:00+00", Status::Ok),
            event("A", "2025-12-09 13:00:00+00", Status::Warn),
            event("A", "2025-12-10 12:00:00+00", Status::Error),
            event("A", "2025-12-10 13:00:00+00", Status::Ok),
        ];
        let result = aggregate(&events, &Utc);
        let today = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();

        let uptime = result.buckets.uptime(&"A".into(), strip_dates(today, 90)).unwrap();
        assert!((uptime - 0.75).abs() < f64::EPSILON);

        assert_eq!(result.buckets.uptime(&"B".into(), strip_dates(today, 90)), None);
    }

    #[test]
    fn summaries_are_ordered_by_date() {
        let events = vec![
            event("A", "2025-12-11 12:00:00+00", Status::Ok),
            event("A", "2025-12-10 12:00:00+00", Status::Warn),
            event("B", "2025-12-10 13:00:00+00", Status::Error),
        ];
        let result = aggregate(&events, &Utc);
        let summaries = result.buckets.summaries();

        let rows: Vec<(String, &str, Status)> = summaries
            .iter()
            .map(|s| (s.date.to_string(), s.service_id.as_str(), s.worst_status))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("2025-12-10".to_string(), "A", Status::Warn),
                ("2025-12-10".to_string(), "B", Status::Error),
                ("2025-12-11".to_string(), "A", Status::Ok),
            ]
        );
    }
}
