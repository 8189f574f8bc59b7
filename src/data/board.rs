//! Display model built from one batch of status data.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};

use statusboard_types::{
    normalize, strip_dates, CheckDetail, DailyBucketEntry, DailyBuckets, DateKey, DayStatus,
    OverallStatus, RejectedEvent, ServiceId,
};

use crate::config::ViewerZone;
use crate::source::Batch;

/// One service line on the dashboard.
#[derive(Debug, Clone)]
pub struct ServiceRow {
    pub id: ServiceId,
    pub name: String,
    pub url: Option<String>,
    pub threshold_ms: Option<u32>,
    /// Most recent check result; no data when never checked.
    pub current: DayStatus,
    pub last_checked: Option<DateTime<Utc>>,
    /// Share of non-error checks across the strip.
    pub uptime: Option<f64>,
    /// Oldest day first, ending today.
    pub strip: Vec<(DateKey, DayStatus)>,
}

/// Everything the views render, derived from a single [`Batch`].
#[derive(Debug, Clone)]
pub struct BoardData {
    pub generation: u64,
    pub today: NaiveDate,
    pub services: Vec<ServiceRow>,
    pub buckets: DailyBuckets,
    pub rejected: Vec<RejectedEvent>,
    pub overall: OverallStatus,
    pub last_updated: Instant,
}

impl BoardData {
    /// Aggregate a batch as seen from `zone` on `today`.
    pub fn build(batch: Batch, zone: &ViewerZone, today: NaiveDate, strip_days: usize) -> Self {
        let aggregation = zone.aggregate(&batch.events);
        let buckets = aggregation.buckets;
        let dates = buckets.dates();
        let strip_keys = strip_dates(today, strip_days);

        let latest_for = |id: &ServiceId| -> Option<&DailyBucketEntry> {
            dates.iter().rev().find_map(|date| buckets.entry(date, id))
        };

        let mut services = Vec::new();
        let mut seen = HashSet::new();

        for status in &batch.services {
            let id = status.service.id.clone();
            let latest = latest_for(&id).map(|e| &e.latest);

            services.push(ServiceRow {
                name: status.service.name.clone(),
                url: Some(status.service.url.clone()),
                threshold_ms: Some(status.service.threshold_ms),
                current: status
                    .current
                    .or_else(|| latest.map(|l| l.status))
                    .into(),
                last_checked: status
                    .last_checked
                    .as_deref()
                    .and_then(|raw| normalize(raw).ok())
                    .or_else(|| latest.map(|l| l.at)),
                uptime: buckets.uptime(&id, strip_keys.iter().copied()),
                strip: buckets.strip(&id, today, strip_days),
                id: id.clone(),
            });
            seen.insert(id);
        }

        // Services that only appear in the event log.
        for event in &batch.events {
            if !seen.insert(event.service_id.clone()) {
                continue;
            }
            let id = event.service_id.clone();
            let latest: Option<&CheckDetail> = latest_for(&id).map(|e| &e.latest);

            services.push(ServiceRow {
                name: event
                    .service
                    .as_ref()
                    .map_or_else(|| id.to_string(), |s| s.name.clone()),
                url: event.service.as_ref().map(|s| s.url.clone()),
                threshold_ms: None,
                current: latest.map(|l| l.status).into(),
                last_checked: latest.map(|l| l.at),
                uptime: buckets.uptime(&id, strip_keys.iter().copied()),
                strip: buckets.strip(&id, today, strip_days),
                id,
            });
        }

        let overall = OverallStatus::from_statuses(services.iter().map(|s| s.current));

        Self {
            generation: batch.generation,
            today,
            services,
            buckets,
            rejected: aggregation.rejected,
            overall,
            last_updated: Instant::now(),
        }
    }

    /// Count of services currently in each state: (ok, warn, error, no data).
    pub fn status_counts(&self) -> (usize, usize, usize, usize) {
        use statusboard_types::Status;

        self.services
            .iter()
            .fold((0, 0, 0, 0), |(ok, warn, err, none), s| match s.current {
                DayStatus::Reported(Status::Ok) => (ok + 1, warn, err, none),
                DayStatus::Reported(Status::Warn) => (ok, warn + 1, err, none),
                DayStatus::Reported(Status::Error) => (ok, warn, err + 1, none),
                DayStatus::NoData => (ok, warn, err, none + 1),
            })
    }

    pub fn today_key(&self) -> DateKey {
        DateKey::new(self.today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use statusboard_gateway::{Service, ServiceStatus};
    use statusboard_types::{Status, StatusEvent};

    fn seoul() -> ViewerZone {
        ViewerZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(id: &str, name: &str) -> ServiceStatus {
        ServiceStatus {
            service: Service {
                id: id.into(),
                name: name.to_string(),
                url: format!("https://{}.example.com", id),
                threshold_ms: 3000,
                created_at: None,
            },
            current: None,
            last_checked: None,
        }
    }

    #[test]
    fn test_event_only_services_are_listed() {
        let batch = Batch {
            generation: 4,
            events: vec![
                StatusEvent::new("a", "2025-12-09 23:55:00+00", Status::Ok)
                    .with_service("API", "https://a"),
                StatusEvent::new("a", "2025-12-10 00:05:00+00", Status::Error),
            ],
            services: Vec::new(),
        };

        let board = BoardData::build(batch, &seoul(), date(2025, 12, 10), 7);

        assert_eq!(board.generation, 4);
        assert_eq!(board.services.len(), 1);
        let row = &board.services[0];
        assert_eq!(row.name, "API");
        assert_eq!(row.current, DayStatus::Reported(Status::Error));
        assert_eq!(row.strip.len(), 7);
        assert_eq!(row.strip[6].1, DayStatus::Reported(Status::Error));
        assert_eq!(row.strip[5].1, DayStatus::NoData);
        assert_eq!(row.uptime, Some(0.5));
        assert_eq!(board.overall, OverallStatus::MajorOutage);
    }

    #[test]
    fn test_never_checked_service_shows_no_data() {
        let batch = Batch {
            generation: 1,
            events: vec![StatusEvent::new("a", "2025-12-10 01:00:00+00", Status::Ok)],
            services: vec![service("a", "API"), service("b", "Docs")],
        };

        let board = BoardData::build(batch, &seoul(), date(2025, 12, 10), 90);

        assert_eq!(board.services.len(), 2);
        assert_eq!(board.services[0].current, DayStatus::Reported(Status::Ok));
        assert_eq!(board.services[1].current, DayStatus::NoData);
        assert_eq!(board.services[1].uptime, None);
        assert!(board.services[1].strip.iter().all(|(_, s)| s.is_no_data()));
        // A service without data does not drag the banner down.
        assert_eq!(board.overall, OverallStatus::Operational);
        assert_eq!(board.status_counts(), (1, 0, 0, 1));
    }

    #[test]
    fn test_backend_latest_status_wins() {
        let mut svc = service("a", "API");
        svc.current = Some(Status::Warn);
        svc.last_checked = Some("2025-12-10 05:00:00+00".to_string());

        let batch = Batch {
            generation: 1,
            events: vec![StatusEvent::new("a", "2025-12-10 01:00:00+00", Status::Ok)],
            services: vec![svc],
        };
        let board = BoardData::build(batch, &seoul(), date(2025, 12, 10), 90);

        assert_eq!(board.services[0].current, DayStatus::Reported(Status::Warn));
        assert_eq!(
            board.services[0].last_checked,
            Some(normalize("2025-12-10 05:00:00+00").unwrap())
        );
        assert_eq!(board.overall, OverallStatus::PartialOutage);
    }

    #[test]
    fn test_rejected_rows_are_kept() {
        let batch = Batch {
            generation: 1,
            events: vec![
                StatusEvent::new("a", "garbage", Status::Error),
                StatusEvent::new("a", "2025-12-10 01:00:00+00", Status::Ok),
            ],
            services: Vec::new(),
        };
        let board = BoardData::build(batch, &seoul(), date(2025, 12, 10), 90);

        assert_eq!(board.rejected.len(), 1);
        assert_eq!(board.services[0].current, DayStatus::Reported(Status::Ok));
    }

    #[test]
    fn test_empty_batch() {
        let board = BoardData::build(Batch::default(), &seoul(), date(2025, 12, 10), 90);
        assert!(board.services.is_empty());
        assert_eq!(board.overall, OverallStatus::NoData);
    }
}
