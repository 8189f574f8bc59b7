//! JSON export of derived daily summaries.
//!
//! Raw events stay the source of truth; everything written here is recomputed
//! from a [`BoardData`] on each export.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use statusboard_types::{DailySummary, RejectedEvent};

use super::BoardData;
use crate::config::ViewerZone;

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub generated_at: String,
    pub timezone: String,
    pub summary: ExportSummary,
    pub services: Vec<ExportService>,
    pub daily: Vec<DailySummary>,
    pub rejected: Vec<ExportRejected>,
}

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub overall: &'static str,
    pub total_services: usize,
    pub ok: usize,
    pub warn: usize,
    pub error: usize,
    pub no_data: usize,
    pub days: usize,
    pub events: usize,
}

#[derive(Debug, Serialize)]
pub struct ExportService {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub current: &'static str,
    pub last_checked: Option<String>,
    pub uptime: Option<f64>,
}

/// An event that could not be placed on a day.
#[derive(Debug, Serialize)]
pub struct ExportRejected {
    pub index: usize,
    pub service_id: String,
    pub timestamp: String,
    pub reason: String,
}

impl From<&RejectedEvent> for ExportRejected {
    fn from(rejected: &RejectedEvent) -> Self {
        Self {
            index: rejected.index,
            service_id: rejected.service_id.to_string(),
            timestamp: rejected.error.raw().to_string(),
            reason: rejected.error.to_string(),
        }
    }
}

impl ExportDocument {
    pub fn from_board(board: &BoardData, zone: &ViewerZone) -> Self {
        let (ok, warn, error, no_data) = board.status_counts();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            timezone: zone.to_string(),
            summary: ExportSummary {
                overall: board.overall.message(),
                total_services: board.services.len(),
                ok,
                warn,
                error,
                no_data,
                days: board.buckets.len(),
                events: board.buckets.event_count(),
            },
            services: board
                .services
                .iter()
                .map(|s| ExportService {
                    id: s.id.to_string(),
                    name: s.name.clone(),
                    url: s.url.clone(),
                    current: s.current.symbol(),
                    last_checked: s.last_checked.map(|t| t.to_rfc3339()),
                    uptime: s.uptime,
                })
                .collect(),
            daily: board.buckets.summaries(),
            rejected: board.rejected.iter().map(ExportRejected::from).collect(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Batch;
    use chrono::{FixedOffset, NaiveDate};
    use statusboard_types::{Status, StatusEvent};

    fn board() -> (BoardData, ViewerZone) {
        let zone = ViewerZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let batch = Batch {
            generation: 1,
            events: vec![
                StatusEvent::new("a", "2025-12-09 01:00:00+00", Status::Ok).with_response_time(100),
                StatusEvent::new("a", "2025-12-10 01:00:00+00", Status::Warn)
                    .with_response_time(4000),
                StatusEvent::new("b", "not a time", Status::Error),
            ],
            services: Vec::new(),
        };
        let today = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        (BoardData::build(batch, &zone, today, 90), zone)
    }

    #[test]
    fn test_document_contents() {
        let (board, zone) = board();
        let doc = ExportDocument::from_board(&board, &zone);

        assert_eq!(doc.timezone, "+09:00");
        assert_eq!(doc.summary.overall, "Partial Outage");
        assert_eq!(doc.summary.total_services, 2);
        assert_eq!(doc.summary.warn, 1);
        assert_eq!(doc.summary.no_data, 1);
        assert_eq!(doc.summary.days, 2);
        assert_eq!(doc.summary.events, 2);
        assert_eq!(doc.daily.len(), 2);
        assert_eq!(doc.daily[1].worst_status, Status::Warn);
        assert_eq!(doc.rejected.len(), 1);
        assert_eq!(doc.rejected[0].index, 2);
        assert_eq!(doc.rejected[0].timestamp, "not a time");
    }

    #[test]
    fn test_write_to_file() {
        let (board, zone) = board();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        ExportDocument::from_board(&board, &zone).write_to(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["total_services"], 2);
        assert_eq!(value["daily"][0]["date"], "2025-12-09");
        assert_eq!(value["services"][0]["current"], "WARN");
    }
}
