//! Row types exchanged with the backend.

use core::fmt;

use crate::{DateKey, Status};

/// Opaque identifier of a monitored service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service name and URL as embedded in a joined log row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub url: String,
}

/// One recorded health check, as stored in the status log table.
///
/// `timestamp` is kept in the backend's own text form and only interpreted
/// during aggregation, so a malformed value rejects this row alone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEvent {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<i64>,
    pub service_id: ServiceId,
    pub timestamp: String,
    pub status: Status,
    /// Milliseconds; `0` means the check produced no timing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub response_time: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub http_status: Option<u16>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: Option<String>,
    /// Embedded service row when the query joins `services`.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "services", skip_serializing_if = "Option::is_none")
    )]
    pub service: Option<ServiceRef>,
}

impl StatusEvent {
    /// Create an event with no auxiliary fields.
    pub fn new(service_id: impl Into<ServiceId>, timestamp: impl Into<String>, status: Status) -> Self {
        Self {
            id: None,
            service_id: service_id.into(),
            timestamp: timestamp.into(),
            status,
            response_time: 0,
            http_status: None,
            message: None,
            service: None,
        }
    }

    pub fn with_response_time(mut self, ms: u32) -> Self {
        self.response_time = ms;
        self
    }

    pub fn with_http_status(mut self, code: u16) -> Self {
        self.http_status = Some(code);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.service = Some(ServiceRef {
            name: name.into(),
            url: url.into(),
        });
        self
    }

    /// Response time if the check measured one.
    pub fn measured_response_time(&self) -> Option<u32> {
        (self.response_time > 0).then_some(self.response_time)
    }
}

/// Per-day, per-service rollup in the backend's summary-table shape.
///
/// Derived from [`crate::DailyBuckets`]; raw events remain the source of truth.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailySummary {
    pub date: DateKey,
    pub service_id: ServiceId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub service_name: Option<String>,
    pub worst_status: Status,
    pub ok_count: u32,
    pub warn_count: u32,
    pub error_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub avg_response_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_auxiliary_fields() {
        let event = StatusEvent::new("svc-1", "2025-12-28 06:07:09+00", Status::Warn)
            .with_response_time(3200)
            .with_http_status(200)
            .with_message("slow")
            .with_service("ArgoCD", "https://argo.example.com");

        assert_eq!(event.service_id.as_str(), "svc-1");
        assert_eq!(event.measured_response_time(), Some(3200));
        assert_eq!(event.http_status, Some(200));
        assert_eq!(event.service.as_ref().unwrap().name, "ArgoCD");
    }

    #[test]
    fn zero_response_time_is_unmeasured() {
        let event = StatusEvent::new("svc-1", "2025-12-28 06:07:09+00", Status::Error);
        assert_eq!(event.measured_response_time(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_backend_row() {
        let json = r#"{
            "id": 42,
            "service_id": "5b1f0c1e-0000-4000-8000-000000000001",
            "timestamp": "2025-12-28 06:07:09.312465+00",
            "status": "ERROR",
            "response_time": 0,
            "http_status": null,
            "message": "Connection timeout",
            "services": { "name": "Inspire Me", "url": "https://inspire.example.com" }
        }"#;

        let event: StatusEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, Some(42));
        assert_eq!(event.status, Status::Error);
        assert_eq!(event.http_status, None);
        assert_eq!(event.message.as_deref(), Some("Connection timeout"));
        assert_eq!(event.service.unwrap().name, "Inspire Me");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let json = r#"{"service_id": "a", "timestamp": "2025-12-28 06:07:09+00", "status": "DOWN"}"#;
        assert!(serde_json::from_str::<StatusEvent>(json).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn summary_serializes_date_key_as_text() {
        let summary = DailySummary {
            date: DateKey::from_ymd(2025, 12, 10).unwrap(),
            service_id: "a".into(),
            service_name: None,
            worst_status: Status::Warn,
            ok_count: 3,
            warn_count: 1,
            error_count: 0,
            avg_response_time: Some(120.5),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["date"], "2025-12-10");
        assert_eq!(value["worst_status"], "WARN");
    }
}
