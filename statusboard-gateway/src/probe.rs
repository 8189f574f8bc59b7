//! HTTP health probes and the one-shot check run.
//!
//! A run probes every service once, records the result, and notifies when a
//! service moves into WARN or ERROR from a different state.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use statusboard_types::{ServiceId, Status};

use crate::{Gateway, GatewayError, Service, SlackNotifier};

/// Map a completed probe to a status.
///
/// Any HTTP status of 400 or above is an ERROR regardless of timing; a
/// response slower than `threshold_ms` is a WARN.
pub fn classify(http_status: u16, response_time_ms: u32, threshold_ms: u32) -> Status {
    if http_status >= 400 {
        Status::Error
    } else if response_time_ms > threshold_ms {
        Status::Warn
    } else {
        Status::Ok
    }
}

/// Outcome of probing one service, in the log table's insert shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub service_id: ServiceId,
    pub status: Status,
    pub response_time: u32,
    pub http_status: Option<u16>,
    pub message: Option<String>,
}

impl CheckResult {
    /// Result for a probe that got an HTTP response.
    pub fn completed(service: &Service, http_status: u16, response_time: u32) -> Self {
        Self {
            service_id: service.id.clone(),
            status: classify(http_status, response_time, service.threshold_ms),
            response_time,
            http_status: Some(http_status),
            message: None,
        }
    }

    /// Result for a probe that never got a response.
    pub fn failed(service: &Service, response_time: u32, message: impl Into<String>) -> Self {
        Self {
            service_id: service.id.clone(),
            status: Status::Error,
            response_time,
            http_status: None,
            message: Some(message.into()),
        }
    }

    /// Whether this result should trigger a notification.
    pub fn needs_alert(&self, previous: Option<Status>) -> bool {
        previous != Some(self.status) && self.status != Status::Ok
    }
}

/// Issues GET requests against service URLs.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    /// Create a prober with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Probe one service. Never fails: transport errors become ERROR results.
    pub async fn probe(&self, service: &Service) -> CheckResult {
        let start = Instant::now();
        let outcome = self.client.get(&service.url).send().await;
        let elapsed = u32::try_from(start.elapsed().as_millis()).unwrap_or(u32::MAX);

        match outcome {
            Ok(response) => CheckResult::completed(service, response.status().as_u16(), elapsed),
            Err(err) => CheckResult::failed(service, elapsed, err.to_string()),
        }
    }
}

/// Per-service line of a check run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub service: Service,
    pub result: CheckResult,
    pub previous: Option<Status>,
    pub saved: bool,
    pub notified: bool,
}

impl CheckOutcome {
    pub fn changed(&self) -> bool {
        self.previous != Some(self.result.status)
    }
}

/// Probe every service once, record each result and send alerts.
///
/// A failure to save one result does not stop the run.
pub async fn run_checks(
    gateway: &dyn Gateway,
    prober: &Prober,
    notifier: Option<&SlackNotifier>,
) -> Result<Vec<CheckOutcome>, GatewayError> {
    let statuses = gateway.latest_statuses().await?;
    if statuses.is_empty() {
        info!("No services found");
        return Ok(Vec::new());
    }
    info!(count = statuses.len(), "Checking services");

    let mut outcomes = Vec::with_capacity(statuses.len());
    for status in statuses {
        let previous = status.current;
        let service = status.service;
        let result = prober.probe(&service).await;

        info!(
            service = %service.name,
            status = %result.status,
            response_time = result.response_time,
            http_status = ?result.http_status,
            changed = previous != Some(result.status),
            "Checked service"
        );

        let saved = match gateway.insert_event(&result).await {
            Ok(_) => true,
            Err(e) => {
                warn!(service = %service.name, error = %e, "Failed to save check result");
                false
            }
        };

        let mut notified = false;
        if result.needs_alert(previous) {
            if let Some(notifier) = notifier {
                match notifier.notify(&result, &service).await {
                    Ok(()) => notified = true,
                    Err(e) => warn!(service = %service.name, error = %e, "Slack notification failed"),
                }
            }
        }

        outcomes.push(CheckOutcome {
            service,
            result,
            previous,
            saved,
            notified,
        });
    }

    Ok(outcomes)
}
