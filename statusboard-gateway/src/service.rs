//! Monitored service rows and admin input validation.

use serde::{Deserialize, Serialize};

use statusboard_types::{DayStatus, ServiceId, Status};

use crate::GatewayError;

/// Response time above which a successful check is reported as WARN.
pub const DEFAULT_THRESHOLD_MS: u32 = 3000;

/// A monitored service as stored in the `services` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub url: String,
    #[serde(default = "default_threshold")]
    pub threshold_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD_MS
}

/// Latest log fields embedded in a service row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct LatestLog {
    pub status: Status,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceWithLogs {
    #[serde(flatten)]
    pub service: Service,
    #[serde(default)]
    pub service_status_logs: Vec<LatestLog>,
}

/// A service together with its most recent check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub service: Service,
    /// `None` when the service has never been checked.
    pub current: Option<Status>,
    /// Backend timestamp text of the most recent check.
    pub last_checked: Option<String>,
}

impl ServiceStatus {
    /// Current state for display; never-checked services show as no data.
    pub fn day_status(&self) -> DayStatus {
        self.current.into()
    }
}

impl From<ServiceWithLogs> for ServiceStatus {
    fn from(row: ServiceWithLogs) -> Self {
        let latest = row.service_status_logs.into_iter().next();
        Self {
            service: row.service,
            current: latest.as_ref().map(|l| l.status),
            last_checked: latest.map(|l| l.timestamp),
        }
    }
}

/// Unvalidated input for creating a service.
#[derive(Debug, Clone, Default)]
pub struct ServiceInput {
    pub name: String,
    pub url: String,
    /// Defaults to [`DEFAULT_THRESHOLD_MS`].
    pub threshold_ms: Option<i64>,
}

/// Insert body for a validated new service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewService {
    pub name: String,
    pub url: String,
    pub threshold_ms: u32,
}

impl ServiceInput {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            threshold_ms: None,
        }
    }

    pub fn threshold_ms(mut self, threshold_ms: i64) -> Self {
        self.threshold_ms = Some(threshold_ms);
        self
    }

    /// Check the input and produce the row to insert.
    pub fn validate(&self) -> Result<NewService, GatewayError> {
        Ok(NewService {
            name: validate_name(&self.name)?,
            url: validate_url(&self.url)?,
            threshold_ms: match self.threshold_ms {
                Some(t) => validate_threshold(t)?,
                None => DEFAULT_THRESHOLD_MS,
            },
        })
    }
}

/// Partial update of a service; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_ms: Option<u32>,
}

impl ServiceUpdate {
    /// Validate the fields that are present.
    pub fn from_parts(
        name: Option<&str>,
        url: Option<&str>,
        threshold_ms: Option<i64>,
    ) -> Result<Self, GatewayError> {
        let update = Self {
            name: name.map(validate_name).transpose()?,
            url: url.map(validate_url).transpose()?,
            threshold_ms: threshold_ms.map(validate_threshold).transpose()?,
        };
        if update.is_empty() {
            return Err(GatewayError::Validation(
                "Nothing to update. Pass a name, URL or threshold.".to_string(),
            ));
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.threshold_ms.is_none()
    }
}

fn validate_name(name: &str) -> Result<String, GatewayError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GatewayError::Validation(
            "Please enter a service name.".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_url(url: &str) -> Result<String, GatewayError> {
    let url = url.trim();
    let invalid =
        || GatewayError::Validation("Please enter a valid URL format. (https:// or http://)".to_string());

    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(invalid()),
    }
}

fn validate_threshold(threshold_ms: i64) -> Result<u32, GatewayError> {
    u32::try_from(threshold_ms)
        .map_err(|_| GatewayError::Validation("Threshold must be 0 or greater.".to_string()))
}
