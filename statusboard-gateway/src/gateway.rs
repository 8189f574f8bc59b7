//! The seam between statusboard and its backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use statusboard_types::{ServiceId, StatusEvent};

use crate::{CheckResult, GatewayError, NewService, Service, ServiceStatus, ServiceUpdate};

/// Read and write access to services and their status logs.
///
/// Handed to callers explicitly; there is no process-wide client.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// All services, newest first.
    async fn list_services(&self) -> Result<Vec<Service>, GatewayError>;

    /// Status events at or after `since`, oldest first, with the service
    /// name and URL embedded.
    async fn fetch_events(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StatusEvent>, GatewayError>;

    /// Every service with its most recent check, if any.
    async fn latest_statuses(&self) -> Result<Vec<ServiceStatus>, GatewayError>;

    async fn create_service(&self, service: &NewService) -> Result<Service, GatewayError>;

    async fn update_service(
        &self,
        id: &ServiceId,
        update: &ServiceUpdate,
    ) -> Result<Service, GatewayError>;

    async fn delete_service(&self, id: &ServiceId) -> Result<Service, GatewayError>;

    /// Record one check result.
    async fn insert_event(&self, result: &CheckResult) -> Result<StatusEvent, GatewayError>;
}
