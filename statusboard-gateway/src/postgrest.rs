//! Gateway over a PostgREST-style REST API (as exposed by Supabase).
//!
//! Tables live under `{url}/rest/v1/`. Every request carries the project's
//! `apikey` header plus a bearer token: the signed-in user's access token
//! when one is configured, otherwise the API key itself.
//!
//! ## Example
//!
//! ```rust,no_run
//! use statusboard_gateway::{Gateway, PostgrestGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = PostgrestGateway::builder()
//!         .url("https://project.supabase.co")
//!         .api_key("anon-key")
//!         .build()?;
//!
//!     for status in gateway.latest_statuses().await? {
//!         println!("{}: {:?}", status.service.name, status.current);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use statusboard_types::{canonical, ServiceId, StatusEvent};

use crate::service::ServiceWithLogs;
use crate::{
    CheckResult, Gateway, GatewayError, NewService, Service, ServiceStatus, ServiceUpdate,
};

const SERVICES: &str = "services";
const STATUS_LOGS: &str = "service_status_logs";
const EVENT_SELECT: &str = "*,services:service_id(name,url)";
/// Newest first, with `id` breaking timestamp ties so offset pages stay stable.
const EVENT_ORDER: &str = "timestamp.desc,id.desc";

/// Postgres unique-violation code.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres insufficient-privilege code.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// REST gateway for the `services` and `service_status_logs` tables.
#[derive(Debug, Clone)]
pub struct PostgrestGateway {
    client: Client,
    url: String,
    api_key: String,
    access_token: Option<String>,
    page_size: usize,
    max_rows: usize,
}

impl PostgrestGateway {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> PostgrestGatewayBuilder {
        PostgrestGatewayBuilder::default()
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    /// Send a write that asks for the affected rows back, and insist on one.
    async fn write_one<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<T, GatewayError> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<T> = read_json(response).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::PermissionDenied(action.to_string()))
    }
}

#[async_trait]
impl Gateway for PostgrestGateway {
    async fn list_services(&self) -> Result<Vec<Service>, GatewayError> {
        let response = self
            .request(reqwest::Method::GET, SERVICES)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_events(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<StatusEvent>, GatewayError> {
        let mut events = Vec::new();
        let mut offset = 0;

        loop {
            let limit = self.page_size.min(self.max_rows - offset);
            let response = self
                .request(reqwest::Method::GET, STATUS_LOGS)
                .query(&events_query(since.as_ref(), limit, offset))
                .send()
                .await?;
            let page: Vec<StatusEvent> = read_json(response).await?;
            let received = page.len();
            debug!(offset, received, "Fetched status event page");

            events.extend(page);
            offset += received;

            if received < limit {
                break;
            }
            if offset >= self.max_rows {
                warn!(
                    max_rows = self.max_rows,
                    oldest = events.last().map(|e| e.timestamp.as_str()).unwrap_or("-"),
                    "Status event history truncated at row cap"
                );
                break;
            }
        }

        // Pages arrive newest first so the cap drops the oldest rows.
        events.reverse();
        Ok(events)
    }

    async fn latest_statuses(&self) -> Result<Vec<ServiceStatus>, GatewayError> {
        let response = self
            .request(reqwest::Method::GET, SERVICES)
            .query(&[
                ("select", "*,service_status_logs(status,timestamp)"),
                ("order", "created_at.desc"),
                ("service_status_logs.order", "timestamp.desc"),
                ("service_status_logs.limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<ServiceWithLogs> = read_json(response).await?;
        Ok(rows.into_iter().map(ServiceStatus::from).collect())
    }

    async fn create_service(&self, service: &NewService) -> Result<Service, GatewayError> {
        let request = self.request(reqwest::Method::POST, SERVICES).json(service);
        let created: Service = self.write_one(request, "create").await?;
        info!(id = %created.id, name = %created.name, "Created service");
        Ok(created)
    }

    async fn update_service(
        &self,
        id: &ServiceId,
        update: &ServiceUpdate,
    ) -> Result<Service, GatewayError> {
        let request = self
            .request(reqwest::Method::PATCH, SERVICES)
            .query(&[("id", eq(id))])
            .json(update);
        let updated: Service = self.write_one(request, "update").await?;
        info!(id = %updated.id, "Updated service");
        Ok(updated)
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<Service, GatewayError> {
        let request = self
            .request(reqwest::Method::DELETE, SERVICES)
            .query(&[("id", eq(id))]);
        let deleted: Service = self.write_one(request, "delete").await?;
        info!(id = %deleted.id, "Deleted service");
        Ok(deleted)
    }

    async fn insert_event(&self, result: &CheckResult) -> Result<StatusEvent, GatewayError> {
        let request = self.request(reqwest::Method::POST, STATUS_LOGS).json(result);
        self.write_one(request, "record a check for").await
    }
}

/// Builder for PostgrestGateway.
#[derive(Debug, Default)]
pub struct PostgrestGatewayBuilder {
    url: Option<String>,
    api_key: Option<String>,
    access_token: Option<String>,
    timeout: Option<Duration>,
    page_size: Option<usize>,
    max_rows: Option<usize>,
}

impl PostgrestGatewayBuilder {
    /// Set the project URL (e.g., "https://project.supabase.co").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the project API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Act as a signed-in user (needed for admin writes under row-level security).
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Rows per page when fetching events (default: 1000).
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Upper bound on events fetched in one load (default: 50000).
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<PostgrestGateway, GatewayError> {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GatewayError::Config("backend URL is not set".to_string()))?;
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::Config("backend API key is not set".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .build()?;

        Ok(PostgrestGateway {
            client,
            url: url.trim_end_matches('/').to_string(),
            api_key,
            access_token: self.access_token,
            page_size: self.page_size.unwrap_or(1000).max(1),
            max_rows: self.max_rows.unwrap_or(50_000).max(1),
        })
    }
}

fn eq(id: &ServiceId) -> String {
    format!("eq.{}", id)
}

/// Query pairs for one page of events.
fn events_query(
    since: Option<&DateTime<Utc>>,
    limit: usize,
    offset: usize,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", EVENT_SELECT.to_string()),
        ("order", EVENT_ORDER.to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
    ];
    if let Some(since) = since {
        query.push(("timestamp", format!("gte.{}", canonical(since))));
    }
    query
}

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a failed response to a gateway error.
fn error_from_response(status: StatusCode, body: &str) -> GatewayError {
    let api: ApiError = serde_json::from_str(body).unwrap_or_default();
    let message = api
        .message
        .unwrap_or_else(|| format!("API returned status {}", status));

    match api.code.as_deref() {
        Some(UNIQUE_VIOLATION) => {
            return GatewayError::Duplicate("This URL is already registered.".to_string())
        }
        Some(INSUFFICIENT_PRIVILEGE) => return GatewayError::Auth(message),
        _ => {}
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        GatewayError::Auth(message)
    } else {
        GatewayError::Http(message)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(error_from_response(status, &body));
    }

    Ok(serde_json::from_str(&body)?)
}
