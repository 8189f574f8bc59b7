//! Slack alerts for services entering WARN or ERROR.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use statusboard_types::Status;

use crate::{CheckResult, GatewayError, Service};

const SLACK_API: &str = "https://slack.com/api";

/// Posts alerts to one Slack channel with a bot token.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    api_url: String,
    token: String,
    channel: String,
}

impl SlackNotifier {
    /// Create a notifier for `channel` using bot `token`.
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            api_url: SLACK_API.to_string(),
            token: token.into(),
            channel: channel.into(),
        })
    }

    /// Build a notifier only when both settings are present.
    pub fn from_settings(
        token: Option<&str>,
        channel: Option<&str>,
    ) -> Result<Option<Self>, GatewayError> {
        match (token, channel) {
            (Some(token), Some(channel)) if !token.is_empty() && !channel.is_empty() => {
                Self::new(token, channel).map(Some)
            }
            _ => {
                info!("Slack token or channel not set, skipping notifications");
                Ok(None)
            }
        }
    }

    /// Override the API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Post an alert for `result`.
    pub async fn notify(&self, result: &CheckResult, service: &Service) -> Result<(), GatewayError> {
        let payload = message_payload(&self.channel, result, service, Utc::now());
        let response: SlackResponse = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(GatewayError::Http(format!(
                "Slack API error: {}",
                response.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        info!(service = %service.name, "Slack notification sent");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

fn emoji(status: Status) -> &'static str {
    match status {
        Status::Error => ":red_circle:",
        _ => ":large_yellow_circle:",
    }
}

/// `chat.postMessage` body: a header, a field grid and a timestamp line.
fn message_payload(
    channel: &str,
    result: &CheckResult,
    service: &Service,
    at: DateTime<Utc>,
) -> Value {
    let title = format!("[{}] {}", result.status, service.name);
    let http_status = result
        .http_status
        .map_or_else(|| "N/A".to_string(), |c| c.to_string());

    json!({
        "channel": channel,
        "text": title,
        "blocks": [
            {
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("{} {}", emoji(result.status), title),
                    "emoji": true
                }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*URL:*\n{}", service.url) },
                    { "type": "mrkdwn", "text": format!("*HTTP Status:*\n{}", http_status) },
                    { "type": "mrkdwn", "text": format!("*Response Time:*\n{}ms", result.response_time) },
                    { "type": "mrkdwn", "text": format!("*Message:*\n{}", result.message.as_deref().unwrap_or("-")) }
                ]
            },
            {
                "type": "context",
                "elements": [
                    { "type": "mrkdwn", "text": format!(":clock1: {}", at.format("%Y-%m-%d %H:%M:%S UTC")) }
                ]
            }
        ]
    })
}
