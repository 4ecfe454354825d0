//! Webhook dispatch — one POST per call, outcome classified for display.

use async_trait::async_trait;
use opsdesk_core::config::WebhookConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Fixed automation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Approved prospects handed to the outreach agent.
    ApproveProspects,
    CreateTask,
    UpdateTask,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApproveProspects => "approve-prospects",
            Self::CreateTask => "create-task",
            Self::UpdateTask => "update-task",
        }
    }

    fn path<'a>(&self, config: &'a WebhookConfig) -> &'a str {
        match self {
            Self::ApproveProspects => &config.approve_path,
            Self::CreateTask => &config.create_task_path,
            Self::UpdateTask => &config.update_task_path,
        }
    }
}

/// Why a delivery was not accepted. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// Non-200 response; `detail` is the compact JSON body, or the raw text.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Request timed out - workflow may still be processing")]
    Timeout,

    #[error("Connection failed - check webhook URL and automation service status")]
    Connection,

    #[error("Error: {0}")]
    Other(String),
}

impl DispatchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Where controller mutations are sent.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Accepted body on HTTP 200, otherwise the classified failure.
    async fn post(&self, endpoint: Endpoint, payload: &Value) -> Result<Value, DispatchError>;
}

/// Live dispatcher over HTTP.
pub struct WebhookDispatcher {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookDispatcher {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        self.config.url_for(endpoint.path(&self.config))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// POST `payload` to an explicit URL and classify the response.
    pub async fn post_url(&self, url: &str, payload: &Value) -> Result<Value, DispatchError> {
        let resp = self
            .http
            .post(url)
            .json(payload)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(DispatchError::from_reqwest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(DispatchError::from_reqwest)?;

        if status.as_u16() == 200 {
            return Ok(serde_json::from_str::<Value>(&text)
                .unwrap_or_else(|_| serde_json::json!({"message": "success"})));
        }

        let detail = match serde_json::from_str::<Value>(&text) {
            Ok(json) => json.to_string(),
            Err(_) => text,
        };
        Err(DispatchError::Http {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl WebhookSink for WebhookDispatcher {
    async fn post(&self, endpoint: Endpoint, payload: &Value) -> Result<Value, DispatchError> {
        let url = self.url(endpoint);
        match self.post_url(&url, payload).await {
            Ok(body) => {
                tracing::info!("✅ Webhook {} accepted", endpoint.name());
                Ok(body)
            }
            Err(e) => {
                tracing::warn!("⚠️ Webhook {} failed ({}): {}", endpoint.name(), url, e);
                Err(e)
            }
        }
    }
}
