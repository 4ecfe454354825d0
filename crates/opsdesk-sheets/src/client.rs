//! Google Sheets values API client.

use async_trait::async_trait;
use opsdesk_core::Record;
use opsdesk_core::config::SheetsConfig;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::SheetSource;
use crate::auth::{ServiceAccountKey, TokenSource};
use crate::error::SheetsError;

/// Whole first worksheet; columns beyond ZZ are not used by any feed.
const FIRST_SHEET_RANGE: &str = "A:ZZ";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Authenticated connection to the spreadsheet service.
pub struct SheetsClient {
    http: reqwest::Client,
    api_base: String,
    tokens: TokenSource,
}

impl SheetsClient {
    /// Load credentials (inline `OPSDESK_GOOGLE_CREDENTIALS` first, then the key file)
    /// and build the client.
    pub fn connect(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let key = match std::env::var("OPSDESK_GOOGLE_CREDENTIALS") {
            Ok(json) if !json.trim().is_empty() => ServiceAccountKey::from_json(&json)?,
            _ => ServiceAccountKey::from_file(&config.expanded_credentials_path())?,
        };
        Self::with_key(&key, config)
    }

    pub fn with_key(key: &ServiceAccountKey, config: &SheetsConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("OpsDesk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SheetsError::Connection(format!("Client error: {e}")))?;
        let tokens = TokenSource::new(key, &config.scopes, http.clone())?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn service_account(&self) -> &str {
        self.tokens.client_email()
    }

    /// Header row + data rows → records. Fully blank rows are dropped.
    pub fn rows_to_records(values: &[Vec<Value>]) -> Vec<Record> {
        let Some((header_row, rows)) = values.split_first() else {
            return Vec::new();
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(opsdesk_core::record::scalar_text)
            .map(|h| h.trim().to_string())
            .collect();
        rows.iter()
            .map(|row| Record::from_row(&headers, row))
            .filter(|rec| !rec.is_blank())
            .collect()
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_sheet(&self, sheet_id: &str) -> Result<Vec<Record>, SheetsError> {
        if sheet_id.trim().is_empty() {
            return Err(SheetsError::MissingSheetId("this feed".into()));
        }
        let token = self.tokens.token().await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base, sheet_id, FIRST_SHEET_RANGE
        );

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            // Formatted: dates arrive as the text the sheet shows, not serial numbers.
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(SheetsError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => SheetsError::Auth(format!("HTTP {status}: {body}")),
                code => SheetsError::Http { status: code, body },
            });
        }

        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))?;
        let records = Self::rows_to_records(&range.values);
        tracing::debug!("📄 Sheet {} → {} row(s)", sheet_id, records.len());
        Ok(records)
    }
}

/// Stand-in used when credentials could not be loaded. Every read fails.
pub struct Disconnected {
    reason: String,
}

impl Disconnected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SheetSource for Disconnected {
    async fn fetch_sheet(&self, _sheet_id: &str) -> Result<Vec<Record>, SheetsError> {
        Err(SheetsError::Connection(format!(
            "Spreadsheet store not connected: {}",
            self.reason
        )))
    }
}

/// Connect once for the process. A bad or missing credential is logged and
/// degrades to [`Disconnected`] instead of aborting startup.
pub fn connect_or_disconnected(config: &SheetsConfig) -> Arc<dyn SheetSource> {
    match SheetsClient::connect(config) {
        Ok(client) => {
            tracing::info!("✅ Sheets connected as {}", client.service_account());
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!("❌ Sheets connection error: {e}");
            Arc::new(Disconnected::new(e.to_string()))
        }
    }
}
