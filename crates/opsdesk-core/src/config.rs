//! OpsDesk configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{OpsDeskError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpsDeskConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl OpsDeskConfig {
    /// Load config from `OPSDESK_CONFIG` or the default path (~/.opsdesk/config.toml).
    /// A missing file yields defaults; env overrides are applied either way.
    pub fn load() -> Result<Self> {
        let path = std::env::var("OPSDESK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::warn!("⚠️ No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OpsDeskError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| OpsDeskError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Serialize the effective configuration (secrets are never stored inline).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| OpsDeskError::Config(format!("Failed to serialize config: {e}")))
    }

    /// Secrets and endpoints supplied by the deployment environment win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `OPSDESK_*` overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(url) = value("OPSDESK_WEBHOOK_BASE_URL") {
            self.webhooks.base_url = url;
        }
        if let Some(id) = value("OPSDESK_PROSPECTS_SHEET_ID") {
            self.sheets.prospects_sheet_id = id;
        }
        if let Some(id) = value("OPSDESK_TASKS_SHEET_ID") {
            self.sheets.tasks_sheet_id = id;
        }
        if let Some(id) = value("OPSDESK_LEADS_SHEET_ID") {
            self.sheets.leads_sheet_id = Some(id);
        }
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the OpsDesk home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".opsdesk")
    }
}

/// Gateway (HTTP server) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Sessions unseen for this long are dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    /// Upper bound on live sessions; the least recently seen go first.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_port() -> u16 { 8501 }
fn default_host() -> String { "127.0.0.1".into() }
fn default_session_idle_secs() -> u64 { 1800 }
fn default_max_sessions() -> usize { 10_000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Spreadsheet store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Service-account key file. `OPSDESK_GOOGLE_CREDENTIALS` (inline JSON) takes precedence.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub prospects_sheet_id: String,
    #[serde(default = "default_tasks_sheet_id")]
    pub tasks_sheet_id: String,
    /// Falls back to the prospects sheet when unset.
    #[serde(default)]
    pub leads_sheet_id: Option<String>,
    #[serde(default = "default_slow_ttl")]
    pub prospects_ttl_secs: u64,
    #[serde(default = "default_fast_ttl")]
    pub tasks_ttl_secs: u64,
    #[serde(default = "default_slow_ttl")]
    pub leads_ttl_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub timeout_secs: u64,
}

fn default_credentials_path() -> String { "~/.opsdesk/service-account.json".into() }
fn default_api_base() -> String { "https://sheets.googleapis.com".into() }
fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/spreadsheets.readonly",
        "https://www.googleapis.com/auth/drive",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_tasks_sheet_id() -> String { "1kt4z_zcfiX_Xx3jhahihWMB5LMrh0-GpmQDBxKjSl4A".into() }
fn default_slow_ttl() -> u64 { 300 }
fn default_fast_ttl() -> u64 { 60 }
fn default_read_timeout() -> u64 { 20 }

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            api_base: default_api_base(),
            scopes: default_scopes(),
            prospects_sheet_id: String::new(),
            tasks_sheet_id: default_tasks_sheet_id(),
            leads_sheet_id: None,
            prospects_ttl_secs: default_slow_ttl(),
            tasks_ttl_secs: default_fast_ttl(),
            leads_ttl_secs: default_slow_ttl(),
            timeout_secs: default_read_timeout(),
        }
    }
}

impl SheetsConfig {
    /// Lead sheet id, or the prospect sheet when no dedicated one is configured.
    pub fn leads_sheet_id(&self) -> &str {
        match self.leads_sheet_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => &self.prospects_sheet_id,
        }
    }

    /// Credentials path with `~` expanded.
    pub fn expanded_credentials_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.credentials_path).to_string())
    }
}

/// Outbound automation webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_base")]
    pub base_url: String,
    #[serde(default = "default_approve_path")]
    pub approve_path: String,
    #[serde(default = "default_create_task_path")]
    pub create_task_path: String,
    #[serde(default = "default_update_task_path")]
    pub update_task_path: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
    /// Actor label sent with approvals.
    #[serde(default = "default_approved_by")]
    pub approved_by: String,
}

fn default_webhook_base() -> String { "http://localhost:5678/webhook".into() }
fn default_approve_path() -> String { "diana-approve-leads".into() }
fn default_create_task_path() -> String { "opsi-create-task".into() }
fn default_update_task_path() -> String { "opsi-update-task".into() }
fn default_webhook_timeout() -> u64 { 30 }
fn default_approved_by() -> String { "Dashboard User".into() }

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            base_url: default_webhook_base(),
            approve_path: default_approve_path(),
            create_task_path: default_create_task_path(),
            update_task_path: default_update_task_path(),
            timeout_secs: default_webhook_timeout(),
            approved_by: default_approved_by(),
        }
    }
}

impl WebhookConfig {
    /// Join the base URL and an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,
}

fn default_title() -> String { "Money Mindset Makeover".into() }
fn default_recent_rows() -> usize { 5 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            recent_rows: default_recent_rows(),
        }
    }
}
