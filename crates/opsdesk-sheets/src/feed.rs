//! Feeds — one per agent sheet.
//!
//! A feed pins a sheet id, a TTL and a column alias table onto the shared
//! cached store. Read failures stop here: callers get an empty list plus the
//! failure text to show once.

use opsdesk_core::config::SheetsConfig;
use opsdesk_core::types::{PROSPECT_ALIASES, TASK_ALIASES};
use opsdesk_core::Record;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::SheetSource;
use crate::cache::CachedSheets;

/// Agents are always reported as running; there is no health probe behind this.
pub const STATUS_ACTIVE: &str = "Active";

/// Outcome of a feed read.
#[derive(Debug, Clone, Default)]
pub struct FeedRead {
    pub records: Vec<Record>,
    /// User-facing text when the read failed; `records` is then empty.
    pub failure: Option<String>,
}

pub struct Feed {
    name: &'static str,
    sheet_id: String,
    ttl: Duration,
    aliases: &'static [(&'static str, &'static str)],
    store: Arc<CachedSheets>,
}

impl Feed {
    pub fn new(
        name: &'static str,
        sheet_id: impl Into<String>,
        ttl: Duration,
        aliases: &'static [(&'static str, &'static str)],
        store: Arc<CachedSheets>,
    ) -> Self {
        Self {
            name,
            sheet_id: sheet_id.into(),
            ttl,
            aliases,
            store,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    pub fn status(&self) -> &'static str {
        STATUS_ACTIVE
    }

    /// All rows with canonical column names, or the failure to report.
    pub async fn read(&self) -> FeedRead {
        match self.store.fetch_sheet(&self.sheet_id, self.ttl).await {
            Ok(records) => FeedRead {
                records: records
                    .into_iter()
                    .map(|r| r.normalized(self.aliases))
                    .collect(),
                failure: None,
            },
            Err(e) => {
                tracing::warn!("⚠️ {} feed read failed: {e}", self.name);
                FeedRead {
                    records: Vec::new(),
                    failure: Some(format!("Error loading {} data: {e}", self.name)),
                }
            }
        }
    }

    /// All rows; empty on any failure.
    pub async fn list_records(&self) -> Vec<Record> {
        self.read().await.records
    }

    pub fn invalidate(&self) {
        self.store.invalidate(&self.sheet_id);
    }
}

/// Status card for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub name: &'static str,
    pub description: &'static str,
    pub status: &'static str,
}

/// The three sheet feeds over one shared cache.
pub struct Feeds {
    /// Donor & partner prospects (DAPHNE).
    pub prospects: Feed,
    /// Operations tasks (OPSI).
    pub tasks: Feed,
    /// Lead list (CORA). Configured and readable, not shown by any view.
    pub leads: Feed,
    store: Arc<CachedSheets>,
}

impl Feeds {
    pub fn from_config(config: &SheetsConfig, source: Arc<dyn SheetSource>) -> Self {
        let store = Arc::new(CachedSheets::new(source));
        Self {
            prospects: Feed::new(
                "DAPHNE",
                config.prospects_sheet_id.clone(),
                Duration::from_secs(config.prospects_ttl_secs),
                PROSPECT_ALIASES,
                store.clone(),
            ),
            tasks: Feed::new(
                "OPSI",
                config.tasks_sheet_id.clone(),
                Duration::from_secs(config.tasks_ttl_secs),
                TASK_ALIASES,
                store.clone(),
            ),
            leads: Feed::new(
                "CORA",
                config.leads_sheet_id().to_string(),
                Duration::from_secs(config.leads_ttl_secs),
                PROSPECT_ALIASES,
                store.clone(),
            ),
            store,
        }
    }

    /// Forced refresh of every feed.
    pub fn invalidate_all(&self) {
        self.store.invalidate_all();
    }

    /// Status cards, in display order. DIANA (approval outreach) has no sheet.
    pub fn statuses(&self) -> Vec<AgentStatus> {
        vec![
            AgentStatus {
                name: self.prospects.name(),
                description: "Donor & Partner Prospecting Engine",
                status: self.prospects.status(),
            },
            AgentStatus {
                name: "DIANA",
                description: "Donor Intelligence & Nurture Agent",
                status: STATUS_ACTIVE,
            },
            AgentStatus {
                name: self.tasks.name(),
                description: "Operations & Policy System",
                status: self.tasks.status(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;

    fn config() -> SheetsConfig {
        SheetsConfig {
            prospects_sheet_id: "prospects".into(),
            tasks_sheet_id: "tasks".into(),
            ..SheetsConfig::default()
        }
    }

    fn source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new()
                .with_sheet(
                    "prospects",
                    vec![
                        Record::new().with("Donor ID", "D-1").with("status", "pending review"),
                        Record::new().with("Donor ID", "D-2").with("status", "approved"),
                    ],
                )
                .with_sheet(
                    "tasks",
                    vec![Record::new().with("TaskID", "TASK-1").with("Title", "Grant X")],
                ),
        )
    }

    #[tokio::test]
    async fn test_read_normalizes_columns() {
        let feeds = Feeds::from_config(&config(), source());
        let tasks = feeds.tasks.list_records().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text("Task ID"), "TASK-1");
        assert_eq!(tasks[0].text("Task Title"), "Grant X");

        let prospects = feeds.prospects.list_records().await;
        assert_eq!(prospects[1].text("Status"), "approved");
    }

    #[tokio::test]
    async fn test_failure_yields_empty_and_message() {
        let src = source();
        src.set_offline(true);
        let feeds = Feeds::from_config(&config(), src);
        let read = feeds.tasks.read().await;
        assert!(read.records.is_empty());
        assert!(read.failure.unwrap().contains("OPSI"));
        assert!(feeds.prospects.list_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_leads_share_prospect_sheet_by_default() {
        let src = source();
        let feeds = Feeds::from_config(&config(), src.clone());
        assert_eq!(feeds.leads.sheet_id(), "prospects");
        assert_eq!(feeds.leads.list_records().await.len(), 2);
        // Same sheet id → served from the prospects cache entry.
        feeds.prospects.list_records().await;
        assert_eq!(src.reads(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_rereads() {
        let src = source();
        let feeds = Feeds::from_config(&config(), src.clone());
        feeds.tasks.list_records().await;
        feeds.invalidate_all();
        feeds.tasks.list_records().await;
        assert_eq!(src.reads(), 2);
    }

    #[test]
    fn test_statuses_are_active() {
        let feeds = Feeds::from_config(&config(), source());
        let statuses = feeds.statuses();
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| s.status == "Active"));
        assert_eq!(statuses[1].name, "DIANA");
    }
}
