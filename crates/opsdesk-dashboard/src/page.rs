//! View models. A [`Page`] is everything one render shows, serializable for
//! the JSON API and turned into HTML by [`crate::render`].

use opsdesk_core::Record;
use opsdesk_sheets::AgentStatus;
use serde::Serialize;

use crate::session::{Notice, View};

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub view: View,
    pub agents: Vec<AgentStatus>,
    pub notices: Vec<Notice>,
    pub body: Body,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Overview(OverviewBody),
    ApproveProspects(ApproveBody),
    ManageTasks(TasksBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: usize,
}

impl Metric {
    pub fn new(label: &'static str, value: usize) -> Self {
        Self { label, value }
    }
}

/// Rows of text under a header, ready for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Every column seen in `records`, in first-seen order.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for column in record.columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        let rows = records
            .iter()
            .map(|r| columns.iter().map(|c| r.text(c)).collect())
            .collect();
        Self { columns, rows }
    }

    /// Only the wanted columns that actually occur in `records`.
    pub fn with_columns(records: &[Record], wanted: &[&str]) -> Self {
        let columns: Vec<String> = wanted
            .iter()
            .filter(|c| records.iter().any(|r| r.has(c)))
            .map(|c| c.to_string())
            .collect();
        let rows = records
            .iter()
            .map(|r| columns.iter().map(|c| r.text(c)).collect())
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewBody {
    pub metrics: Vec<Metric>,
    pub recent_prospects: Table,
    pub recent_tasks: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveBody {
    /// Set when there is nothing to show at all.
    pub empty_message: Option<String>,
    /// Set when prospects exist but none await review.
    pub all_reviewed_message: Option<String>,
    pub metrics: Vec<Metric>,
    /// False when the sheet has no `Donor ID` column.
    pub selectable: bool,
    pub select_all: bool,
    pub selected_count: usize,
    pub pending: Vec<ProspectRow>,
    /// Ids just handed to the outreach agent.
    pub approved: Vec<String>,
    pub search: String,
    pub results_summary: String,
    pub results: Table,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProspectRow {
    pub donor_id: Option<String>,
    pub name: String,
    pub organization: String,
    pub email: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasksBody {
    pub task_types: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
    pub priorities: Vec<&'static str>,
    /// Default create-form deadline, `YYYY-MM-DD`.
    pub today: String,
    /// False when the sheet is empty; the update section is hidden.
    pub has_tasks: bool,
    pub id_search: String,
    pub choices: Vec<TaskChoice>,
    pub selected: Option<TaskForm>,
    pub search: String,
    pub tasks: Table,
}

/// One entry of the task picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskChoice {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Current details of the picked task plus the prefilled edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskForm {
    pub task_id: String,
    pub current: Vec<(String, String)>,
    pub title: String,
    pub assigned_to: String,
    pub deadline: String,
    pub status: &'static str,
    pub priority: &'static str,
    pub notes: String,
}
