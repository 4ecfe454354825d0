//! Wire payloads expected by the automation workflows.

use serde::{Deserialize, Serialize};

/// ISO-8601 local timestamp with offset.
pub fn now_iso8601() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Prospects approved for outreach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPayload {
    pub approved_leads: Vec<String>,
    pub approved_by: String,
    pub timestamp: String,
}

impl ApprovalPayload {
    pub fn new(ids: Vec<String>, approved_by: &str) -> Self {
        Self {
            approved_leads: ids,
            approved_by: approved_by.to_string(),
            timestamp: now_iso8601(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub task_id: String,
    pub task_type: String,
    pub title: String,
    pub assigned_to: String,
    /// `YYYY-MM-DD`.
    pub deadline: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
    pub timestamp: String,
}

/// Full replacement of a task's editable fields. Carries no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub task_id: String,
    pub task_type: String,
    pub title: String,
    pub assigned_to: String,
    pub deadline: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
}
