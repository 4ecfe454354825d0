//! User events — the only way a session changes.

use chrono::NaiveDate;
use opsdesk_core::{OpsDeskError, TaskPriority, TaskStatus, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::View;

/// Form field prefix of the per-prospect approval checkboxes (`pick:<Donor ID>`).
pub const PICK_PREFIX: &str = "pick:";

/// One user action. JSON form: `{"action": "<snake_case name>", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    /// Re-render without changing anything.
    Show,
    Navigate { view: View },
    /// Drop every cached sheet.
    Refresh,
    SearchProspects {
        #[serde(default)]
        query: String,
    },
    ToggleProspect { donor_id: String, selected: bool },
    SelectAll { selected: bool },
    /// `ids`, when given, replace the current selection before dispatch.
    ApproveSelected {
        #[serde(default)]
        ids: Option<Vec<String>>,
    },
    CreateTask(TaskDraft),
    SearchTaskIds {
        #[serde(default)]
        query: String,
    },
    SelectTask { task_id: String },
    UpdateTask(TaskEdit),
    SearchTasks {
        #[serde(default)]
        query: String,
    },
}

/// Contents of the create form. Blank optional fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDraft {
    pub title: String,
    pub task_type: Option<TaskType>,
    pub assigned_to: String,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub notes: String,
}

/// Contents of the update form for one existing task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskEdit {
    pub task_id: String,
    pub title: String,
    pub assigned_to: String,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub notes: String,
}

impl Event {
    /// Decode an HTML form post. The `action` field picks the event.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, OpsDeskError> {
        let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
        let flag = |name: &str| matches!(field(name).as_str(), "true" | "on" | "1");

        let action = field("action");
        let event = match action.as_str() {
            "show" | "" => Self::Show,
            "navigate" => {
                let slug = field("view");
                let view = View::from_slug(&slug)
                    .ok_or_else(|| OpsDeskError::Validation(format!("Unknown view '{slug}'")))?;
                Self::Navigate { view }
            }
            "refresh" => Self::Refresh,
            "search_prospects" => Self::SearchProspects {
                query: field("query"),
            },
            "toggle_prospect" => Self::ToggleProspect {
                donor_id: field("donor_id"),
                selected: flag("selected"),
            },
            "select_all" => Self::SelectAll {
                selected: flag("selected"),
            },
            "approve_selected" => {
                let mut ids: Vec<String> = form
                    .iter()
                    .filter(|(_, value)| value.as_str() != "off")
                    .filter_map(|(key, _)| key.strip_prefix(PICK_PREFIX))
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect();
                ids.sort();
                Self::ApproveSelected { ids: Some(ids) }
            }
            "create_task" => Self::CreateTask(TaskDraft {
                title: field("title"),
                task_type: TaskType::parse(&field("task_type")),
                assigned_to: field("assigned_to"),
                deadline: parse_date(&field("deadline")),
                status: TaskStatus::parse(&field("status")),
                priority: TaskPriority::parse(&field("priority")),
                notes: field("notes"),
            }),
            "search_task_ids" => Self::SearchTaskIds {
                query: field("query"),
            },
            "select_task" => Self::SelectTask {
                task_id: field("task_id"),
            },
            "update_task" => Self::UpdateTask(TaskEdit {
                task_id: field("task_id"),
                title: field("title"),
                assigned_to: field("assigned_to"),
                deadline: parse_date(&field("deadline")),
                status: TaskStatus::parse(&field("status")),
                priority: TaskPriority::parse(&field("priority")),
                notes: field("notes"),
            }),
            "search_tasks" => Self::SearchTasks {
                query: field("query"),
            },
            other => {
                return Err(OpsDeskError::Validation(format!("Unknown action '{other}'")));
            }
        };
        Ok(event)
    }
}

/// `YYYY-MM-DD`, as sent by date inputs and stored in the task sheet.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}
