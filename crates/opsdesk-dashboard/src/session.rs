//! Per-user session state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The three screens of the command center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Overview,
    ApproveProspects,
    ManageTasks,
}

impl View {
    pub const ALL: [View; 3] = [View::Overview, View::ApproveProspects, View::ManageTasks];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Dashboard Overview",
            Self::ApproveProspects => "Approve Leads",
            Self::ManageTasks => "Manage Tasks",
        }
    }

    /// Path segment used by `/view/{slug}`.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::ApproveProspects => "approve",
            Self::ManageTasks => "tasks",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// One message shown above the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

/// Everything that survives between two passes for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub view: View,
    /// Free-text filter over the full prospect list.
    pub prospect_search: String,
    /// Donor IDs ticked for approval.
    pub selected_prospects: BTreeSet<String>,
    /// Task ID substring filter of the update picker.
    pub task_id_search: String,
    /// Task picked in the update section; the first match when unset.
    pub selected_task: Option<String>,
    /// Free-text filter of the task list.
    pub task_search: String,
    /// One-shot message carried into the next render of the task view.
    pub flash: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch views. Leaving a view drops the prospect selection.
    pub fn navigate(&mut self, view: View) {
        if view != self.view {
            self.selected_prospects.clear();
        }
        self.view = view;
    }

    pub fn take_flash(&mut self) -> Option<Notice> {
        self.flash.take()
    }
}
