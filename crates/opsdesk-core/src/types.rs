//! Typed views over records — prospects and tasks.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Canonical column names.
pub mod columns {
    pub const DONOR_ID: &str = "Donor ID";
    pub const NAME: &str = "Name";
    pub const ORGANIZATION: &str = "Organization";
    pub const EMAIL: &str = "Email";
    pub const DONOR_TYPE: &str = "Donor Type";
    pub const STATUS: &str = "Status";
    pub const TIMESTAMP: &str = "Timestamp";

    pub const TASK_ID: &str = "Task ID";
    pub const TASK_TITLE: &str = "Task Title";
    pub const TASK_TYPE: &str = "Task Type";
    pub const ASSIGNED_TO: &str = "Assigned To";
    pub const DEADLINE: &str = "Deadline Date";
    pub const PRIORITY: &str = "Priority";
    pub const NOTES: &str = "Notes";
}

/// Upstream spellings of prospect columns, as `(alias, canonical)`.
pub const PROSPECT_ALIASES: &[(&str, &str)] = &[
    ("status", columns::STATUS),
    ("DonorID", columns::DONOR_ID),
    ("name", columns::NAME),
    ("email", columns::EMAIL),
    ("organization", columns::ORGANIZATION),
];

/// Upstream spellings of task columns, as `(alias, canonical)`.
pub const TASK_ALIASES: &[(&str, &str)] = &[
    ("TaskID", columns::TASK_ID),
    ("Title", columns::TASK_TITLE),
    ("status", columns::STATUS),
    ("priority", columns::PRIORITY),
    ("AssignedTo", columns::ASSIGNED_TO),
    ("TaskType", columns::TASK_TYPE),
];

/// Status marker the ingestion workflow writes for prospects awaiting review.
pub const PENDING_REVIEW: &str = "pending review";
/// Status marker the approval workflow writes once a prospect is approved.
pub const APPROVED: &str = "approved";

/// A donor / partner prospect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub donor_id: Option<String>,
    pub name: String,
    pub organization: String,
    pub email: String,
    pub donor_type: String,
    pub status: String,
    pub timestamp: String,
}

impl Prospect {
    pub fn from_record(record: &Record) -> Self {
        Self {
            donor_id: record.non_empty(columns::DONOR_ID),
            name: record.text(columns::NAME),
            organization: record.text(columns::ORGANIZATION),
            email: record.text(columns::EMAIL),
            donor_type: record.text(columns::DONOR_TYPE),
            status: record.text(columns::STATUS),
            timestamp: record.text(columns::TIMESTAMP),
        }
    }

    /// Status equals "pending review", ignoring case and surrounding whitespace.
    pub fn is_pending_review(&self) -> bool {
        self.status.trim().to_lowercase() == PENDING_REVIEW
    }

    pub fn is_approved(&self) -> bool {
        self.status == APPROVED
    }

    /// Free-text match over name, email and organization. `needle` must be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.organization.to_lowercase().contains(needle)
    }
}

/// An operations task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub task_type: String,
    pub assigned_to: String,
    pub deadline: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
}

impl Task {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.text(columns::TASK_ID),
            title: record.text(columns::TASK_TITLE),
            task_type: record.text(columns::TASK_TYPE),
            assigned_to: record.text(columns::ASSIGNED_TO),
            deadline: record.text(columns::DEADLINE),
            status: record.text(columns::STATUS),
            priority: record.text(columns::PRIORITY),
            notes: record.text(columns::NOTES),
        }
    }

    /// Free-text match over title, assignee and type. `needle` must be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.assigned_to.to_lowercase().contains(needle)
            || self.task_type.to_lowercase().contains(needle)
    }

    /// Label used in the task picker.
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.title)
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Exact match on the display text.
            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Task lifecycle status.
    TaskStatus {
        New => "New",
        InProgress => "In Progress",
        Completed => "Completed",
        OnHold => "On Hold",
        Cancelled => "Cancelled",
    }
}

string_enum! {
    TaskPriority {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

string_enum! {
    /// Kinds of operational work offered by the create form.
    TaskType {
        RfpSubmission => "RFP Submission",
        GrantApplication => "Grant Application",
        PartnershipOutreach => "Partnership Outreach",
        ProgramDevelopment => "Program Development",
        Other => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_review_is_case_and_space_insensitive() {
        let mut p = Prospect::from_record(&Record::new().with("Status", "  Pending Review "));
        assert!(p.is_pending_review());
        p.status = "pending".into();
        assert!(!p.is_pending_review());
    }

    #[test]
    fn test_prospect_blank_id_is_none() {
        let p = Prospect::from_record(&Record::new().with("Donor ID", " ").with("Name", "Ada"));
        assert!(p.donor_id.is_none());
        assert_eq!(p.name, "Ada");
    }

    #[test]
    fn test_prospect_matches_any_field() {
        let p = Prospect::from_record(
            &Record::new()
                .with("Name", "Ada Lovelace")
                .with("Email", "ada@engine.org")
                .with("Organization", "Analytical Trust"),
        );
        assert!(p.matches("lovelace"));
        assert!(p.matches("engine.org"));
        assert!(p.matches("trust"));
        assert!(!p.matches("babbage"));
    }

    #[test]
    fn test_task_matches_title_assignee_type() {
        let t = Task::from_record(
            &Record::new()
                .with("Task Title", "Spring Gala")
                .with("Assigned To", "Maria")
                .with("Task Type", "Program Development"),
        );
        assert!(t.matches("gala"));
        assert!(t.matches("maria"));
        assert!(t.matches("program"));
        assert!(!t.matches("rfp"));
    }

    #[test]
    fn test_enum_text() {
        assert_eq!(TaskStatus::parse("On Hold"), Some(TaskStatus::OnHold));
        assert_eq!(TaskStatus::parse("on hold"), None);
        assert_eq!(TaskPriority::Medium.to_string(), "Medium");
        assert_eq!(TaskType::ALL.len(), 5);
        assert_eq!(
            serde_json::to_string(&TaskType::GrantApplication).unwrap(),
            "\"Grant Application\""
        );
    }
}
