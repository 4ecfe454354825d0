//! Row filters used by the views. All of them keep sheet order.

use opsdesk_core::types::columns;
use opsdesk_core::{Prospect, Record, Task};

/// Prospects whose status is "pending review" (trimmed, any case).
pub fn pending_review(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| Prospect::from_record(r).is_pending_review())
        .cloned()
        .collect()
}

/// Case-insensitive substring over name, email and organization.
/// A blank query keeps everything.
pub fn search_prospects(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| Prospect::from_record(r).matches(&needle))
        .cloned()
        .collect()
}

/// Case-insensitive substring over the task id.
pub fn search_task_ids(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| r.has(columns::TASK_ID))
        .filter(|r| needle.is_empty() || r.contains_lower(columns::TASK_ID, &needle))
        .cloned()
        .collect()
}

/// Case-insensitive substring over title, assignee and type.
pub fn search_tasks(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| Task::from_record(r).matches(&needle))
        .cloned()
        .collect()
}

/// Rows whose `column` contains `needle`, ignoring case.
pub fn count_containing(records: &[Record], column: &str, needle: &str) -> usize {
    let needle = needle.to_lowercase();
    records.iter().filter(|r| r.contains_lower(column, &needle)).count()
}

/// Rows whose `column` equals `value` exactly.
pub fn count_equal(records: &[Record], column: &str, value: &str) -> usize {
    records.iter().filter(|r| r.text(column) == value).count()
}

/// Long addresses are cut to 25 characters plus "...".
pub fn truncate_email(email: &str) -> String {
    const MAX: usize = 25;
    if email.chars().count() > MAX {
        let head: String = email.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        email.to_string()
    }
}

/// The first `n` rows, in sheet order.
pub fn recent(records: &[Record], n: usize) -> &[Record] {
    &records[..n.min(records.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prospects() -> Vec<Record> {
        vec![
            Record::new()
                .with("Donor ID", "D-1")
                .with("Name", "Ada Lovelace")
                .with("Email", "ada@engine.org")
                .with("Status", "pending review"),
            Record::new()
                .with("Donor ID", "D-2")
                .with("Name", "Grace Hopper")
                .with("Organization", "Cobol Foundation")
                .with("Status", "approved"),
            Record::new()
                .with("Donor ID", "D-3")
                .with("Name", "Alan Turing")
                .with("Status", " Pending Review "),
        ]
    }

    #[test]
    fn test_pending_review_is_idempotent() {
        let once = pending_review(&prospects());
        assert_eq!(once.len(), 2);
        assert_eq!(pending_review(&once), once);
    }

    #[test]
    fn test_search_prospects_covers_full_list() {
        let all = prospects();
        let hits = search_prospects(&all, "FOUNDATION");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text("Donor ID"), "D-2");
        assert_eq!(search_prospects(&all, "  ").len(), 3);
        assert!(search_prospects(&all, "babbage").is_empty());
    }

    #[test]
    fn test_task_id_search() {
        let tasks = vec![
            Record::new().with("Task ID", "TASK-20240101-1200"),
            Record::new().with("Task ID", "TASK-20230505-0900"),
        ];
        let hits = search_task_ids(&tasks, "TASK-2024");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text("Task ID"), "TASK-20240101-1200");
        assert_eq!(search_task_ids(&tasks, "task-").len(), 2);
        assert_eq!(search_task_ids(&tasks, "").len(), 2);
    }

    #[test]
    fn test_search_tasks() {
        let tasks = vec![
            Record::new().with("Task Title", "Spring Gala").with("Assigned To", "Maria"),
            Record::new().with("Task Title", "Annual RFP").with("Task Type", "RFP Submission"),
        ];
        assert_eq!(search_tasks(&tasks, "maria").len(), 1);
        assert_eq!(search_tasks(&tasks, "rfp").len(), 1);
        assert_eq!(search_tasks(&tasks, "").len(), 2);
    }

    #[test]
    fn test_counts() {
        let rows = vec![
            Record::new().with("Donor Type", "Family Foundation"),
            Record::new().with("Donor Type", "corporate"),
            Record::new().with("Donor Type", "Corporate Partner"),
        ];
        assert_eq!(count_containing(&rows, "Donor Type", "Foundation"), 1);
        assert_eq!(count_containing(&rows, "Donor Type", "Corporate"), 2);
        assert_eq!(count_equal(&prospects(), "Status", "approved"), 1);
    }

    #[test]
    fn test_truncate_email() {
        assert_eq!(truncate_email("a@b.org"), "a@b.org");
        let long = "development.director@foundation.example.org";
        let cut = truncate_email(long);
        assert_eq!(cut, "development.director@foun...");
    }

    #[test]
    fn test_recent_takes_head() {
        let rows = prospects();
        let first: Vec<String> = recent(&rows, 2).iter().map(|r| r.text("Donor ID")).collect();
        assert_eq!(first, vec!["D-1", "D-2"]);
        assert_eq!(recent(&rows, 10).len(), 3);
        assert!(recent(&[], 5).is_empty());
    }
}
