//! Dashboard controller — applies events to sessions and renders pages.
//!
//! A pass is `handle` (session + event → session + effects) followed by
//! `render` (session + effects → page). Mutations are only ever proposals to
//! the automation webhooks; what the page shows afterwards comes from the
//! next store read.

use chrono::{DateTime, Local, NaiveDate};
use opsdesk_core::config::OpsDeskConfig;
use opsdesk_core::types::{APPROVED, columns};
use opsdesk_core::{Prospect, Record, Task, TaskPriority, TaskStatus, TaskType};
use opsdesk_sheets::{Feed, Feeds};
use opsdesk_webhooks::{
    ApprovalPayload, CreateTaskPayload, DispatchError, Endpoint, UpdateTaskPayload, WebhookSink,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::event::{Event, TaskDraft, TaskEdit, parse_date};
use crate::filter;
use crate::page::{
    ApproveBody, Body, Metric, OverviewBody, Page, ProspectRow, Table, TaskChoice, TaskForm,
    TasksBody,
};
use crate::session::{Notice, Session, View};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Display and attribution settings.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub title: String,
    /// Sent as `approved_by` with every approval.
    pub approved_by: String,
    /// Rows per table on the overview.
    pub recent_rows: usize,
}

impl DashboardSettings {
    pub fn from_config(config: &OpsDeskConfig) -> Self {
        Self {
            title: config.dashboard.title.clone(),
            approved_by: config.webhooks.approved_by.clone(),
            recent_rows: config.dashboard.recent_rows,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&OpsDeskConfig::default())
    }
}

/// Output of `handle` consumed by the following `render`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    /// Ids accepted by the approval webhook, listed once.
    ShowApproved(Vec<String>),
}

/// A handled event: the next session value and what to show once.
#[derive(Debug, Clone)]
pub struct Pass {
    pub session: Session,
    pub effects: Vec<Effect>,
}

pub struct Dashboard {
    feeds: Arc<Feeds>,
    webhooks: Arc<dyn WebhookSink>,
    settings: DashboardSettings,
}

impl Dashboard {
    pub fn new(
        feeds: Arc<Feeds>,
        webhooks: Arc<dyn WebhookSink>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            feeds,
            webhooks,
            settings,
        }
    }

    pub fn feeds(&self) -> &Feeds {
        &self.feeds
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// One full pass.
    pub async fn process(&self, session: Session, event: Event) -> (Session, Page) {
        let Pass {
            mut session,
            effects,
        } = self.handle(session, event).await;
        let page = self.render(&mut session, effects).await;
        (session, page)
    }

    /// Apply one event.
    pub async fn handle(&self, mut session: Session, event: Event) -> Pass {
        let mut effects = Vec::new();
        match event {
            Event::Show => {}
            Event::Navigate { view } => session.navigate(view),
            Event::Refresh => {
                self.feeds.invalidate_all();
                tracing::info!("🔄 Data refresh requested");
            }
            Event::SearchProspects { query } => session.prospect_search = query.trim().to_string(),
            Event::ToggleProspect { donor_id, selected } => {
                let id = donor_id.trim().to_string();
                if id.is_empty() {
                    return Pass { session, effects };
                }
                if selected {
                    session.selected_prospects.insert(id);
                } else {
                    session.selected_prospects.remove(&id);
                }
            }
            Event::SelectAll { selected } => {
                session.selected_prospects.clear();
                if selected {
                    let prospects = self.feeds.prospects.list_records().await;
                    session
                        .selected_prospects
                        .extend(pending_ids(&filter::pending_review(&prospects)));
                }
            }
            Event::ApproveSelected { ids } => self.approve(&mut session, ids, &mut effects).await,
            Event::CreateTask(draft) => self.create_task(draft, &mut effects).await,
            Event::SearchTaskIds { query } => {
                session.task_id_search = query.trim().to_string();
                session.selected_task = None;
            }
            Event::SelectTask { task_id } => {
                let id = task_id.trim();
                session.selected_task = (!id.is_empty()).then(|| id.to_string());
            }
            Event::UpdateTask(edit) => self.update_task(&mut session, edit, &mut effects).await,
            Event::SearchTasks { query } => session.task_search = query.trim().to_string(),
        }
        Pass { session, effects }
    }

    async fn approve(
        &self,
        session: &mut Session,
        ids: Option<Vec<String>>,
        effects: &mut Vec<Effect>,
    ) {
        if let Some(ids) = ids {
            session.selected_prospects = ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
        }
        if session.selected_prospects.is_empty() {
            effects.push(Effect::Notify(Notice::warning(
                "⚠️ Please select at least one prospect to approve",
            )));
            return;
        }

        let ids: Vec<String> = session.selected_prospects.iter().cloned().collect();
        let payload = ApprovalPayload::new(ids.clone(), &self.settings.approved_by);
        match self.dispatch(Endpoint::ApproveProspects, &payload).await {
            Ok(_) => {
                tracing::info!("✅ {} prospect(s) sent for outreach", ids.len());
                effects.push(Effect::Notify(Notice::success(format!(
                    "✅ Successfully approved {} prospect(s)!",
                    ids.len()
                ))));
                effects.push(Effect::Notify(Notice::info(
                    "🤖 DIANA will send outreach emails shortly.",
                )));
                effects.push(Effect::ShowApproved(ids));
                session.selected_prospects.clear();
                self.feeds.prospects.invalidate();
            }
            Err(e) => {
                effects.push(Effect::Notify(Notice::error(format!(
                    "❌ Failed to send to DIANA: {e}"
                ))));
                effects.push(Effect::Notify(Notice::info(
                    "💡 Check that the DIANA webhook is running",
                )));
            }
        }
    }

    async fn create_task(&self, draft: TaskDraft, effects: &mut Vec<Effect>) {
        let title = draft.title.trim();
        let task_type = match draft.task_type {
            Some(task_type) if !title.is_empty() => task_type,
            _ => {
                effects.push(Effect::Notify(Notice::error(
                    "❌ Please fill in all required fields (*)",
                )));
                return;
            }
        };

        let now = Local::now();
        let task_id = new_task_id(now);
        let payload = CreateTaskPayload {
            task_id: task_id.clone(),
            task_type: task_type.to_string(),
            title: title.to_string(),
            assigned_to: draft.assigned_to.trim().to_string(),
            deadline: draft
                .deadline
                .unwrap_or_else(|| now.date_naive())
                .format(DATE_FORMAT)
                .to_string(),
            status: draft.status.unwrap_or(TaskStatus::New).to_string(),
            priority: draft.priority.unwrap_or(TaskPriority::High).to_string(),
            notes: draft.notes,
            timestamp: now.to_rfc3339(),
        };

        match self.dispatch(Endpoint::CreateTask, &payload).await {
            Ok(_) => {
                tracing::info!("✅ Task {task_id} submitted");
                effects.push(Effect::Notify(Notice::success(format!(
                    "✅ Task {task_id} created successfully!"
                ))));
                self.feeds.invalidate_all();
            }
            Err(e) => effects.push(Effect::Notify(Notice::error(format!(
                "❌ Failed to create task: {e}"
            )))),
        }
    }

    async fn update_task(
        &self,
        session: &mut Session,
        edit: TaskEdit,
        effects: &mut Vec<Effect>,
    ) {
        let task_id = edit.task_id.trim().to_string();
        if task_id.is_empty() {
            effects.push(Effect::Notify(Notice::warning("⚠️ Select a task to update")));
            return;
        }

        // The type is not editable; carry over what the sheet has. Without a
        // readable row there is nothing safe to send.
        let read = self.feeds.tasks.read().await;
        if read.failure.is_some() {
            effects.push(Effect::Notify(Notice::warning(format!(
                "⚠️ Task {task_id} was not updated: the task sheet could not be read"
            ))));
            return;
        }
        let Some(current) = read
            .records
            .iter()
            .find(|r| r.text(columns::TASK_ID) == task_id)
        else {
            effects.push(Effect::Notify(Notice::error(format!(
                "❌ Task {task_id} not found"
            ))));
            return;
        };
        let task_type = current
            .non_empty(columns::TASK_TYPE)
            .unwrap_or_else(|| TaskType::RfpSubmission.to_string());

        let payload = UpdateTaskPayload {
            task_id: task_id.clone(),
            task_type,
            title: edit.title.trim().to_string(),
            assigned_to: edit.assigned_to.trim().to_string(),
            deadline: edit
                .deadline
                .unwrap_or_else(|| Local::now().date_naive())
                .format(DATE_FORMAT)
                .to_string(),
            status: edit.status.unwrap_or(TaskStatus::New).to_string(),
            priority: edit.priority.unwrap_or(TaskPriority::Medium).to_string(),
            notes: edit.notes,
        };

        match self.dispatch(Endpoint::UpdateTask, &payload).await {
            Ok(_) => {
                tracing::info!("✅ Task {task_id} update submitted");
                session.flash = Some(Notice::success(format!(
                    "✅ Task {task_id} updated successfully!"
                )));
                session.task_id_search.clear();
                session.selected_task = None;
                self.feeds.invalidate_all();
            }
            Err(e) => effects.push(Effect::Notify(Notice::error(format!(
                "❌ Failed to update task: {e}"
            )))),
        }
    }

    async fn dispatch<P: Serialize>(
        &self,
        endpoint: Endpoint,
        payload: &P,
    ) -> Result<Value, DispatchError> {
        let body =
            serde_json::to_value(payload).map_err(|e| DispatchError::Other(e.to_string()))?;
        self.webhooks.post(endpoint, &body).await
    }

    /// Build the page for the session's current view.
    pub async fn render(&self, session: &mut Session, effects: Vec<Effect>) -> Page {
        let mut notices = Vec::new();
        let mut approved = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(notice) => notices.push(notice),
                Effect::ShowApproved(ids) => approved = ids,
            }
        }

        let body = match session.view {
            View::Overview => Body::Overview(self.overview(&mut notices).await),
            View::ApproveProspects => {
                Body::ApproveProspects(self.approve_view(session, approved, &mut notices).await)
            }
            View::ManageTasks => {
                if let Some(flash) = session.take_flash() {
                    notices.insert(0, flash);
                }
                Body::ManageTasks(self.tasks_view(session, &mut notices).await)
            }
        };

        Page {
            title: self.settings.title.clone(),
            view: session.view,
            agents: self.feeds.statuses(),
            notices,
            body,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    async fn overview(&self, notices: &mut Vec<Notice>) -> OverviewBody {
        let prospects = load(&self.feeds.prospects, notices).await;
        let tasks = load(&self.feeds.tasks, notices).await;
        let n = self.settings.recent_rows;

        OverviewBody {
            metrics: vec![
                Metric::new("Total Donor Prospects", prospects.len()),
                Metric::new(
                    "Approved Prospects",
                    filter::count_equal(&prospects, columns::STATUS, APPROVED),
                ),
                Metric::new(
                    "Pending Tasks",
                    filter::count_equal(&tasks, columns::STATUS, TaskStatus::New.as_str()),
                ),
                Metric::new("Active Tasks", tasks.len()),
            ],
            recent_prospects: Table::with_columns(
                filter::recent(&prospects, n),
                &[
                    columns::DONOR_ID,
                    columns::NAME,
                    columns::ORGANIZATION,
                    columns::STATUS,
                ],
            ),
            recent_tasks: Table::with_columns(
                filter::recent(&tasks, n),
                &[
                    columns::TASK_ID,
                    columns::TASK_TITLE,
                    columns::STATUS,
                    columns::PRIORITY,
                ],
            ),
        }
    }

    async fn approve_view(
        &self,
        session: &mut Session,
        approved: Vec<String>,
        notices: &mut Vec<Notice>,
    ) -> ApproveBody {
        let prospects = load(&self.feeds.prospects, notices).await;

        let results = filter::search_prospects(&prospects, &session.prospect_search);
        let results_summary = if results.is_empty() {
            "No prospects match your search".to_string()
        } else {
            format!("Showing {} of {} prospects", results.len(), prospects.len())
        };
        let mut body = ApproveBody {
            empty_message: None,
            all_reviewed_message: None,
            metrics: Vec::new(),
            selectable: false,
            select_all: false,
            selected_count: 0,
            pending: Vec::new(),
            approved,
            search: session.prospect_search.clone(),
            results_summary,
            results: Table::from_records(&results),
        };

        if prospects.is_empty() {
            body.empty_message =
                Some("No donor prospects available. Run DAPHNE to generate prospects.".into());
            return body;
        }

        let pending = filter::pending_review(&prospects);
        if pending.is_empty() {
            session.selected_prospects.clear();
            body.all_reviewed_message =
                Some("✨ All prospects have been reviewed! No pending approvals.".into());
            return body;
        }

        // Ids that left the pending list since they were ticked are dropped.
        let ids = pending_ids(&pending);
        session.selected_prospects.retain(|id| ids.contains(id));

        let today = Local::now().format(DATE_FORMAT).to_string();
        body.metrics = vec![
            Metric::new("Pending Review", pending.len()),
            Metric::new(
                "Today",
                filter::count_containing(&pending, columns::TIMESTAMP, &today),
            ),
            Metric::new(
                "Foundations",
                filter::count_containing(&pending, columns::DONOR_TYPE, "Foundation"),
            ),
            Metric::new(
                "Corporates",
                filter::count_containing(&pending, columns::DONOR_TYPE, "Corporate"),
            ),
        ];
        body.selectable = pending.iter().any(|r| r.has(columns::DONOR_ID));
        body.select_all =
            !ids.is_empty() && ids.iter().all(|id| session.selected_prospects.contains(id));
        body.selected_count = session.selected_prospects.len();
        body.pending = pending
            .iter()
            .map(|record| {
                let prospect = Prospect::from_record(record);
                let selected = prospect
                    .donor_id
                    .as_ref()
                    .is_some_and(|id| session.selected_prospects.contains(id));
                ProspectRow {
                    donor_id: prospect.donor_id,
                    name: prospect.name,
                    organization: prospect.organization,
                    email: filter::truncate_email(&prospect.email),
                    selected,
                }
            })
            .collect();
        body
    }

    async fn tasks_view(&self, session: &mut Session, notices: &mut Vec<Notice>) -> TasksBody {
        let tasks = load(&self.feeds.tasks, notices).await;
        let today = Local::now().date_naive();

        let mut body = TasksBody {
            task_types: TaskType::ALL.iter().map(|t| t.as_str()).collect(),
            statuses: TaskStatus::ALL.iter().map(|s| s.as_str()).collect(),
            priorities: TaskPriority::ALL.iter().map(|p| p.as_str()).collect(),
            today: today.format(DATE_FORMAT).to_string(),
            has_tasks: !tasks.is_empty(),
            id_search: session.task_id_search.clone(),
            choices: Vec::new(),
            selected: None,
            search: session.task_search.clone(),
            tasks: Table::from_records(&filter::search_tasks(&tasks, &session.task_search)),
        };
        if tasks.is_empty() {
            return body;
        }

        let has_columns = tasks.iter().any(|r| r.has(columns::TASK_ID))
            && tasks.iter().any(|r| r.has(columns::TASK_TITLE));
        if !has_columns {
            notices.push(Notice::warning("⚠️ Task ID or Title column not found in data"));
            return body;
        }

        let matches = filter::search_task_ids(&tasks, &session.task_id_search);
        let picked = session
            .selected_task
            .as_deref()
            .and_then(|id| matches.iter().find(|r| r.text(columns::TASK_ID) == id))
            .or_else(|| matches.first());
        let Some(picked) = picked else {
            session.selected_task = None;
            notices.push(Notice::warning(format!(
                "⚠️ No tasks found matching '{}'",
                session.task_id_search
            )));
            return body;
        };

        let picked_id = picked.text(columns::TASK_ID);
        body.choices = matches
            .iter()
            .map(|record| {
                let task = Task::from_record(record);
                TaskChoice {
                    selected: task.id == picked_id,
                    label: task.label(),
                    id: task.id,
                }
            })
            .collect();
        body.selected = Some(task_form(picked, today));
        session.selected_task = Some(picked_id);
        body
    }
}

/// Feed rows; a failed read adds its message to `notices`.
async fn load(feed: &Feed, notices: &mut Vec<Notice>) -> Vec<Record> {
    let read = feed.read().await;
    if let Some(failure) = read.failure {
        notices.push(Notice::error(format!("❌ {failure}")));
    }
    read.records
}

fn pending_ids(pending: &[Record]) -> BTreeSet<String> {
    pending
        .iter()
        .filter_map(|r| Prospect::from_record(r).donor_id)
        .collect()
}

/// `TASK-` followed by the local time as 14 digits.
pub fn new_task_id(now: DateTime<Local>) -> String {
    format!("TASK-{}", now.format("%Y%m%d%H%M%S"))
}

/// Edit form prefilled from the sheet. Values outside the known sets fall back
/// to New / Medium / today.
fn task_form(record: &Record, today: NaiveDate) -> TaskForm {
    let task = Task::from_record(record);
    let shown = |text: &str| {
        if text.trim().is_empty() {
            "N/A".to_string()
        } else {
            text.to_string()
        }
    };
    TaskForm {
        current: vec![
            ("Task Type".to_string(), shown(&task.task_type)),
            ("Title".to_string(), shown(&task.title)),
            ("Status".to_string(), shown(&task.status)),
            ("Priority".to_string(), shown(&task.priority)),
            ("Assigned To".to_string(), shown(&task.assigned_to)),
            ("Deadline".to_string(), shown(&task.deadline)),
        ],
        deadline: parse_date(&task.deadline)
            .unwrap_or(today)
            .format(DATE_FORMAT)
            .to_string(),
        status: TaskStatus::parse(task.status.trim())
            .unwrap_or(TaskStatus::New)
            .as_str(),
        priority: TaskPriority::parse(task.priority.trim())
            .unwrap_or(TaskPriority::Medium)
            .as_str(),
        task_id: task.id,
        title: task.title,
        assigned_to: task.assigned_to,
        notes: task.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use opsdesk_core::config::SheetsConfig;
    use opsdesk_sheets::MemorySource;
    use std::sync::Mutex;

    /// Records every post and answers with a canned verdict.
    struct RecordingSink {
        calls: Mutex<Vec<(Endpoint, Value)>>,
        verdict: Result<Value, DispatchError>,
    }

    impl RecordingSink {
        fn accepting() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                verdict: Ok(serde_json::json!({"message": "success"})),
            }
        }

        fn failing(err: DispatchError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                verdict: Err(err),
            }
        }

        fn calls(&self) -> Vec<(Endpoint, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebhookSink for RecordingSink {
        async fn post(&self, endpoint: Endpoint, payload: &Value) -> Result<Value, DispatchError> {
            self.calls.lock().unwrap().push((endpoint, payload.clone()));
            self.verdict.clone()
        }
    }

    fn prospect(id: &str, name: &str, status: &str) -> Record {
        Record::new()
            .with("Donor ID", id)
            .with("Name", name)
            .with("Organization", format!("{name} Foundation"))
            .with("Email", format!("{}@example.org", name.to_lowercase()))
            .with("Donor Type", "Family Foundation")
            .with("Status", status)
    }

    fn source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new()
                .with_sheet(
                    "prospects",
                    vec![
                        prospect("D-1", "Ada", "pending review"),
                        prospect("D-2", "Grace", "approved"),
                        prospect("D-3", "Alan", "Pending Review"),
                        prospect("D-4", "Edsger", "pending review"),
                    ],
                )
                .with_sheet(
                    "tasks",
                    vec![
                        Record::new()
                            .with("Task ID", "TASK-20240101-1200")
                            .with("Task Title", "Grant X")
                            .with("Task Type", "Grant Application")
                            .with("Status", "In Progress")
                            .with("Priority", "Urgent")
                            .with("Deadline Date", "someday"),
                        Record::new()
                            .with("Task ID", "TASK-20230505-0900")
                            .with("Task Title", "RFP Y")
                            .with("Status", "New")
                            .with("Priority", "Low")
                            .with("Deadline Date", "2023-06-01"),
                    ],
                ),
        )
    }

    fn dashboard(source: Arc<MemorySource>, sink: Arc<RecordingSink>) -> Dashboard {
        let config = SheetsConfig {
            prospects_sheet_id: "prospects".into(),
            tasks_sheet_id: "tasks".into(),
            ..SheetsConfig::default()
        };
        Dashboard::new(
            Arc::new(Feeds::from_config(&config, source)),
            sink,
            DashboardSettings::default(),
        )
    }

    fn session_on(view: View) -> Session {
        let mut session = Session::new();
        session.navigate(view);
        session
    }

    fn notices(pass: &Pass) -> Vec<Notice> {
        pass.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(n.clone()),
                Effect::ShowApproved(_) => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_approve_sends_one_dispatch_with_all_ids() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        let pass = dash
            .handle(
                session_on(View::ApproveProspects),
                Event::ApproveSelected {
                    ids: Some(vec!["D-1".into(), "D-3".into(), "D-4".into()]),
                },
            )
            .await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::ApproveProspects);
        assert_eq!(calls[0].1["approved_leads"], serde_json::json!(["D-1", "D-3", "D-4"]));
        assert_eq!(calls[0].1["approved_by"], "Dashboard User");

        assert!(pass.session.selected_prospects.is_empty());
        assert!(pass.effects.contains(&Effect::ShowApproved(vec![
            "D-1".into(),
            "D-3".into(),
            "D-4".into()
        ])));
        assert_eq!(
            notices(&pass)[0],
            Notice::success("✅ Successfully approved 3 prospect(s)!")
        );
    }

    #[tokio::test]
    async fn test_approve_uses_session_selection() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        let pass = dash
            .handle(
                session_on(View::ApproveProspects),
                Event::ToggleProspect {
                    donor_id: "D-4".into(),
                    selected: true,
                },
            )
            .await;
        dash.handle(pass.session, Event::ApproveSelected { ids: None })
            .await;
        assert_eq!(sink.calls()[0].1["approved_leads"], serde_json::json!(["D-4"]));
    }

    #[tokio::test]
    async fn test_empty_selection_does_not_dispatch() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        let pass = dash
            .handle(
                session_on(View::ApproveProspects),
                Event::ApproveSelected {
                    ids: Some(Vec::new()),
                },
            )
            .await;
        assert!(sink.calls().is_empty());
        assert_eq!(
            notices(&pass),
            vec![Notice::warning("⚠️ Please select at least one prospect to approve")]
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_detail_is_shown_verbatim() {
        let sink = Arc::new(RecordingSink::failing(DispatchError::Http {
            status: 500,
            detail: r#"{"error":"bad id"}"#.into(),
        }));
        let dash = dashboard(source(), sink.clone());
        let (session, page) = dash
            .process(
                session_on(View::ApproveProspects),
                Event::ApproveSelected {
                    ids: Some(vec!["D-1".into()]),
                },
            )
            .await;
        assert!(
            page.notices
                .iter()
                .any(|n| n.text.contains(r#"HTTP 500: {"error":"bad id"}"#))
        );
        // Selection survives a failed approval.
        assert!(session.selected_prospects.contains("D-1"));
    }

    #[tokio::test]
    async fn test_select_all_takes_pending_only() {
        let dash = dashboard(source(), Arc::new(RecordingSink::accepting()));
        let pass = dash
            .handle(
                session_on(View::ApproveProspects),
                Event::SelectAll { selected: true },
            )
            .await;
        let ids: Vec<&str> = pass.session.selected_prospects.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["D-1", "D-3", "D-4"]);

        let (_, page) = dash.process(pass.session, Event::Show).await;
        let Body::ApproveProspects(body) = page.body else {
            panic!("expected approve view");
        };
        assert!(body.select_all);
        assert_eq!(body.selected_count, 3);
        assert_eq!(body.metrics[0], Metric::new("Pending Review", 3));
        assert_eq!(body.metrics[2], Metric::new("Foundations", 3));
    }

    #[tokio::test]
    async fn test_approve_view_search_covers_full_list() {
        let dash = dashboard(source(), Arc::new(RecordingSink::accepting()));
        let (_, page) = dash
            .process(
                session_on(View::ApproveProspects),
                Event::SearchProspects {
                    query: "grace".into(),
                },
            )
            .await;
        let Body::ApproveProspects(body) = page.body else {
            panic!("expected approve view");
        };
        assert_eq!(body.results.rows.len(), 1);
        assert_eq!(body.results_summary, "Showing 1 of 4 prospects");
        assert_eq!(body.pending.len(), 3);
    }

    #[tokio::test]
    async fn test_approval_invalidates_prospect_cache() {
        let src = source();
        let dash = dashboard(src.clone(), Arc::new(RecordingSink::accepting()));
        let (session, _) = dash.process(session_on(View::ApproveProspects), Event::Show).await;
        assert_eq!(src.reads(), 1);

        src.set_sheet("prospects", vec![prospect("D-1", "Ada", "approved")]);
        let (_, page) = dash
            .process(
                session,
                Event::ApproveSelected {
                    ids: Some(vec!["D-1".into()]),
                },
            )
            .await;
        assert_eq!(src.reads(), 2);
        let Body::ApproveProspects(body) = page.body else {
            panic!("expected approve view");
        };
        assert!(body.all_reviewed_message.is_some());
        assert_eq!(body.approved, vec!["D-1".to_string()]);
    }

    #[tokio::test]
    async fn test_create_task_payload() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        let pass = dash
            .handle(
                session_on(View::ManageTasks),
                Event::CreateTask(TaskDraft {
                    title: "Grant X".into(),
                    task_type: Some(TaskType::GrantApplication),
                    status: Some(TaskStatus::New),
                    priority: Some(TaskPriority::High),
                    deadline: NaiveDate::from_ymd_opt(2024, 3, 1),
                    ..TaskDraft::default()
                }),
            )
            .await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Endpoint::CreateTask);
        let payload = &calls[0].1;
        assert_eq!(payload["title"], "Grant X");
        assert_eq!(payload["taskType"], "Grant Application");
        assert_eq!(payload["status"], "New");
        assert_eq!(payload["priority"], "High");
        assert_eq!(payload["deadline"], "2024-03-01");

        let task_id = payload["taskId"].as_str().unwrap();
        let digits = task_id.strip_prefix("TASK-").unwrap();
        assert_eq!(digits.len(), 14);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(
            notices(&pass)[0],
            Notice::success(format!("✅ Task {task_id} created successfully!"))
        );
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        dash.handle(
            session_on(View::ManageTasks),
            Event::CreateTask(TaskDraft {
                title: "Gala".into(),
                task_type: Some(TaskType::Other),
                ..TaskDraft::default()
            }),
        )
        .await;
        let payload = &sink.calls()[0].1;
        assert_eq!(payload["status"], "New");
        assert_eq!(payload["priority"], "High");
        assert_eq!(
            payload["deadline"],
            Local::now().date_naive().format(DATE_FORMAT).to_string()
        );
    }

    #[tokio::test]
    async fn test_create_task_requires_title_and_type() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        for draft in [
            TaskDraft {
                title: "   ".into(),
                task_type: Some(TaskType::Other),
                ..TaskDraft::default()
            },
            TaskDraft {
                title: "Grant X".into(),
                ..TaskDraft::default()
            },
        ] {
            let pass = dash
                .handle(session_on(View::ManageTasks), Event::CreateTask(draft))
                .await;
            assert_eq!(
                notices(&pass),
                vec![Notice::error("❌ Please fill in all required fields (*)")]
            );
        }
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_task_id_search_picks_first_match() {
        let dash = dashboard(source(), Arc::new(RecordingSink::accepting()));
        let (session, page) = dash
            .process(
                session_on(View::ManageTasks),
                Event::SearchTaskIds {
                    query: "TASK-2024".into(),
                },
            )
            .await;
        let Body::ManageTasks(body) = page.body else {
            panic!("expected tasks view");
        };
        assert_eq!(body.choices.len(), 1);
        assert_eq!(body.choices[0].label, "TASK-20240101-1200 - Grant X");
        assert_eq!(session.selected_task.as_deref(), Some("TASK-20240101-1200"));

        // Out-of-set values fall back in the prefilled form.
        let form = body.selected.unwrap();
        assert_eq!(form.status, "In Progress");
        assert_eq!(form.priority, "Medium");
        assert_eq!(form.deadline, body.today);
    }

    #[tokio::test]
    async fn test_task_id_search_without_match_warns() {
        let dash = dashboard(source(), Arc::new(RecordingSink::accepting()));
        let (_, page) = dash
            .process(
                session_on(View::ManageTasks),
                Event::SearchTaskIds {
                    query: "TASK-1999".into(),
                },
            )
            .await;
        assert!(page.notices.contains(&Notice::warning("⚠️ No tasks found matching 'TASK-1999'")));
    }

    #[tokio::test]
    async fn test_update_task_flash_and_reset() {
        let src = source();
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(src.clone(), sink.clone());
        let mut session = session_on(View::ManageTasks);
        session.task_id_search = "2023".into();

        let (session, page) = dash
            .process(
                session,
                Event::UpdateTask(TaskEdit {
                    task_id: "TASK-20230505-0900".into(),
                    title: "RFP Y (final)".into(),
                    status: Some(TaskStatus::Completed),
                    ..TaskEdit::default()
                }),
            )
            .await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        let payload = &calls[0].1;
        assert_eq!(payload["taskType"], "RFP Submission");
        assert_eq!(payload["priority"], "Medium");
        assert_eq!(payload["status"], "Completed");
        assert!(payload.get("timestamp").is_none());

        assert_eq!(
            page.notices[0],
            Notice::success("✅ Task TASK-20230505-0900 updated successfully!")
        );
        assert!(session.flash.is_none());
        assert!(session.task_id_search.is_empty());
        // Caches were dropped, so the render re-read the sheet.
        assert!(src.reads() >= 2);

        let (_, page) = dash.process(session, Event::Show).await;
        assert!(page.notices.is_empty());
    }

    #[tokio::test]
    async fn test_update_carries_sheet_task_type() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        dash.handle(
            session_on(View::ManageTasks),
            Event::UpdateTask(TaskEdit {
                task_id: "TASK-20240101-1200".into(),
                title: "Grant X".into(),
                ..TaskEdit::default()
            }),
        )
        .await;
        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["taskType"], "Grant Application");
    }

    #[tokio::test]
    async fn test_update_with_store_offline_does_not_dispatch() {
        let src = source();
        src.set_offline(true);
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(src, sink.clone());

        let (_, page) = dash
            .process(
                session_on(View::ManageTasks),
                Event::UpdateTask(TaskEdit {
                    task_id: "TASK-20240101-1200".into(),
                    title: "Grant X".into(),
                    ..TaskEdit::default()
                }),
            )
            .await;

        assert!(sink.calls().is_empty());
        assert!(page.notices.contains(&Notice::warning(
            "⚠️ Task TASK-20240101-1200 was not updated: the task sheet could not be read"
        )));
        assert!(page.notices.iter().any(|n| n.text.contains("OPSI")));
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_rejected() {
        let sink = Arc::new(RecordingSink::accepting());
        let dash = dashboard(source(), sink.clone());
        let pass = dash
            .handle(
                session_on(View::ManageTasks),
                Event::UpdateTask(TaskEdit {
                    task_id: "TASK-19990101000000".into(),
                    ..TaskEdit::default()
                }),
            )
            .await;
        assert!(sink.calls().is_empty());
        assert_eq!(
            notices(&pass),
            vec![Notice::error("❌ Task TASK-19990101000000 not found")]
        );
    }

    #[tokio::test]
    async fn test_update_failure_keeps_search() {
        let sink = Arc::new(RecordingSink::failing(DispatchError::Timeout));
        let dash = dashboard(source(), sink);
        let mut session = session_on(View::ManageTasks);
        session.task_id_search = "2023".into();
        let pass = dash
            .handle(
                session,
                Event::UpdateTask(TaskEdit {
                    task_id: "TASK-20230505-0900".into(),
                    ..TaskEdit::default()
                }),
            )
            .await;
        assert_eq!(pass.session.task_id_search, "2023");
        assert!(notices(&pass)[0].text.contains("timed out"));
    }

    #[tokio::test]
    async fn test_store_failure_shows_message_and_empty_views() {
        let src = source();
        src.set_offline(true);
        let dash = dashboard(src, Arc::new(RecordingSink::accepting()));
        let (_, page) = dash.process(Session::new(), Event::Show).await;
        assert_eq!(page.notices.len(), 2);
        assert!(page.notices[0].text.contains("DAPHNE"));
        let Body::Overview(body) = page.body else {
            panic!("expected overview");
        };
        assert_eq!(body.metrics[0], Metric::new("Total Donor Prospects", 0));
        assert!(body.recent_prospects.is_empty());
    }

    #[tokio::test]
    async fn test_overview_metrics() {
        let dash = dashboard(source(), Arc::new(RecordingSink::accepting()));
        let (_, page) = dash.process(Session::new(), Event::Show).await;
        assert_eq!(page.agents.len(), 3);
        let Body::Overview(body) = page.body else {
            panic!("expected overview");
        };
        assert_eq!(
            body.metrics,
            vec![
                Metric::new("Total Donor Prospects", 4),
                Metric::new("Approved Prospects", 1),
                Metric::new("Pending Tasks", 1),
                Metric::new("Active Tasks", 2),
            ]
        );
        assert_eq!(
            body.recent_tasks.columns,
            vec!["Task ID", "Task Title", "Status", "Priority"]
        );
    }

    #[tokio::test]
    async fn test_overview_lists_first_rows() {
        let rows: Vec<Record> = (1..=7)
            .map(|i| prospect(&format!("D-{i}"), "Ada", "pending review"))
            .collect();
        let src = Arc::new(
            MemorySource::new()
                .with_sheet("prospects", rows)
                .with_sheet("tasks", Vec::new()),
        );
        let dash = dashboard(src, Arc::new(RecordingSink::accepting()));
        let (_, page) = dash.process(Session::new(), Event::Show).await;
        let Body::Overview(body) = page.body else {
            panic!("expected overview");
        };
        let ids: Vec<&str> = body
            .recent_prospects
            .rows
            .iter()
            .map(|r| r[0].as_str())
            .collect();
        assert_eq!(ids, vec!["D-1", "D-2", "D-3", "D-4", "D-5"]);
    }

    #[tokio::test]
    async fn test_refresh_rereads_store() {
        let src = source();
        let dash = dashboard(src.clone(), Arc::new(RecordingSink::accepting()));
        let (session, _) = dash.process(Session::new(), Event::Show).await;
        let (session, _) = dash.process(session, Event::Show).await;
        assert_eq!(src.reads(), 2);
        dash.process(session, Event::Refresh).await;
        assert_eq!(src.reads(), 4);
    }

    #[test]
    fn test_new_task_id_format() {
        let at = Local::now();
        let id = new_task_id(at);
        assert_eq!(id, format!("TASK-{}", at.format("%Y%m%d%H%M%S")));
        assert_eq!(id.len(), "TASK-".len() + 14);
    }
}
