//! Server-side HTML for a [`Page`]. Every form posts to `/events` with an
//! `action` field naming the [`crate::Event`].

use std::fmt::Write;

use crate::event::PICK_PREFIX;
use crate::page::{ApproveBody, Body, Metric, OverviewBody, Page, Table, TaskForm, TasksBody};
use crate::session::{Level, View};

const STYLE: &str = include_str!("dashboard.css");

/// Escape text for element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() { "N/A" } else { s }
}

/// Full HTML document.
pub fn render_page(page: &Page) -> String {
    let mut html = String::with_capacity(16 * 1024);
    let title = escape_html(&page.title);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} · Command Center</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <header><h1>{title} Command Center</h1>\
         <p>AI-powered donor prospecting, outreach and operations</p></header>\n"
    );

    html.push_str("<nav>");
    for view in View::ALL {
        let class = if view == page.view { " class=\"active\"" } else { "" };
        let _ = write!(
            html,
            "<a href=\"/view/{}\"{class}>{}</a>",
            view.slug(),
            view.label()
        );
    }
    html.push_str(&action_form("refresh", "", "🔄 Refresh Data", "secondary"));
    html.push_str("</nav>\n<main>\n");

    for notice in &page.notices {
        let level = match notice.level {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        let _ = write!(
            html,
            "<div class=\"notice {level}\">{}</div>\n",
            escape_html(&notice.text)
        );
    }

    match &page.body {
        Body::Overview(body) => render_overview(&mut html, page, body),
        Body::ApproveProspects(body) => render_approve(&mut html, body),
        Body::ManageTasks(body) => render_tasks(&mut html, body),
    }

    let _ = write!(
        html,
        "</main>\n<footer>Last updated {}</footer>\n</body>\n</html>\n",
        escape_html(&page.generated_at)
    );
    html
}

/// A one-button form posting `action` plus pre-rendered hidden inputs.
fn action_form(action: &str, hidden: &str, label: &str, class: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/events\">\
         <input type=\"hidden\" name=\"action\" value=\"{action}\">{hidden}\
         <button type=\"submit\" class=\"{class}\">{}</button></form>",
        escape_html(label)
    )
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{name}\" value=\"{}\">",
        escape_html(value)
    )
}

fn render_metrics(html: &mut String, metrics: &[Metric]) {
    html.push_str("<div class=\"metrics\">");
    for metric in metrics {
        let _ = write!(
            html,
            "<div class=\"metric-card\"><div class=\"value\">{}</div>\
             <div class=\"label\">{}</div></div>",
            metric.value,
            escape_html(metric.label)
        );
    }
    html.push_str("</div>\n");
}

fn render_table(html: &mut String, table: &Table) {
    html.push_str("<table><thead><tr>");
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>\n");
}

fn search_form(html: &mut String, action: &str, placeholder: &str, value: &str) {
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/events\" class=\"search\">\
         <input type=\"hidden\" name=\"action\" value=\"{action}\">\
         <input type=\"text\" name=\"query\" placeholder=\"{}\" value=\"{}\">\
         <button type=\"submit\" class=\"secondary\">Search</button></form>\n",
        escape_html(placeholder),
        escape_html(value)
    );
}

fn select_options(html: &mut String, name: &str, options: &[&str], current: Option<&str>) {
    let _ = write!(html, "<select name=\"{name}\">");
    for option in options {
        let selected = if Some(*option) == current { " selected" } else { "" };
        let text = escape_html(option);
        let _ = write!(html, "<option value=\"{text}\"{selected}>{text}</option>");
    }
    html.push_str("</select>");
}

fn render_overview(html: &mut String, page: &Page, body: &OverviewBody) {
    html.push_str("<section><h2>🤖 Agent Status</h2><div class=\"agents\">");
    for agent in &page.agents {
        let _ = write!(
            html,
            "<div class=\"agent-card\"><h3>{}</h3><p>{}</p>\
             <span class=\"status-active\">● {}</span></div>",
            escape_html(agent.name),
            escape_html(agent.description),
            escape_html(agent.status)
        );
    }
    html.push_str("</div></section>\n<section><h2>📊 Key Metrics</h2>");
    render_metrics(html, &body.metrics);
    html.push_str("</section>\n<section class=\"grid-2\"><div><h3>Recent Donor Prospects</h3>");
    if body.recent_prospects.is_empty() {
        html.push_str("<div class=\"notice info\">No donor prospects yet.</div>");
    } else {
        render_table(html, &body.recent_prospects);
    }
    html.push_str("</div><div><h3>Recent Tasks</h3>");
    if body.recent_tasks.is_empty() {
        html.push_str("<div class=\"notice info\">No tasks yet.</div>");
    } else {
        render_table(html, &body.recent_tasks);
    }
    html.push_str("</div></section>\n");
}

fn render_approve(html: &mut String, body: &ApproveBody) {
    html.push_str("<section><h2>✅ Approve Donor Prospects</h2>");

    if let Some(message) = &body.empty_message {
        let _ = write!(html, "<div class=\"notice info\">{}</div></section>\n", escape_html(message));
        return;
    }
    if let Some(message) = &body.all_reviewed_message {
        let _ = write!(html, "<div class=\"notice info\">{}</div>", escape_html(message));
    } else {
        render_metrics(html, &body.metrics);
    }

    if !body.approved.is_empty() {
        html.push_str("<details open><summary>View Approved Prospects</summary><ul>");
        for id in &body.approved {
            let _ = write!(html, "<li>{}</li>", escape_html(id));
        }
        html.push_str("</ul></details>");
    }

    if !body.pending.is_empty() && body.selectable {
        html.push_str("<h3>Select Prospects to Approve</h3>");
        let flip = (!body.select_all).to_string();
        let label = if body.select_all { "☐ Clear Selection" } else { "☑ Select All" };
        html.push_str(&action_form("select_all", &hidden("selected", &flip), label, "secondary"));

        html.push_str(
            "<form method=\"post\" action=\"/events\">\
             <input type=\"hidden\" name=\"action\" value=\"approve_selected\">\
             <div class=\"prospects\">",
        );
        for row in &body.pending {
            html.push_str("<div class=\"prospect-row\"><span>");
            if let Some(id) = &row.donor_id {
                let checked = if row.selected { " checked" } else { "" };
                let _ = write!(
                    html,
                    "<input type=\"checkbox\" name=\"{PICK_PREFIX}{}\"{checked}>",
                    escape_html(id)
                );
            }
            let _ = write!(
                html,
                "</span><strong>{}</strong><span>{}</span><span>{}</span><code>{}</code></div>",
                escape_html(or_na(&row.name)),
                escape_html(or_na(&row.organization)),
                escape_html(or_na(&row.email)),
                escape_html(or_na(row.donor_id.as_deref().unwrap_or("")))
            );
        }
        let _ = write!(
            html,
            "</div><p>Selected: <strong>{}</strong></p>\
             <button type=\"submit\">✅ Approve Selected Prospects</button></form>\n",
            body.selected_count
        );
    }

    html.push_str("</section>\n<section>");
    search_form(
        html,
        "search_prospects",
        "🔍 Search prospects by name, email, or organization...",
        &body.search,
    );
    let _ = write!(html, "<p><strong>{}</strong></p>", escape_html(&body.results_summary));
    if !body.results.is_empty() {
        render_table(html, &body.results);
    }
    html.push_str("</section>\n");
}

fn render_tasks(html: &mut String, body: &TasksBody) {
    html.push_str(
        "<section><h2>📋 OPSI Task Management</h2>\
         <p>Manage tasks, RFPs, and operational workflows.</p>\
         <h3>📝 Create New Task</h3>\
         <form method=\"post\" action=\"/events\">\
         <input type=\"hidden\" name=\"action\" value=\"create_task\">\
         <div class=\"grid-2\"><div>\
         <label>Task Title *</label><input type=\"text\" name=\"title\">\
         <label>Task Type *</label>",
    );
    select_options(html, "task_type", &body.task_types, None);
    let _ = write!(
        html,
        "<label>Assigned To</label><input type=\"text\" name=\"assigned_to\">\
         </div><div><label>Deadline</label>\
         <input type=\"date\" name=\"deadline\" value=\"{}\"><label>Status *</label>",
        escape_html(&body.today)
    );
    select_options(html, "status", &body.statuses, None);
    html.push_str("<label>Priority *</label>");
    select_options(html, "priority", &body.priorities, None);
    html.push_str(
        "</div></div><label>Notes</label><textarea name=\"notes\" rows=\"3\"></textarea>\
         <p><button type=\"submit\">📋 Create Task</button></p></form></section>\n",
    );

    if body.has_tasks {
        html.push_str("<section><h3>✏️ Update Task</h3>");
        search_form(html, "search_task_ids", "🔍 Search by Task ID", &body.id_search);
        if !body.choices.is_empty() {
            html.push_str(
                "<form method=\"post\" action=\"/events\">\
                 <input type=\"hidden\" name=\"action\" value=\"select_task\">\
                 <label>Select Task:</label><select name=\"task_id\">",
            );
            for choice in &body.choices {
                let selected = if choice.selected { " selected" } else { "" };
                let _ = write!(
                    html,
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape_html(&choice.id),
                    escape_html(&choice.label)
                );
            }
            html.push_str("</select> <button type=\"submit\" class=\"secondary\">Open</button></form>");
        }
        if let Some(form) = &body.selected {
            render_task_form(html, body, form);
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section><h3>Active Tasks</h3>");
    if body.has_tasks {
        search_form(
            html,
            "search_tasks",
            "🔍 Search tasks by title, assignee, or type...",
            &body.search,
        );
        render_table(html, &body.tasks);
    } else {
        html.push_str("<div class=\"notice info\">No tasks found. Create your first task above.</div>");
    }
    html.push_str("</section>\n");
}

fn render_task_form(html: &mut String, body: &TasksBody, form: &TaskForm) {
    html.push_str("<div class=\"grid-2\"><div><h4>Current Details:</h4><ul>");
    for (label, value) in &form.current {
        let _ = write!(
            html,
            "<li><strong>{}:</strong> {}</li>",
            escape_html(label),
            escape_html(value)
        );
    }
    let _ = write!(
        html,
        "</ul></div><div><h4>Update:</h4>\
         <form method=\"post\" action=\"/events\">\
         <input type=\"hidden\" name=\"action\" value=\"update_task\">{}\
         <label>Title:</label><input type=\"text\" name=\"title\" value=\"{}\">\
         <label>Assigned To:</label><input type=\"text\" name=\"assigned_to\" value=\"{}\">\
         <label>Deadline:</label><input type=\"date\" name=\"deadline\" value=\"{}\">\
         <label>Status:</label>",
        hidden("task_id", &form.task_id),
        escape_html(&form.title),
        escape_html(&form.assigned_to),
        escape_html(&form.deadline)
    );
    select_options(html, "status", &body.statuses, Some(form.status));
    html.push_str("<label>Priority:</label>");
    select_options(html, "priority", &body.priorities, Some(form.priority));
    let _ = write!(
        html,
        "<label>Notes:</label><textarea name=\"notes\" rows=\"3\">{}</textarea>\
         <p><button type=\"submit\">💾 Update Task</button></p></form></div></div>",
        escape_html(&form.notes)
    );
}
