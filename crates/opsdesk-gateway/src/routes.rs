//! API route handlers for the gateway.

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use opsdesk_dashboard::render::render_page;
use opsdesk_dashboard::{Event, Notice, Page, View};
use std::collections::HashMap;
use std::sync::Arc;

use crate::server::AppState;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "opsdesk_session";

/// Session id from the `Cookie` header, if any.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

/// Run one pass for the caller's session.
/// Returns the `Set-Cookie` value when a session was just created.
async fn run_pass(state: &AppState, headers: &HeaderMap, event: Event) -> (Option<String>, Page) {
    let cookie = session_cookie(headers);
    let (id, handle, created) = state.sessions.open(cookie.as_deref()).await;

    let mut session = handle.lock().await;
    let (next, page) = state.dashboard.process(session.clone(), event).await;
    *session = next;
    drop(session);

    let set_cookie =
        created.then(|| format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"));
    (set_cookie, page)
}

fn with_cookie(set_cookie: Option<String>, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if let Some(value) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Current view as HTML.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (cookie, page) = run_pass(&state, &headers, Event::Show).await;
    with_cookie(cookie, Html(render_page(&page)))
}

/// Navigate to `/view/{overview|approve|tasks}`.
pub async fn view(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(view) = View::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("Unknown view '{slug}'")).into_response();
    };
    let (cookie, page) = run_pass(&state, &headers, Event::Navigate { view }).await;
    with_cookie(cookie, Html(render_page(&page)))
}

/// HTML form post. The `action` field selects the event.
pub async fn form_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match Event::from_form(&form) {
        Ok(event) => {
            let (cookie, page) = run_pass(&state, &headers, event).await;
            with_cookie(cookie, Html(render_page(&page)))
        }
        Err(e) => {
            tracing::warn!("⚠️ Rejected form post: {e}");
            let (cookie, mut page) = run_pass(&state, &headers, Event::Show).await;
            page.notices.insert(0, Notice::warning(e.to_string()));
            with_cookie(cookie, (StatusCode::BAD_REQUEST, Html(render_page(&page))))
        }
    }
}

/// Current view as JSON.
pub async fn api_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (cookie, page) = run_pass(&state, &headers, Event::Show).await;
    with_cookie(cookie, Json(page))
}

/// JSON event, answered with the resulting page.
pub async fn api_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<Event>,
) -> Response {
    let (cookie, page) = run_pass(&state, &headers, event).await;
    with_cookie(cookie, Json(page))
}

/// Agent statuses and server counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "title": state.dashboard.settings().title,
        "agents": state.dashboard.feeds().statuses(),
        "sessions": state.sessions.len().await,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "opsdesk-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
