//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use opsdesk_core::config::GatewayConfig;
use opsdesk_dashboard::{Dashboard, Session};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// One user's session, locked for the whole handle + render pass.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub start_time: Instant,
    /// The controller, shared by every session.
    pub dashboard: Arc<Dashboard>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(gateway_config: GatewayConfig, dashboard: Arc<Dashboard>) -> Self {
        let sessions = Arc::new(SessionStore::from_config(&gateway_config));
        Self {
            gateway_config,
            start_time: Instant::now(),
            dashboard,
            sessions,
        }
    }
}

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory sessions keyed by the session cookie. Lost on restart.
///
/// Idle sessions are pruned whenever a session is opened, and the map never
/// grows past `max_sessions`.
pub struct SessionStore {
    sessions: tokio::sync::Mutex<HashMap<String, SessionEntry>>,
    idle: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::with_limits(
            Duration::from_secs(config.session_idle_secs),
            config.max_sessions,
        )
    }

    pub fn with_limits(idle: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: tokio::sync::Mutex::new(HashMap::new()),
            idle,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Session for a cookie value, creating one when needed.
    /// Returns `(id, handle, created)`; `created` means the client needs a new cookie.
    pub async fn open(&self, cookie: Option<&str>) -> (String, SessionHandle, bool) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle);
        if sessions.len() < before {
            tracing::debug!("🧹 Dropped {} idle session(s)", before - sessions.len());
        }

        let known = cookie.and_then(|id| uuid::Uuid::parse_str(id).ok());
        if let Some(id) = known.map(|id| id.to_string()) {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (id, entry.handle.clone(), false);
            }
            // Well-formed but unknown (restart or expiry): recreate under the same id.
            let handle = Self::insert(&mut sessions, self.max_sessions, id.clone(), now);
            return (id, handle, false);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let handle = Self::insert(&mut sessions, self.max_sessions, id.clone(), now);
        tracing::debug!("🔑 New session {id}");
        (id, handle, true)
    }

    fn insert(
        sessions: &mut HashMap<String, SessionEntry>,
        max_sessions: usize,
        id: String,
        now: Instant,
    ) -> SessionHandle {
        while sessions.len() >= max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }
        let handle = SessionHandle::default();
        sessions.insert(
            id,
            SessionEntry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        handle
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);
    Router::new()
        .route("/", get(super::routes::index))
        .route("/view/{view}", get(super::routes::view))
        .route("/events", post(super::routes::form_event))
        .route("/api/v1/page", get(super::routes::api_page))
        .route("/api/v1/events", post(super::routes::api_event))
        .route("/api/v1/status", get(super::routes::status))
        .route("/health", get(super::routes::health_check))
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(Duration::from_secs(3600));

            // OPSDESK_CORS_ORIGINS=https://ops.example.org,https://admin.example.org
            if let Ok(origins_str) = std::env::var("OPSDESK_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, dashboard: Arc<Dashboard>) -> anyhow::Result<()> {
    let app = build_router(AppState::new(config.clone(), dashboard));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Command center listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
