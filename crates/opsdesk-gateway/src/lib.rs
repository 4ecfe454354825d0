//! # OpsDesk Gateway
//!
//! Axum server in front of the dashboard controller: HTML pages and form
//! posts for browsers, a JSON mirror of the same events under `/api/v1`.

pub mod routes;
pub mod server;

pub use server::{AppState, SessionStore, build_router, start};
