//! # OpsDesk Core
//!
//! Shared building blocks for the command center:
//! - [`Record`] — one spreadsheet row, column order preserved
//! - [`Prospect`] / [`Task`] — typed read-only views over records
//! - [`OpsDeskConfig`] — TOML configuration with per-field defaults
//! - [`OpsDeskError`] — the error taxonomy shared across crates

pub mod config;
pub mod error;
pub mod record;
pub mod types;

pub use config::OpsDeskConfig;
pub use error::{OpsDeskError, Result};
pub use record::Record;
pub use types::{Prospect, Task, TaskPriority, TaskStatus, TaskType};
