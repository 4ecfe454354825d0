//! # OpsDesk Sheets
//!
//! Read side of the command center.
//!
//! ```text
//! Feed (prospects / tasks / leads)
//!   └── CachedSheets (TTL per sheet id, invalidate / invalidate_all)
//!         └── dyn SheetSource
//!               ├── SheetsClient  (service account → bearer token → values API)
//!               └── Disconnected  (credentials unusable — every read fails)
//! ```
//!
//! Rows come back as [`opsdesk_core::Record`]s; column aliases are folded onto
//! canonical names at the feed boundary.

pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod feed;
pub mod memory;

use async_trait::async_trait;
use opsdesk_core::Record;

pub use cache::{CachedSheets, TtlCache};
pub use client::{Disconnected, SheetsClient, connect_or_disconnected};
pub use error::SheetsError;
pub use feed::{AgentStatus, Feed, FeedRead, Feeds};
pub use memory::MemorySource;

/// Anything that can return every row of a sheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// All data rows of the addressed sheet, in sheet order.
    async fn fetch_sheet(&self, sheet_id: &str) -> Result<Vec<Record>, SheetsError>;
}
