//! In-memory sheet source — fixtures, offline runs and tests.

use async_trait::async_trait;
use opsdesk_core::Record;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::SheetSource;
use crate::error::SheetsError;

/// Sheets held in memory. Counts reads and can be switched offline.
#[derive(Default)]
pub struct MemorySource {
    sheets: Mutex<HashMap<String, Vec<Record>>>,
    reads: AtomicUsize,
    offline: AtomicBool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, sheet_id: &str, rows: Vec<Record>) -> Self {
        self.set_sheet(sheet_id, rows);
        self
    }

    /// Replace a sheet's rows, as if edited upstream.
    pub fn set_sheet(&self, sheet_id: &str, rows: Vec<Record>) {
        let mut sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        sheets.insert(sheet_id.to_string(), rows);
    }

    /// While offline every read fails with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reads that reached this source (cache misses).
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for MemorySource {
    async fn fetch_sheet(&self, sheet_id: &str) -> Result<Vec<Record>, SheetsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SheetsError::Connection("store offline".into()));
        }
        let sheets = self.sheets.lock().unwrap_or_else(|e| e.into_inner());
        sheets.get(sheet_id).cloned().ok_or_else(|| SheetsError::Http {
            status: 404,
            body: format!("Requested entity was not found: {sheet_id}"),
        })
    }
}
