//! Record — one spreadsheet row as an ordered column → scalar mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of untyped data. Columns keep the order of the sheet header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a header row and a (possibly short) data row.
    /// Missing trailing cells become empty strings; blank headers are skipped.
    pub fn from_row(headers: &[String], cells: &[Value]) -> Self {
        let mut fields = Map::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let value = cells
                .get(idx)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            fields.insert(header.clone(), value);
        }
        Self { fields }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Cell rendered as text. Absent and null cells are empty.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(scalar_text).unwrap_or_default()
    }

    /// Cell text, or `None` when absent or blank.
    pub fn non_empty(&self, column: &str) -> Option<String> {
        let text = self.text(column);
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Case-insensitive substring test. `needle` must already be lowercase.
    pub fn contains_lower(&self, column: &str, needle: &str) -> bool {
        self.text(column).to_lowercase().contains(needle)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| scalar_text(v).trim().is_empty())
    }

    /// Rename alias columns onto canonical names. `aliases` is `(alias, canonical)`.
    /// A canonical column that is already present keeps its value.
    pub fn normalized(self, aliases: &[(&str, &str)]) -> Self {
        if aliases.is_empty() {
            return self;
        }
        let mut fields = Map::with_capacity(self.fields.len());
        for (column, value) in self.fields.iter() {
            let canonical = aliases
                .iter()
                .find(|(alias, _)| *alias == column)
                .map(|(_, canonical)| *canonical);
            match canonical {
                Some(name) if self.fields.contains_key(name) => continue,
                Some(name) => {
                    fields.insert(name.to_string(), value.clone());
                }
                None => {
                    fields.insert(column.clone(), value.clone());
                }
            }
        }
        Self { fields }
    }

    /// `(column, text)` pairs for the requested columns that exist in this record.
    pub fn project(&self, columns: &[&str]) -> Vec<(String, String)> {
        columns
            .iter()
            .filter(|c| self.has(c))
            .map(|c| (c.to_string(), self.text(c)))
            .collect()
    }
}

/// Text form of a scalar cell.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
