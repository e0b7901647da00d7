//! Result rendering: an `IdentityRecord` as labeled rows in display order.

use std::fmt;

use serde::Serialize;

use crate::models::identity::{IdentityRecord, IDENTITY_FIELDS};

/// One rendered row: Arabic label and extracted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Rows for every present, non-blank field, in the fixed field order.
pub fn render_entries(record: &IdentityRecord) -> Vec<DisplayEntry> {
    IDENTITY_FIELDS
        .iter()
        .filter_map(|field| {
            let value = record.get(field.key)?.trim();
            if value.is_empty() {
                return None;
            }
            Some(DisplayEntry {
                key: field.key,
                label: field.label,
                value: value.to_string(),
            })
        })
        .collect()
}

/// The results area. Each `show` replaces what was displayed before.
#[derive(Debug, Default, Clone)]
pub struct ResultView {
    entries: Vec<DisplayEntry>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, record: &IdentityRecord) {
        self.clear();
        self.entries = render_entries(record);
        tracing::debug!(rows = self.entries.len(), "Results rendered");
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `label: value` per row.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.label, e.value))
            .collect()
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
