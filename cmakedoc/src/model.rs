//! Option inventory data model.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Category used when a declaration has no `CATEGORY "..."`.
pub const DEFAULT_CATEGORY: &str = "General";

/// One `hpx_option(...)` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRecord {
    pub name: String,
    /// Declared type, e.g. `BOOL`, `STRING`
    #[serde(rename = "type")]
    pub kind: String,
    pub docstring: String,
    /// Raw `STRINGS "..."` value, empty when absent
    pub values: String,
    pub advanced: bool,
}

impl fmt::Display for OptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {:?} values={:?}{}",
            self.name,
            self.kind,
            self.docstring,
            self.values,
            if self.advanced { " [advanced]" } else { "" }
        )
    }
}

/// Options grouped by category. Records keep declaration order within a
/// category; categories iterate by name.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct OptionCatalog {
    categories: BTreeMap<String, Vec<OptionRecord>>,
}

impl OptionCatalog {
    pub fn insert(&mut self, category: &str, record: OptionRecord) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(record);
    }

    #[cfg(test)]
    pub fn get(&self, category: &str) -> Option<&[OptionRecord]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[OptionRecord])> {
        self.categories
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Total number of records across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Plain-text listing: each category followed by its indented records.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (category, records) in self.categories() {
            out.push_str(category);
            out.push('\n');
            for record in records {
                out.push_str(&format!("    {record}\n"));
            }
        }
        out
    }
}

/// Outcome of parsing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Parsed,
    Failed { reason: String },
}

/// Per-file result, one for every file the extractor visited.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl FileReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}
