//! Table Columns
//!
//! Columns define which attributes a table shows and which of them the
//! engine can sort by.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A table column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column identifier, also the `sortBy` value sent to the engine
    pub id: String,
    /// Display caption
    pub label: String,
    /// Whether the engine accepts this column as `sortBy`
    #[serde(default)]
    pub sortable: bool,
}

impl Column {
    /// Create a non-sortable column
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sortable: false,
        }
    }

    /// Create a sortable column
    pub fn sortable(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label).with_sortable(true)
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}

/// An ordered set of columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Create a new empty column set
    pub fn new() -> Self {
        Self { columns: vec![] }
    }

    /// Add a column (builder pattern)
    pub fn with(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` may be used as `sortBy`.
    ///
    /// An empty set places no restriction, so views built without column
    /// metadata accept any sort column.
    pub fn can_sort_by(&self, id: &str) -> bool {
        self.is_empty() || self.get(id).map(|c| c.sortable).unwrap_or(false)
    }

    pub fn sortable_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.sortable).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    /// Column ids that appear more than once
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| !seen.insert(*id))
            .collect()
    }
}
