//! Sort state
//!
//! A table sorts by at most one column. The direction is kept even when no
//! column is selected so that picking a column keeps the last direction.

use oc_core::SortDirection;
use serde::{Deserialize, Serialize};

/// Current sort column and direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortDirection,
}

impl SortState {
    /// No sort column, ascending
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(sort_by: impl Into<String>, sort_order: SortDirection) -> Self {
        Self {
            sort_by: Some(sort_by.into()),
            sort_order,
        }
    }

    pub fn asc(sort_by: impl Into<String>) -> Self {
        Self::by(sort_by, SortDirection::Asc)
    }

    pub fn desc(sort_by: impl Into<String>) -> Self {
        Self::by(sort_by, SortDirection::Desc)
    }

    pub fn is_sorted(&self) -> bool {
        self.sort_by.is_some()
    }

    pub fn sorts_by(&self, column: &str) -> bool {
        self.sort_by.as_deref() == Some(column)
    }

    /// The state after a header click on `column`: same column flips the
    /// direction, another column starts ascending.
    pub fn toggled(&self, column: &str) -> Self {
        if self.sorts_by(column) {
            Self::by(column, self.sort_order.reverse())
        } else {
            Self::asc(column)
        }
    }
}

/// Receives sort changes, typically to drive server-side sorting
#[cfg_attr(test, mockall::automock)]
pub trait SortChangeHandler: Send + Sync {
    fn on_sort_change(&self, sort_by: &str, sort_order: SortDirection);
}

impl<F> SortChangeHandler for F
where
    F: Fn(&str, SortDirection) + Send + Sync,
{
    fn on_sort_change(&self, sort_by: &str, sort_order: SortDirection) {
        self(sort_by, sort_order)
    }
}
