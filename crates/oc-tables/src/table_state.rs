//! Table State
//!
//! Pagination, sorting, and the hideable filter panel of one table view.
//! Setters do not validate page bounds: an out-of-range page simply comes
//! back empty from the engine and the summary reports it.

use std::sync::Arc;

use oc_core::SortDirection;

use crate::columns::ColumnSet;
use crate::fetch::FetchRequest;
use crate::sorts::{SortChangeHandler, SortState};
use crate::values::FilterValues;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub struct TableState {
    page: u32,
    page_size: u32,
    sort: SortState,
    show_hideable_filters: bool,
    columns: ColumnSet,
    on_sort_change: Option<Arc<dyn SortChangeHandler>>,
}

impl std::fmt::Debug for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("sort", &self.sort)
            .field("show_hideable_filters", &self.show_hideable_filters)
            .field("has_sort_handler", &self.on_sort_change.is_some())
            .finish()
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, SortState::unsorted())
    }
}

impl TableState {
    /// Page 0 with the given page size and initial sort.
    /// A zero page size falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page_size: u32, initial_sort: SortState) -> Self {
        Self {
            page: 0,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
            sort: initial_sort,
            show_hideable_filters: false,
            columns: ColumnSet::new(),
            on_sort_change: None,
        }
    }

    /// Restrict `sortBy` to the sortable columns of `columns`
    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    /// Forward sort changes to `handler`
    pub fn with_sort_handler(mut self, handler: Arc<dyn SortChangeHandler>) -> Self {
        self.on_sort_change = Some(handler);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort.sort_by.as_deref()
    }

    pub fn sort_order(&self) -> SortDirection {
        self.sort.sort_order
    }

    pub fn show_hideable_filters(&self) -> bool {
        self.show_hideable_filters
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    /// Set the page size; zero is ignored since a page must hold something
    pub fn set_page_size(&mut self, page_size: u32) {
        if page_size == 0 {
            tracing::warn!("ignoring page size 0");
            return;
        }
        self.page_size = page_size;
    }

    /// Adopt a new sort and forward it to the external handler.
    ///
    /// Returns false, leaving the state untouched, when `sort_by` is not a
    /// sortable column. Fetching is up to the caller.
    pub fn handle_sort_change(&mut self, sort_by: &str, sort_order: SortDirection) -> bool {
        if !self.columns.can_sort_by(sort_by) {
            tracing::warn!(sort_by, "column is not sortable");
            return false;
        }
        self.sort = SortState::by(sort_by, sort_order);
        self.notify_sort_change();
        true
    }

    /// Adopt a sort read from the URL on mount
    pub(crate) fn hydrate_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.notify_sort_change();
    }

    fn notify_sort_change(&self) {
        if let (Some(handler), Some(sort_by)) = (&self.on_sort_change, self.sort.sort_by.as_deref()) {
            handler.on_sort_change(sort_by, self.sort.sort_order);
        }
    }

    pub fn handle_toggle_hideable_filters(&mut self) {
        self.show_hideable_filters = !self.show_hideable_filters;
    }

    /// Fetch parameters for the current state
    pub fn fetch_request(&self, filters: &FilterValues) -> FetchRequest {
        FetchRequest {
            page: self.page,
            size: self.page_size,
            filters: (!filters.is_empty()).then(|| filters.clone()),
            sort_by: self.sort.sort_by.clone(),
            sort_order: self.sort.sort_by.as_ref().map(|_| self.sort.sort_order),
        }
    }
}
