//! Table View
//!
//! Ties the filter store, table state, and URL synchronizer of one mounted
//! table together and drives the data fetcher.
//!
//! Lifecycle: a view is built `Uninitialized`, [`TableView::mount`] hydrates
//! it from the URL exactly once and makes it `Ready` (a controlled view
//! first waits for its parent to answer the URL proposal), and
//! [`TableView::unmount`] stops all further URL writes and fetch
//! completions.
//!
//! Overlapping fetches resolve by generation: only the most recently issued
//! fetch may apply its result.

use oc_core::{ConsoleResult, PartitionedPage, SortDirection};
use uuid::Uuid;

use crate::fetch::{DataFetcher, FetchRequest, FetchTicket};
use crate::schema::{FilterConfig, FilterSchema, FilterZone};
use crate::store::FilterValueStore;
use crate::summary::PaginationSummary;
use crate::table_state::TableState;
use crate::url_sync::{build_query_string, Hydration, SyncLifecycle, UrlSynchronizer};
use crate::values::{FilterValue, FilterValues};

#[derive(Debug)]
pub struct TableView<T> {
    id: Uuid,
    resource: String,
    schema: FilterSchema,
    initial_filter_values: FilterValues,
    store: FilterValueStore,
    state: TableState,
    url: UrlSynchronizer,
    reset_page_on_filter_change: bool,
    refresh_counter: u64,
    issued_generation: u64,
    data: Option<PartitionedPage<T>>,
}

impl<T> TableView<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Uuid,
        resource: String,
        schema: FilterSchema,
        initial_filter_values: FilterValues,
        store: FilterValueStore,
        state: TableState,
        url: UrlSynchronizer,
        reset_page_on_filter_change: bool,
    ) -> Self {
        Self {
            id,
            resource,
            schema,
            initial_filter_values,
            store,
            state,
            url,
            reset_page_on_filter_change,
            refresh_counter: 0,
            issued_generation: 0,
            data: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn lifecycle(&self) -> SyncLifecycle {
        self.url.lifecycle()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle() == SyncLifecycle::Ready
    }

    pub fn is_controlled(&self) -> bool {
        self.store.is_controlled()
    }

    pub fn filter_values(&self) -> &FilterValues {
        self.store.values()
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// Latest applied page, if any
    pub fn data(&self) -> Option<&PartitionedPage<T>> {
        self.data.as_ref()
    }

    /// Hydrate from the URL and start syncing. Runs once; later calls are
    /// no-ops returning an empty hydration.
    ///
    /// A controlled view whose URL carries filters proposes them to the
    /// parent and stays `Initializing`, leaving the URL untouched, until the
    /// parent answers through [`TableView::receive_filter_values`].
    pub fn mount(&mut self) -> Hydration {
        if self.lifecycle() != SyncLifecycle::Uninitialized {
            tracing::debug!(view = %self.id, "table view already mounted");
            return Hydration::default();
        }

        let base = if self.store.is_controlled() {
            self.store.values()
        } else {
            &self.initial_filter_values
        };
        let hydration = self
            .url
            .hydrate(self.schema.filters(), base, self.state.columns());

        let mut awaiting_parent = false;
        if let Some(filters) = &hydration.filters {
            if filters != self.store.values() {
                self.store.update(filters.clone());
                awaiting_parent = self.store.is_controlled();
            }
        }
        if let Some(sort) = &hydration.sort {
            self.state.hydrate_sort(sort.clone());
        }

        if awaiting_parent {
            tracing::debug!(view = %self.id, "waiting for the parent to adopt URL filters");
        } else {
            self.url.finish();
            self.sync_url();
        }

        tracing::debug!(
            view = %self.id,
            resource = %self.resource,
            controlled = self.is_controlled(),
            "mounted table view"
        );
        hydration
    }

    /// Stop URL writes and ignore any fetch still in flight
    pub fn unmount(&mut self) {
        self.url.unmount();
        tracing::debug!(view = %self.id, "unmounted table view");
    }

    /// Edit one filter; `None` or an empty value clears it.
    /// Returns whether the view's filter values changed.
    pub fn set_filter(&mut self, id: &str, value: Option<FilterValue>) -> bool {
        if self.schema.leaf(id).is_none() {
            tracing::debug!(view = %self.id, filter = id, "ignoring value for unknown filter");
            return false;
        }
        let changed = self.store.set_filter(id, value);
        if changed {
            self.after_filter_change();
        }
        changed
    }

    /// Replace all filter values
    pub fn set_filters(&mut self, values: FilterValues) -> bool {
        let changed = self.store.update(values);
        if changed {
            self.after_filter_change();
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.store.clear();
        if changed {
            self.after_filter_change();
        }
        changed
    }

    /// Adopt values pushed by the parent of a controlled view.
    ///
    /// The first push after a hydration proposal completes the mount, whether
    /// or not the parent accepted the URL values.
    pub fn receive_filter_values(&mut self, values: FilterValues) -> bool {
        let changed = self.store.receive(values);
        if self.lifecycle() == SyncLifecycle::Initializing && self.store.is_controlled() {
            self.url.finish();
            if changed && self.reset_page_on_filter_change {
                self.state.set_page(0);
            }
            self.sync_url();
        } else if changed {
            self.after_filter_change();
        }
        changed
    }

    fn after_filter_change(&mut self) {
        if self.reset_page_on_filter_change {
            self.state.set_page(0);
        }
        self.sync_url();
    }

    pub fn set_page(&mut self, page: u32) {
        self.state.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.state.set_page_size(page_size);
    }

    pub fn handle_sort_change(&mut self, sort_by: &str, sort_order: SortDirection) -> bool {
        let changed = self.state.handle_sort_change(sort_by, sort_order);
        if changed {
            self.sync_url();
        }
        changed
    }

    /// Header click: flip the direction of the current column or sort a new
    /// one ascending
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        let next = self.state.sort().toggled(column);
        self.handle_sort_change(column, next.sort_order)
    }

    pub fn handle_toggle_hideable_filters(&mut self) {
        self.state.handle_toggle_hideable_filters();
    }

    /// Top-level filters to render given the hideable panel state
    pub fn visible_filters(&self) -> Vec<&FilterConfig> {
        let show_hideable = self.state.show_hideable_filters();
        self.schema
            .filters()
            .iter()
            .filter(|f| show_hideable || f.zone() == FilterZone::ExposedFirstLine)
            .collect()
    }

    /// Ask the caller to refetch with unchanged parameters
    pub fn refresh(&mut self) {
        self.refresh_counter += 1;
    }

    fn sync_url(&mut self) {
        self.url
            .sync(self.schema.filters(), self.store.values(), self.state.sort());
    }

    /// Full query string for the current state, whatever the sync options
    pub fn canonical_query(&self) -> String {
        build_query_string(
            self.schema.filters(),
            self.store.values(),
            Some(self.state.sort()),
        )
    }

    /// Fetch parameters for the current state
    pub fn fetch_request(&self) -> FetchRequest {
        self.state.fetch_request(self.store.values())
    }

    /// Issue a fetch for the current state. Any earlier ticket becomes stale.
    /// Returns `None` once the view is unmounted.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.lifecycle() == SyncLifecycle::Unmounted {
            return None;
        }
        self.issued_generation += 1;
        Some(FetchTicket {
            generation: self.issued_generation,
            request: self.fetch_request(),
        })
    }

    /// Apply the result of `ticket`. Returns false, dropping the page, when
    /// the ticket is stale or the view is unmounted.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, page: PartitionedPage<T>) -> bool {
        if self.lifecycle() == SyncLifecycle::Unmounted {
            tracing::debug!(view = %self.id, generation = ticket.generation, "dropping fetch after unmount");
            return false;
        }
        if ticket.generation != self.issued_generation {
            tracing::debug!(
                view = %self.id,
                generation = ticket.generation,
                latest = self.issued_generation,
                "dropping stale fetch"
            );
            return false;
        }
        self.data = Some(page);
        true
    }

    /// Fetch the current state with `fetcher` and apply the result.
    ///
    /// Fetch errors are returned untouched and leave the current data as is.
    pub async fn load<F>(&mut self, fetcher: &F) -> ConsoleResult<bool>
    where
        F: DataFetcher<T> + ?Sized,
    {
        let Some(ticket) = self.begin_fetch() else {
            return Ok(false);
        };
        let page = fetcher.fetch_data(ticket.request.clone()).await?;
        Ok(self.complete_fetch(ticket, page))
    }

    /// Summary line for one partition of the current data
    pub fn partition_summary(&self, partition: u32) -> PaginationSummary {
        let count = self
            .data
            .as_ref()
            .and_then(|d| d.partition(partition))
            .and_then(|p| p.count);
        PaginationSummary::compute(count, self.state.page(), self.state.page_size())
    }

    /// Summary line per partition of the current data
    pub fn summaries(&self) -> Vec<(u32, PaginationSummary)> {
        let Some(data) = &self.data else {
            return vec![];
        };
        data.partitions
            .iter()
            .map(|p| {
                (
                    p.partition,
                    PaginationSummary::compute(p.count, self.state.page(), self.state.page_size()),
                )
            })
            .collect()
    }
}
