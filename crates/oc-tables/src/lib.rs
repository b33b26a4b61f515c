//! # oc-tables
//!
//! Table state layer for the Ops Console.
//!
//! Every list in the console (process instances, jobs, incidents, ...) is a
//! table view: a filter schema, the current filter values, pagination and
//! sorting, optionally mirrored into the URL query string, and a data
//! fetcher that turns all of that into a partitioned page.
//!
//! ## Structure
//!
//! - `schema` - Filter configurations, zones and groups
//! - `values` - Filter values and their normalization
//! - `columns` - Column configuration and sortability
//! - `sorts` - Sort state and the sort change handler
//! - `url_sync` - Query string encoding and the URL synchronizer
//! - `store` - Controlled and uncontrolled filter value stores
//! - `table_state` - Page, page size, sort and hideable filter panel
//! - `summary` - Per-partition pagination summary
//! - `fetch` - The data fetcher contract
//! - `view` - The table view controller
//! - `builder` - Fluent API for table views, plus presets
//!
//! ## Example
//!
//! ```
//! use oc_tables::builder::presets;
//! use oc_tables::url_sync::{Location, MemoryLocation};
//! use oc_tables::TableView;
//!
//! let location = MemoryLocation::shared("state=ACTIVE&startedAtFrom=2024-01-01");
//! let mut view: TableView<serde_json::Value> = presets::process_instances()
//!     .location(location.clone())
//!     .build()
//!     .unwrap();
//!
//! view.mount();
//! view.set_filter("businessKey", Some("order-42".into()));
//!
//! assert_eq!(
//!     location.search(),
//!     "businessKey=order-42&state=ACTIVE&startedAtFrom=2024-01-01&sortBy=startedAt&sortOrder=desc"
//! );
//! assert_eq!(view.fetch_request().page, 0);
//! ```

pub mod schema;
pub mod values;
pub mod columns;
pub mod sorts;
pub mod url_sync;
pub mod store;
pub mod table_state;
pub mod summary;
pub mod fetch;
pub mod view;
pub mod builder;

// Re-exports for convenience
pub use schema::{flatten_filters, FilterConfig, FilterOption, FilterSchema, FilterZone, SimpleFilterConfig};
pub use values::{DateRange, FilterValue, FilterValues};
pub use columns::{Column, ColumnSet};
pub use sorts::{SortChangeHandler, SortState};
pub use url_sync::{Location, MemoryLocation, QueryParams, SyncLifecycle, UrlSyncOptions};
pub use store::{FilterChangeHandler, FilterValueStore};
pub use table_state::TableState;
pub use summary::PaginationSummary;
pub use fetch::{DataFetcher, FetchRequest, FetchTicket, InMemoryFetcher};
pub use view::TableView;
pub use builder::{presets, TableViewBuilder};
