//! URL Synchronizer
//!
//! Mirrors filter values and sort state into the query string and reads them
//! back on mount. The query string is always rebuilt from scratch and applied
//! with history replace, so filter edits never add back-button stops.
//!
//! Query string layout:
//! - one parameter per populated text/select filter, named after the filter
//! - `{id}From` / `{id}To` for date range filters
//! - `sortBy` / `sortOrder` for the sort state
//!
//! Anything malformed or unknown is treated as absent.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use oc_core::SortDirection;
use parking_lot::Mutex;
use url::form_urlencoded;
use uuid::Uuid;

use crate::columns::ColumnSet;
use crate::schema::{flatten_filters, FilterConfig, SimpleFilterConfig};
use crate::sorts::SortState;
use crate::values::{DateRange, FilterValue, FilterValues};

pub const SORT_BY_PARAM: &str = "sortBy";
pub const SORT_ORDER_PARAM: &str = "sortOrder";
pub const RANGE_FROM_SUFFIX: &str = "From";
pub const RANGE_TO_SUFFIX: &str = "To";

/// Separator for multi-valued filters in a single parameter
const LIST_SEPARATOR: &str = ",";

/// Decoded query string parameters, in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(key, _)| key.as_str())
    }

    /// Encode back into a query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Whether `value` looks like a date or datetime bound.
/// Checked on both read and write, so a bound either round trips or is
/// never written.
fn is_date_bound(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

/// A bound worth writing: populated and a date or datetime
fn writable_bound<'a>(id: &str, bound: Option<&'a str>) -> Option<&'a str> {
    let bound = bound.filter(|s| !s.is_empty())?;
    if !is_date_bound(bound) {
        tracing::debug!(filter = id, bound, "not writing malformed date bound");
        return None;
    }
    Some(bound)
}

fn range_bound(params: &QueryParams, id: &str, suffix: &str) -> Option<String> {
    let name = format!("{}{}", id, suffix);
    let value = params.get(&name)?;
    if value.is_empty() {
        return None;
    }
    if !is_date_bound(value) {
        tracing::debug!(param = %name, value, "ignoring malformed date bound");
        return None;
    }
    Some(value.to_string())
}

/// A select parameter holding several comma-joined options reads back as a
/// list, anything else as a single value
fn select_value(raw: &str) -> FilterValue {
    if raw.contains(LIST_SEPARATOR) {
        FilterValue::list(raw.split(LIST_SEPARATOR).filter(|s| !s.is_empty()))
    } else {
        FilterValue::text(raw)
    }
}

/// Read the filter values encoded in `params` for every leaf of `filters`
pub fn get_filters_from_url_params(filters: &[FilterConfig], params: &QueryParams) -> FilterValues {
    let mut values = FilterValues::new();

    for leaf in flatten_filters(filters) {
        let id = leaf.id();
        match &leaf {
            SimpleFilterConfig::DateRange(_) => {
                let from = range_bound(params, id, RANGE_FROM_SUFFIX);
                let to = range_bound(params, id, RANGE_TO_SUFFIX);
                if from.is_some() || to.is_some() {
                    values.set(id, Some(FilterValue::Range(DateRange::new(from, to))));
                }
            }
            SimpleFilterConfig::Select(_) => {
                if let Some(value) = params.get(id) {
                    values.set(id, Some(select_value(value)));
                }
            }
            SimpleFilterConfig::Text(_) => {
                if let Some(value) = params.get(id) {
                    values.set(id, Some(FilterValue::text(value)));
                }
            }
        }
    }

    values
}

/// Read the sort state from `params`.
///
/// `sortBy` must name a sortable column; a missing or unknown `sortOrder`
/// falls back to ascending.
pub fn get_sort_from_url_params(params: &QueryParams, columns: &ColumnSet) -> Option<SortState> {
    let sort_by = params.get(SORT_BY_PARAM).filter(|s| !s.is_empty())?;
    if !columns.can_sort_by(sort_by) {
        tracing::debug!(sort_by, "ignoring sortBy for a column that is not sortable");
        return None;
    }

    let sort_order = match params.get(SORT_ORDER_PARAM) {
        Some(order) => SortDirection::parse(order).unwrap_or_else(|| {
            tracing::debug!(order, "ignoring unknown sortOrder");
            SortDirection::Asc
        }),
        None => SortDirection::Asc,
    };

    Some(SortState::by(sort_by, sort_order))
}

/// Encode filter values (and optionally the sort state) as query parameters.
///
/// Parameters follow schema order, then `sortBy`/`sortOrder`. Values whose
/// shape does not fit their filter, and values for ids outside the schema,
/// are not written.
pub fn build_query_params(
    filters: &[FilterConfig],
    values: &FilterValues,
    sort: Option<&SortState>,
) -> QueryParams {
    let mut params = QueryParams::default();

    for leaf in flatten_filters(filters) {
        let id = leaf.id();
        let Some(value) = values.get(id) else {
            continue;
        };

        match (&leaf, value) {
            (SimpleFilterConfig::DateRange(_), FilterValue::Range(range)) => {
                if let Some(from) = writable_bound(id, range.from.as_deref()) {
                    params.append(format!("{}{}", id, RANGE_FROM_SUFFIX), from);
                }
                if let Some(to) = writable_bound(id, range.to.as_deref()) {
                    params.append(format!("{}{}", id, RANGE_TO_SUFFIX), to);
                }
            }
            (SimpleFilterConfig::DateRange(_), _) | (_, FilterValue::Range(_)) => {
                tracing::debug!(filter = id, "skipping value with a mismatched shape");
            }
            (_, FilterValue::Text(text)) => {
                if !text.is_empty() {
                    params.append(id, text.as_str());
                }
            }
            (_, FilterValue::List(list)) => {
                let joined = list
                    .iter()
                    .filter(|v| !v.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR);
                if !joined.is_empty() {
                    params.append(id, joined);
                }
            }
        }
    }

    if let Some(SortState {
        sort_by: Some(sort_by),
        sort_order,
    }) = sort
    {
        params.append(SORT_BY_PARAM, sort_by.as_str());
        params.append(SORT_ORDER_PARAM, sort_order.as_str());
    }

    params
}

/// [`build_query_params`] encoded as a query string
pub fn build_query_string(
    filters: &[FilterConfig],
    values: &FilterValues,
    sort: Option<&SortState>,
) -> String {
    build_query_params(filters, values, sort).to_query_string()
}

/// Merge URL filters over caller-supplied initial values; URL wins per key
pub fn compute_initial_filter_values(
    sync_with_url: bool,
    filters: &[FilterConfig],
    url_params: &QueryParams,
    initial_filter_values: &FilterValues,
) -> FilterValues {
    if !sync_with_url {
        return initial_filter_values.clone();
    }
    let from_url = get_filters_from_url_params(filters, url_params);
    initial_filter_values.overlaid_with(&from_url)
}

/// Resolve the initial sort: URL (when sort sync is on) over the default
pub fn resolve_initial_sort(
    sync_sort_with_url: bool,
    url_params: &QueryParams,
    columns: &ColumnSet,
    default_sort: &SortState,
) -> SortState {
    if sync_sort_with_url {
        if let Some(sort) = get_sort_from_url_params(url_params, columns) {
            return sort;
        }
    }
    default_sort.clone()
}

/// Address bar access, provided by the routing layer
pub trait Location: Send + Sync {
    /// Current query string
    fn search(&self) -> String;

    /// Replace the query string without adding a history entry
    fn replace(&self, query: &str);

    /// Claim authoritative URL sync for `owner`. Returns false when another
    /// owner already holds it.
    fn claim(&self, owner: Uuid) -> bool;

    /// Give up a claim taken with [`Location::claim`]
    fn release(&self, owner: Uuid);
}

#[derive(Debug, Default)]
struct LocationState {
    search: String,
    history: Vec<String>,
    replacements: usize,
    owner: Option<Uuid>,
}

/// In-memory [`Location`] for tests and the CLI
#[derive(Debug)]
pub struct MemoryLocation {
    state: Mutex<LocationState>,
}

impl MemoryLocation {
    pub fn new(search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.strip_prefix('?').unwrap_or(&search).to_string();
        Self {
            state: Mutex::new(LocationState {
                history: vec![search.clone()],
                search,
                replacements: 0,
                owner: None,
            }),
        }
    }

    pub fn shared(search: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(search))
    }

    /// Navigate to a new query string, adding a history entry
    pub fn push(&self, search: impl Into<String>) {
        let mut state = self.state.lock();
        state.search = search.into();
        let entry = state.search.clone();
        state.history.push(entry);
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Number of replace operations applied so far
    pub fn replacements(&self) -> usize {
        self.state.lock().replacements
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.state.lock().owner
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        self.state.lock().search.clone()
    }

    fn replace(&self, query: &str) {
        let mut state = self.state.lock();
        state.search = query.to_string();
        if let Some(current) = state.history.last_mut() {
            *current = query.to_string();
        }
        state.replacements += 1;
    }

    fn claim(&self, owner: Uuid) -> bool {
        let mut state = self.state.lock();
        match state.owner {
            Some(current) if current != owner => false,
            _ => {
                state.owner = Some(owner);
                true
            }
        }
    }

    fn release(&self, owner: Uuid) {
        let mut state = self.state.lock();
        if state.owner == Some(owner) {
            state.owner = None;
        }
    }
}

/// Which parts of the table state are mirrored into the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlSyncOptions {
    pub sync_with_url: bool,
    pub sync_sort_with_url: bool,
}

impl UrlSyncOptions {
    pub fn enabled() -> Self {
        Self {
            sync_with_url: true,
            sync_sort_with_url: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.sync_with_url || self.sync_sort_with_url
    }
}

/// Synchronizer lifecycle; hydration only happens from `Uninitialized`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncLifecycle {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Unmounted,
}

/// What the URL contributed on mount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hydration {
    /// URL filters merged over the initial values, when the URL had any
    pub filters: Option<FilterValues>,
    /// Sort adopted from the URL
    pub sort: Option<SortState>,
}

impl Hydration {
    pub fn is_empty(&self) -> bool {
        self.filters.is_none() && self.sort.is_none()
    }
}

/// Keeps one table view and its [`Location`] consistent
pub struct UrlSynchronizer {
    owner: Uuid,
    location: Option<Arc<dyn Location>>,
    options: UrlSyncOptions,
    lifecycle: SyncLifecycle,
    claimed: bool,
    last_written: Option<String>,
}

impl std::fmt::Debug for UrlSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSynchronizer")
            .field("owner", &self.owner)
            .field("has_location", &self.location.is_some())
            .field("options", &self.options)
            .field("lifecycle", &self.lifecycle)
            .field("claimed", &self.claimed)
            .field("last_written", &self.last_written)
            .finish()
    }
}

impl UrlSynchronizer {
    pub fn new(owner: Uuid, location: Option<Arc<dyn Location>>, options: UrlSyncOptions) -> Self {
        let options = if location.is_some() {
            options
        } else {
            UrlSyncOptions::disabled()
        };
        Self {
            owner,
            location,
            options,
            lifecycle: SyncLifecycle::Uninitialized,
            claimed: false,
            last_written: None,
        }
    }

    /// Synchronizer that never touches a URL
    pub fn detached(owner: Uuid) -> Self {
        Self::new(owner, None, UrlSyncOptions::disabled())
    }

    pub fn options(&self) -> UrlSyncOptions {
        self.options
    }

    pub fn lifecycle(&self) -> SyncLifecycle {
        self.lifecycle
    }

    /// Current URL parameters, or nothing when sync is off
    pub fn current_params(&self) -> QueryParams {
        match &self.location {
            Some(location) if self.options.any() => QueryParams::parse(&location.search()),
            _ => QueryParams::default(),
        }
    }

    /// Read filters and sort from the URL. Runs once per mount; later calls
    /// return an empty hydration. Call [`UrlSynchronizer::finish`] once the
    /// hydrated state has been applied.
    pub fn hydrate(
        &mut self,
        filters: &[FilterConfig],
        initial_values: &FilterValues,
        columns: &ColumnSet,
    ) -> Hydration {
        if self.lifecycle != SyncLifecycle::Uninitialized {
            tracing::debug!(owner = %self.owner, lifecycle = ?self.lifecycle, "hydration already ran");
            return Hydration::default();
        }
        self.lifecycle = SyncLifecycle::Initializing;

        if self.options.any() && !self.claim() {
            return Hydration::default();
        }

        let params = self.current_params();
        let mut hydration = Hydration::default();

        if self.options.sync_with_url {
            let from_url = get_filters_from_url_params(filters, &params);
            if !from_url.is_empty() {
                hydration.filters = Some(initial_values.overlaid_with(&from_url));
            }
        }
        if self.options.sync_sort_with_url {
            hydration.sort = get_sort_from_url_params(&params, columns);
        }

        tracing::debug!(
            owner = %self.owner,
            filters = hydration.filters.as_ref().map(|f| f.len()).unwrap_or(0),
            sort = ?hydration.sort.as_ref().and_then(|s| s.sort_by.as_deref()),
            "hydrated table state from URL"
        );
        hydration
    }

    /// Mark hydration as applied; from now on [`UrlSynchronizer::sync`] writes
    pub fn finish(&mut self) {
        if self.lifecycle == SyncLifecycle::Initializing {
            self.lifecycle = SyncLifecycle::Ready;
        }
    }

    fn claim(&mut self) -> bool {
        let Some(location) = &self.location else {
            return false;
        };
        if location.claim(self.owner) {
            self.claimed = true;
            true
        } else {
            tracing::warn!(
                owner = %self.owner,
                "another table view owns URL sync on this location, running without it"
            );
            self.options = UrlSyncOptions::disabled();
            false
        }
    }

    /// Rebuild the query string and replace the URL with it.
    ///
    /// Returns the written query string, or `None` when nothing was written
    /// (not ready, sync off, or the string is unchanged).
    pub fn sync(
        &mut self,
        filters: &[FilterConfig],
        values: &FilterValues,
        sort: &SortState,
    ) -> Option<String> {
        if self.lifecycle != SyncLifecycle::Ready || !self.options.any() {
            return None;
        }
        let location = self.location.as_ref()?;

        let empty = FilterValues::new();
        let values = if self.options.sync_with_url { values } else { &empty };
        let sort = self.options.sync_sort_with_url.then_some(sort);
        let query = build_query_string(filters, values, sort);

        if self.last_written.as_deref() == Some(query.as_str()) {
            return None;
        }

        location.replace(&query);
        tracing::debug!(owner = %self.owner, query = %query, "replaced URL query");
        self.last_written = Some(query.clone());
        Some(query)
    }

    /// Stop writing and release the URL claim
    pub fn unmount(&mut self) {
        if self.lifecycle == SyncLifecycle::Unmounted {
            return;
        }
        self.lifecycle = SyncLifecycle::Unmounted;
        if self.claimed {
            if let Some(location) = &self.location {
                location.release(self.owner);
            }
            self.claimed = false;
        }
    }
}

impl Drop for UrlSynchronizer {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Column;
    use crate::schema::FilterSchema;

    fn schema() -> FilterSchema {
        FilterSchema::new()
            .with(SimpleFilterConfig::text("businessKey", "Business key"))
            .with(SimpleFilterConfig::select(
                "state",
                "State",
                [crate::schema::FilterOption::new("ACTIVE", "Active")],
            ))
            .with(FilterConfig::group(
                "dates",
                2,
                [SimpleFilterConfig::date_range("startedAt", "Started")],
            ))
    }

    fn columns() -> ColumnSet {
        ColumnSet::new()
            .with(Column::sortable("createdAt", "Created"))
            .with(Column::new("id", "ID"))
    }

    #[test]
    fn test_parse_query_params() {
        let params = QueryParams::parse("?businessKey=order%201&state=ACTIVE&state=DONE");
        assert_eq!(params.get("businessKey"), Some("order 1"));
        assert_eq!(params.get("state"), Some("ACTIVE"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_get_filters_from_url_params() {
        let params = QueryParams::parse(
            "businessKey=order-1&startedAtTo=2024-02-01&unrelated=x&startedAt=ignored",
        );
        let values = get_filters_from_url_params(schema().filters(), &params);

        assert_eq!(values.len(), 2);
        assert_eq!(values.get("businessKey").and_then(|v| v.as_text()), Some("order-1"));
        assert_eq!(
            values.get("startedAt").and_then(|v| v.as_range()),
            Some(&DateRange::until("2024-02-01"))
        );
        assert!(!values.contains("unrelated"));
    }

    #[test]
    fn test_range_without_bounds_yields_nothing() {
        let params = QueryParams::parse("startedAtFrom=&startedAtTo=");
        assert!(get_filters_from_url_params(schema().filters(), &params).is_empty());
    }

    #[test]
    fn test_malformed_date_bounds_are_ignored() {
        let params = QueryParams::parse("startedAtFrom=yesterday&startedAtTo=2024-02-01T10:30");
        let values = get_filters_from_url_params(schema().filters(), &params);
        assert_eq!(
            values.get("startedAt").and_then(|v| v.as_range()),
            Some(&DateRange::until("2024-02-01T10:30"))
        );
    }

    #[test]
    fn test_round_trip() {
        let values = FilterValues::new()
            .with("businessKey", "order 1&2")
            .with("state", "ACTIVE")
            .with("startedAt", DateRange::between("2024-01-01", "2024-01-31"));

        let query = build_query_string(schema().filters(), &values, None);
        let parsed = get_filters_from_url_params(schema().filters(), &QueryParams::parse(&query));
        assert_eq!(parsed, values);
    }

    #[test]
    fn test_round_trip_drops_unset_keys() {
        let mut values = FilterValues::new().with("businessKey", "order-1");
        values.set("state", Some(FilterValue::text("")));

        let query = build_query_string(schema().filters(), &values, None);
        assert_eq!(query, "businessKey=order-1");
        let parsed = get_filters_from_url_params(schema().filters(), &QueryParams::parse(&query));
        assert_eq!(parsed, values);
    }

    #[test]
    fn test_date_range_with_only_from() {
        let values = FilterValues::new().with("startedAt", DateRange::since("2024-01-01"));
        let params = build_query_params(schema().filters(), &values, None);

        assert_eq!(params.names().collect::<Vec<_>>(), vec!["startedAtFrom"]);
        assert_eq!(params.get("startedAtFrom"), Some("2024-01-01"));
        assert!(!params.contains("startedAtTo"));

        let parsed = get_filters_from_url_params(schema().filters(), &params);
        assert_eq!(
            parsed.get("startedAt").and_then(|v| v.as_range()),
            Some(&DateRange::new(Some("2024-01-01".into()), None))
        );
    }

    #[test]
    fn test_build_is_idempotent_and_ordered() {
        let values = FilterValues::new()
            .with("startedAt", DateRange::since("2024-01-01"))
            .with("businessKey", "order-1");
        let sort = SortState::desc("createdAt");

        let first = build_query_string(schema().filters(), &values, Some(&sort));
        let second = build_query_string(schema().filters(), &values, Some(&sort));
        assert_eq!(first, second);
        assert_eq!(
            first,
            "businessKey=order-1&startedAtFrom=2024-01-01&sortBy=createdAt&sortOrder=desc"
        );
    }

    #[test]
    fn test_build_skips_unknown_and_mismatched_values() {
        let values = FilterValues::new()
            .with("unknown", "x")
            .with("businessKey", DateRange::since("2024-01-01"))
            .with("state", FilterValue::list(["ACTIVE", "SUSPENDED"]));

        let query = build_query_string(schema().filters(), &values, None);
        assert_eq!(query, "state=ACTIVE%2CSUSPENDED");
    }

    #[test]
    fn test_date_bound_formats_round_trip() {
        let bounds = [
            "2024-01-01",
            "2024-01-01T10:30",
            "2024-01-01T10:30:00",
            "2024-01-01T10:30:00.000",
            "2024-01-01T10:30:00Z",
            "2024-01-01T10:30:00.250+02:00",
        ];

        for bound in bounds {
            let values = FilterValues::new().with("startedAt", DateRange::between(bound, bound));
            let query = build_query_string(schema().filters(), &values, None);
            let parsed = get_filters_from_url_params(schema().filters(), &QueryParams::parse(&query));
            assert_eq!(parsed, values, "bound {bound} did not round trip via {query}");
        }
    }

    #[test]
    fn test_malformed_date_bounds_are_not_written() {
        let values = FilterValues::new().with(
            "startedAt",
            DateRange::between("2024-01-01 10:30", "2024-02-01"),
        );
        let query = build_query_string(schema().filters(), &values, None);
        assert_eq!(query, "startedAtTo=2024-02-01");

        let never = FilterValues::new().with("startedAt", DateRange::since("last week"));
        assert_eq!(build_query_string(schema().filters(), &never, None), "");
    }

    #[test]
    fn test_select_list_round_trip() {
        let values = FilterValues::new()
            .with("businessKey", "a,b")
            .with("state", FilterValue::list(["ACTIVE", "SUSPENDED"]));

        let query = build_query_string(schema().filters(), &values, None);
        let parsed = get_filters_from_url_params(schema().filters(), &QueryParams::parse(&query));
        assert_eq!(parsed, values);

        // Text filters keep commas as part of the value
        assert_eq!(parsed.get("businessKey").and_then(|v| v.as_text()), Some("a,b"));
    }

    #[test]
    fn test_sort_from_url_params() {
        let params = QueryParams::parse("sortBy=createdAt");
        assert_eq!(
            get_sort_from_url_params(&params, &columns()),
            Some(SortState::asc("createdAt"))
        );

        let params = QueryParams::parse("sortBy=createdAt&sortOrder=sideways");
        assert_eq!(
            get_sort_from_url_params(&params, &columns()),
            Some(SortState::asc("createdAt"))
        );

        let params = QueryParams::parse("sortBy=id&sortOrder=desc");
        assert_eq!(get_sort_from_url_params(&params, &columns()), None);
    }

    #[test]
    fn test_initial_values_prefer_url() {
        let initial = FilterValues::new()
            .with("businessKey", "from-caller")
            .with("state", "ACTIVE");
        let params = QueryParams::parse("businessKey=from-url");

        let resolved = compute_initial_filter_values(true, schema().filters(), &params, &initial);
        assert_eq!(resolved.get("businessKey").and_then(|v| v.as_text()), Some("from-url"));
        assert_eq!(resolved.get("state").and_then(|v| v.as_text()), Some("ACTIVE"));

        let unsynced = compute_initial_filter_values(false, schema().filters(), &params, &initial);
        assert_eq!(unsynced, initial);
    }

    #[test]
    fn test_resolve_initial_sort() {
        let params = QueryParams::parse("sortBy=createdAt&sortOrder=desc");
        let default = SortState::asc("id");

        assert_eq!(
            resolve_initial_sort(true, &params, &columns(), &default),
            SortState::desc("createdAt")
        );
        assert_eq!(resolve_initial_sort(false, &params, &columns(), &default), default);
    }

    #[test]
    fn test_synchronizer_hydrates_once_and_replaces() {
        let location = MemoryLocation::shared("businessKey=order-1&utm=newsletter");
        let mut sync = UrlSynchronizer::new(
            Uuid::new_v4(),
            Some(location.clone()),
            UrlSyncOptions::enabled(),
        );

        let hydration = sync.hydrate(schema().filters(), &FilterValues::new(), &columns());
        let hydrated = hydration.filters.unwrap();
        assert_eq!(hydrated.get("businessKey").and_then(|v| v.as_text()), Some("order-1"));
        assert!(sync.hydrate(schema().filters(), &FilterValues::new(), &columns()).is_empty());

        // Nothing is written until hydration is applied
        assert_eq!(sync.sync(schema().filters(), &hydrated, &SortState::unsorted()), None);
        sync.finish();
        assert_eq!(sync.lifecycle(), SyncLifecycle::Ready);

        let written = sync.sync(schema().filters(), &hydrated, &SortState::unsorted());
        assert_eq!(written.as_deref(), Some("businessKey=order-1"));
        assert_eq!(location.search(), "businessKey=order-1");
        assert_eq!(location.history_len(), 1);

        // Unchanged state does not touch the URL again
        assert_eq!(sync.sync(schema().filters(), &hydrated, &SortState::unsorted()), None);
        assert_eq!(location.replacements(), 1);
    }

    #[test]
    fn test_sort_only_sync() {
        let location = MemoryLocation::shared("businessKey=order-1");
        let mut sync = UrlSynchronizer::new(
            Uuid::new_v4(),
            Some(location.clone()),
            UrlSyncOptions {
                sync_with_url: false,
                sync_sort_with_url: true,
            },
        );

        let hydration = sync.hydrate(schema().filters(), &FilterValues::new(), &columns());
        assert!(hydration.filters.is_none());
        sync.finish();

        let values = FilterValues::new().with("businessKey", "order-2");
        let written = sync.sync(schema().filters(), &values, &SortState::desc("createdAt"));
        assert_eq!(written.as_deref(), Some("sortBy=createdAt&sortOrder=desc"));
    }

    #[test]
    fn test_second_claimant_runs_without_sync() {
        let location = MemoryLocation::shared("businessKey=order-1");
        let mut first = UrlSynchronizer::new(
            Uuid::new_v4(),
            Some(location.clone()),
            UrlSyncOptions::enabled(),
        );
        let mut second = UrlSynchronizer::new(
            Uuid::new_v4(),
            Some(location.clone()),
            UrlSyncOptions::enabled(),
        );

        assert!(first
            .hydrate(schema().filters(), &FilterValues::new(), &columns())
            .filters
            .is_some());
        assert!(second
            .hydrate(schema().filters(), &FilterValues::new(), &columns())
            .is_empty());
        assert!(!second.options().any());

        first.unmount();
        assert_eq!(location.owner(), None);
    }

    #[test]
    fn test_unmounted_synchronizer_never_writes() {
        let location = MemoryLocation::shared("");
        let mut sync = UrlSynchronizer::new(
            Uuid::new_v4(),
            Some(location.clone()),
            UrlSyncOptions::enabled(),
        );
        sync.hydrate(schema().filters(), &FilterValues::new(), &columns());
        sync.finish();
        sync.unmount();

        let values = FilterValues::new().with("businessKey", "late");
        assert_eq!(sync.sync(schema().filters(), &values, &SortState::unsorted()), None);
        assert_eq!(location.replacements(), 0);
    }
}
