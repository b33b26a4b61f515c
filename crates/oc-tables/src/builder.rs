//! Table View Builder
//!
//! Provides a fluent API for configuring table views: filter schema,
//! columns, sorting, URL sync, and controlled or uncontrolled filter values.

use std::sync::Arc;

use oc_core::config::TableDefaults;
use oc_core::{ConsoleResult, SchemaErrors, SortDirection};
use uuid::Uuid;

use crate::columns::{Column, ColumnSet};
use crate::schema::{FilterConfig, FilterSchema};
use crate::sorts::{SortChangeHandler, SortState};
use crate::store::{FilterChangeHandler, FilterValueStore};
use crate::table_state::{TableState, DEFAULT_PAGE_SIZE};
use crate::url_sync::{
    compute_initial_filter_values, resolve_initial_sort, Location, UrlSyncOptions, UrlSynchronizer,
};
use crate::values::FilterValues;
use crate::view::TableView;

/// Builder for constructing table views fluently
pub struct TableViewBuilder {
    resource: String,
    schema: FilterSchema,
    columns: ColumnSet,
    initial_filter_values: FilterValues,
    controlled: Option<(FilterValues, Arc<dyn FilterChangeHandler>)>,
    location: Option<Arc<dyn Location>>,
    sync: UrlSyncOptions,
    default_sort: SortState,
    page_size: u32,
    on_sort_change: Option<Arc<dyn SortChangeHandler>>,
    reset_page_on_filter_change: bool,
}

impl std::fmt::Debug for TableViewBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableViewBuilder")
            .field("resource", &self.resource)
            .field("schema", &self.schema)
            .field("columns", &self.columns)
            .field("controlled", &self.controlled.is_some())
            .field("has_location", &self.location.is_some())
            .field("sync", &self.sync)
            .field("default_sort", &self.default_sort)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl TableViewBuilder {
    /// Create a builder for the table of `resource`
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            schema: FilterSchema::new(),
            columns: ColumnSet::new(),
            initial_filter_values: FilterValues::new(),
            controlled: None,
            location: None,
            sync: UrlSyncOptions::enabled(),
            default_sort: SortState::unsorted(),
            page_size: DEFAULT_PAGE_SIZE,
            on_sort_change: None,
            reset_page_on_filter_change: false,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Apply console-wide table defaults
    pub fn with_defaults(mut self, defaults: &TableDefaults) -> Self {
        self.page_size = defaults.default_page_size;
        self.sync = UrlSyncOptions {
            sync_with_url: defaults.sync_with_url,
            sync_sort_with_url: defaults.sync_sort_with_url,
        };
        self
    }

    // Filter methods

    /// Set the filter schema
    pub fn schema(mut self, schema: FilterSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Append a filter to the schema
    pub fn filter(mut self, filter: impl Into<FilterConfig>) -> Self {
        self.schema = self.schema.with(filter);
        self
    }

    /// Values the table starts with; the URL overrides them per key
    pub fn initial_filter_values(mut self, values: FilterValues) -> Self {
        self.initial_filter_values = values;
        self
    }

    /// Let a parent own the filter values
    pub fn controlled(mut self, values: FilterValues, handler: Arc<dyn FilterChangeHandler>) -> Self {
        self.controlled = Some((values, handler));
        self
    }

    /// Reset to the first page whenever the filters change
    pub fn reset_page_on_filter_change(mut self, reset: bool) -> Self {
        self.reset_page_on_filter_change = reset;
        self
    }

    // URL methods

    /// Address bar to read from and write to
    pub fn location(mut self, location: Arc<dyn Location>) -> Self {
        self.location = Some(location);
        self
    }

    /// Mirror filter values into the query string
    pub fn sync_with_url(mut self, enabled: bool) -> Self {
        self.sync.sync_with_url = enabled;
        self
    }

    /// Mirror the sort state into the query string
    pub fn sync_sort_with_url(mut self, enabled: bool) -> Self {
        self.sync.sync_sort_with_url = enabled;
        self
    }

    /// Never touch the URL
    pub fn without_url_sync(mut self) -> Self {
        self.sync = UrlSyncOptions::disabled();
        self
    }

    // Column and sort methods

    /// Set columns
    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    /// Add a column
    pub fn column(mut self, column: Column) -> Self {
        self.columns = self.columns.with(column);
        self
    }

    /// Sort used when the URL carries none
    pub fn default_sort(mut self, sort: SortState) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn sort_by_asc(self, column: impl Into<String>) -> Self {
        self.default_sort(SortState::by(column, SortDirection::Asc))
    }

    pub fn sort_by_desc(self, column: impl Into<String>) -> Self {
        self.default_sort(SortState::by(column, SortDirection::Desc))
    }

    /// Forward sort changes to `handler`
    pub fn on_sort_change(mut self, handler: Arc<dyn SortChangeHandler>) -> Self {
        self.on_sort_change = Some(handler);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn validate(&self) -> ConsoleResult<()> {
        self.schema.validate()?;

        let mut errors = SchemaErrors::new();
        for id in self.columns.duplicate_ids() {
            errors.add(id, "is used by more than one column");
        }
        if let Some(sort_by) = self.default_sort.sort_by.as_deref() {
            if !self.columns.can_sort_by(sort_by) {
                errors.add(sort_by, "is not a sortable column");
            }
        }
        if self.page_size == 0 {
            errors.add_base("page size must be positive");
        }
        errors.into_result()
    }

    /// Validate the configuration and build the view.
    ///
    /// Initial filter values and sort are resolved here from the URL, so the
    /// first fetch request is correct even before the view is mounted.
    pub fn build<T>(self) -> ConsoleResult<TableView<T>> {
        self.validate()?;

        let id = Uuid::new_v4();
        let url = UrlSynchronizer::new(id, self.location, self.sync);
        let options = url.options();
        let params = url.current_params();

        let initial = compute_initial_filter_values(
            options.sync_with_url,
            self.schema.filters(),
            &params,
            &self.initial_filter_values,
        );
        let store = match self.controlled {
            Some((values, handler)) => FilterValueStore::controlled(values, handler),
            None => FilterValueStore::uncontrolled(initial),
        };

        let sort = resolve_initial_sort(
            options.sync_sort_with_url,
            &params,
            &self.columns,
            &self.default_sort,
        );
        let mut state = TableState::new(self.page_size, sort).with_columns(self.columns);
        if let Some(handler) = self.on_sort_change {
            state = state.with_sort_handler(handler);
        }

        tracing::debug!(
            view = %id,
            resource = %self.resource,
            filters = self.schema.flatten().len(),
            sync_with_url = options.sync_with_url,
            sync_sort_with_url = options.sync_sort_with_url,
            "built table view"
        );

        Ok(TableView::from_parts(
            id,
            self.resource,
            self.schema,
            self.initial_filter_values,
            store,
            state,
            url,
            self.reset_page_on_filter_change,
        ))
    }
}

/// Filter schemas and columns for the console's resource tables
pub mod presets {
    use super::*;
    use crate::schema::{FilterOption, SimpleFilterConfig};

    /// Resources with a preset table
    pub const RESOURCES: &[&str] = &[
        "process-instances",
        "process-definitions",
        "decision-instances",
        "jobs",
        "incidents",
    ];

    /// Preset builder for `resource`, if there is one
    pub fn by_resource(resource: &str) -> Option<TableViewBuilder> {
        match resource {
            "process-instances" => Some(process_instances()),
            "process-definitions" => Some(process_definitions()),
            "decision-instances" => Some(decision_instances()),
            "jobs" => Some(jobs()),
            "incidents" => Some(incidents()),
            _ => None,
        }
    }

    /// Running and finished process instances
    pub fn process_instances() -> TableViewBuilder {
        TableViewBuilder::new("process-instances")
            .filter(
                SimpleFilterConfig::text("businessKey", "Business key")
                    .with_placeholder("Search by business key"),
            )
            .filter(SimpleFilterConfig::select(
                "state",
                "State",
                [
                    FilterOption::new("ACTIVE", "Active"),
                    FilterOption::new("SUSPENDED", "Suspended"),
                    FilterOption::new("COMPLETED", "Completed"),
                    FilterOption::new("EXTERNALLY_TERMINATED", "Terminated"),
                ],
            ))
            .filter(SimpleFilterConfig::date_range("startedAt", "Started"))
            .filter(
                FilterConfig::group(
                    "variables",
                    2,
                    [
                        SimpleFilterConfig::text("variableName", "Variable name"),
                        SimpleFilterConfig::text("variableValue", "Variable value"),
                    ],
                )
                .hideable(),
            )
            .filter(SimpleFilterConfig::date_range("endedAt", "Ended").hideable())
            .columns(
                ColumnSet::new()
                    .with(Column::new("id", "ID"))
                    .with(Column::sortable("businessKey", "Business key"))
                    .with(Column::sortable("processDefinitionKey", "Definition"))
                    .with(Column::new("state", "State"))
                    .with(Column::sortable("startedAt", "Started"))
                    .with(Column::sortable("endedAt", "Ended")),
            )
            .sort_by_desc("startedAt")
    }

    /// Deployed process definitions
    pub fn process_definitions() -> TableViewBuilder {
        TableViewBuilder::new("process-definitions")
            .filter(SimpleFilterConfig::text("key", "Key"))
            .filter(SimpleFilterConfig::text("name", "Name"))
            .filter(
                SimpleFilterConfig::select(
                    "tenantId",
                    "Tenant",
                    [FilterOption::new("default", "Default tenant")],
                )
                .searchable()
                .hideable(),
            )
            .columns(
                ColumnSet::new()
                    .with(Column::sortable("key", "Key"))
                    .with(Column::sortable("name", "Name"))
                    .with(Column::sortable("version", "Version"))
                    .with(Column::new("instances", "Running instances")),
            )
            .sort_by_asc("key")
    }

    /// Historic decision evaluations
    pub fn decision_instances() -> TableViewBuilder {
        TableViewBuilder::new("decision-instances")
            .filter(SimpleFilterConfig::text("decisionDefinitionKey", "Decision"))
            .filter(SimpleFilterConfig::date_range("evaluatedAt", "Evaluated"))
            .filter(SimpleFilterConfig::text("processInstanceId", "Process instance").hideable())
            .columns(
                ColumnSet::new()
                    .with(Column::new("id", "ID"))
                    .with(Column::sortable("decisionDefinitionKey", "Decision"))
                    .with(Column::sortable("evaluatedAt", "Evaluated"))
                    .with(Column::new("processInstanceId", "Process instance")),
            )
            .sort_by_desc("evaluatedAt")
    }

    /// Jobs waiting for execution
    pub fn jobs() -> TableViewBuilder {
        TableViewBuilder::new("jobs")
            .filter(SimpleFilterConfig::select(
                "jobType",
                "Type",
                [
                    FilterOption::new("timer", "Timer"),
                    FilterOption::new("message", "Message"),
                    FilterOption::new("async-continuation", "Async continuation"),
                ],
            ))
            .filter(SimpleFilterConfig::select(
                "state",
                "State",
                [
                    FilterOption::new("active", "Active"),
                    FilterOption::new("suspended", "Suspended"),
                    FilterOption::new("withException", "Failed"),
                ],
            ))
            .filter(SimpleFilterConfig::date_range("dueDate", "Due"))
            .filter(SimpleFilterConfig::text("processInstanceId", "Process instance").hideable())
            .columns(
                ColumnSet::new()
                    .with(Column::new("id", "ID"))
                    .with(Column::new("jobType", "Type"))
                    .with(Column::sortable("dueDate", "Due"))
                    .with(Column::sortable("retries", "Retries"))
                    .with(Column::sortable("priority", "Priority")),
            )
            .sort_by_asc("dueDate")
    }

    /// Open incidents
    pub fn incidents() -> TableViewBuilder {
        TableViewBuilder::new("incidents")
            .filter(SimpleFilterConfig::select(
                "incidentType",
                "Type",
                [
                    FilterOption::new("failedJob", "Failed job"),
                    FilterOption::new("failedExternalTask", "Failed external task"),
                ],
            ))
            .filter(SimpleFilterConfig::text("activityId", "Activity"))
            .filter(SimpleFilterConfig::date_range("createdAt", "Created"))
            .filter(SimpleFilterConfig::text("processInstanceId", "Process instance").hideable())
            .columns(
                ColumnSet::new()
                    .with(Column::sortable("incidentType", "Type"))
                    .with(Column::sortable("activityId", "Activity"))
                    .with(Column::new("message", "Message"))
                    .with(Column::sortable("createdAt", "Created")),
            )
            .sort_by_desc("createdAt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SimpleFilterConfig;
    use crate::url_sync::{MemoryLocation, SyncLifecycle};
    use oc_core::ConsoleError;
    use serde_json::Value;

    #[test]
    fn test_builder_basic() {
        let view: TableView<Value> = TableViewBuilder::new("jobs").build().unwrap();

        assert_eq!(view.resource(), "jobs");
        assert_eq!(view.state().page(), 0);
        assert_eq!(view.state().page_size(), DEFAULT_PAGE_SIZE);
        assert!(view.state().sort_by().is_none());
        assert!(!view.is_controlled());
        assert_eq!(view.lifecycle(), SyncLifecycle::Uninitialized);
    }

    #[test]
    fn test_builder_rejects_invalid_schema() {
        let err = TableViewBuilder::new("jobs")
            .filter(SimpleFilterConfig::text("state", "State"))
            .filter(SimpleFilterConfig::text("state", "State again"))
            .build::<Value>()
            .unwrap_err();

        match err {
            ConsoleError::Schema(errors) => assert!(errors.has_error("state")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builder_rejects_unsortable_default_sort() {
        let err = TableViewBuilder::new("jobs")
            .column(Column::new("id", "ID"))
            .column(Column::sortable("dueDate", "Due"))
            .sort_by_asc("id")
            .page_size(0)
            .build::<Value>()
            .unwrap_err();

        match err {
            ConsoleError::Schema(errors) => {
                assert!(errors.has_error("id"));
                assert_eq!(errors.base_errors, vec!["page size must be positive".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_url_sort_overrides_default() {
        let location = MemoryLocation::shared("sortBy=dueDate&sortOrder=desc");
        let view: TableView<Value> = presets::jobs().location(location).build().unwrap();
        assert_eq!(view.state().sort(), &SortState::desc("dueDate"));
    }

    #[test]
    fn test_disabled_sort_sync_keeps_default() {
        let location = MemoryLocation::shared("sortBy=retries&sortOrder=desc&jobType=timer");
        let mut view: TableView<Value> = presets::jobs()
            .location(location.clone())
            .sync_sort_with_url(false)
            .build()
            .unwrap();

        assert_eq!(view.state().sort(), &SortState::asc("dueDate"));
        assert!(view.filter_values().contains("jobType"));

        view.mount();
        assert_eq!(location.search(), "jobType=timer");
    }

    #[test]
    fn test_without_location_nothing_is_read() {
        let mut view: TableView<Value> = presets::incidents().build().unwrap();
        assert!(view.mount().is_empty());
        assert_eq!(view.lifecycle(), SyncLifecycle::Ready);
    }

    #[test]
    fn test_with_defaults() {
        let defaults = TableDefaults {
            default_page_size: 50,
            sync_with_url: false,
            ..TableDefaults::default()
        };
        let location = MemoryLocation::shared("key=invoice&sortBy=name");
        let view: TableView<Value> = presets::process_definitions()
            .with_defaults(&defaults)
            .location(location)
            .build()
            .unwrap();

        assert_eq!(view.state().page_size(), 50);
        assert!(view.filter_values().is_empty());
        assert_eq!(view.state().sort_by(), Some("name"));
    }

    #[test]
    fn test_presets_are_valid() {
        for resource in presets::RESOURCES {
            let builder = presets::by_resource(resource).unwrap();
            assert_eq!(builder.resource(), *resource);
            let view = builder.build::<Value>().unwrap();
            assert!(view.state().sort_by().is_some(), "{resource} has no default sort");
            assert!(!view.schema().is_empty());
        }
        assert!(presets::by_resource("tasks").is_none());
    }

    #[test]
    fn test_process_instances_preset() {
        let view: TableView<Value> = presets::process_instances().build().unwrap();
        let ids: Vec<String> = view.schema().flatten().iter().map(|f| f.id().to_string()).collect();
        assert_eq!(
            ids,
            vec!["businessKey", "state", "startedAt", "variableName", "variableValue", "endedAt"]
        );
        assert!(view.schema().has_hideable());
        assert_eq!(view.state().sort(), &SortState::desc("startedAt"));
    }
}
