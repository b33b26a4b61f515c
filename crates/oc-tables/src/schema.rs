//! Filter Schema
//!
//! Declarative description of the filters a table offers. A schema is a list
//! of filter configs; `group` entries only lay out their children and never
//! carry a value themselves.

use std::collections::HashSet;

use oc_core::{ConsoleResult, SchemaErrors};
use serde::{Deserialize, Serialize};

use crate::url_sync::{SORT_BY_PARAM, SORT_ORDER_PARAM};

/// Where a filter control is placed by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterZone {
    /// Always visible in the first filter line
    #[default]
    ExposedFirstLine,
    /// Only visible once the extra filter panel is opened
    Hideable,
}

/// Kind of a value-bearing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Text,
    Select,
    DateRange,
}

/// One choice of a select filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFilter {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub zone: FilterZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFilter {
    pub id: String,
    pub label: String,
    pub options: Vec<FilterOption>,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub hide_all_option: bool,
    #[serde(default)]
    pub zone: FilterZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeFilter {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(default)]
    pub zone: FilterZone,
}

/// Layout container for several leaf filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFilter {
    pub id: String,
    pub columns: u32,
    pub items: Vec<SimpleFilterConfig>,
    #[serde(default)]
    pub zone: FilterZone,
}

/// A value-bearing filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimpleFilterConfig {
    Text(TextFilter),
    Select(SelectFilter),
    DateRange(DateRangeFilter),
}

/// Any entry of a filter schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterConfig {
    Text(TextFilter),
    Select(SelectFilter),
    DateRange(DateRangeFilter),
    Group(GroupFilter),
}

impl SimpleFilterConfig {
    /// Create a free-text filter
    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Text(TextFilter {
            id: id.into(),
            label: label.into(),
            placeholder: None,
            width: None,
            zone: FilterZone::default(),
        })
    }

    /// Create a select filter
    pub fn select(
        id: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FilterOption>,
    ) -> Self {
        Self::Select(SelectFilter {
            id: id.into(),
            label: label.into(),
            options: options.into_iter().collect(),
            searchable: false,
            hide_all_option: false,
            zone: FilterZone::default(),
        })
    }

    /// Create a date range filter
    pub fn date_range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::DateRange(DateRangeFilter {
            id: id.into(),
            label: label.into(),
            col_span: None,
            zone: FilterZone::default(),
        })
    }

    /// Move the filter into the hideable panel
    pub fn hideable(self) -> Self {
        self.with_zone(FilterZone::Hideable)
    }

    pub fn with_zone(mut self, zone: FilterZone) -> Self {
        match &mut self {
            Self::Text(f) => f.zone = zone,
            Self::Select(f) => f.zone = zone,
            Self::DateRange(f) => f.zone = zone,
        }
        self
    }

    /// Set the placeholder of a text filter; ignored for other kinds
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        if let Self::Text(f) = &mut self {
            f.placeholder = Some(placeholder.into());
        }
        self
    }

    /// Make a select filter searchable; ignored for other kinds
    pub fn searchable(mut self) -> Self {
        if let Self::Select(f) = &mut self {
            f.searchable = true;
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Text(f) => &f.id,
            Self::Select(f) => &f.id,
            Self::DateRange(f) => &f.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Text(f) => &f.label,
            Self::Select(f) => &f.label,
            Self::DateRange(f) => &f.label,
        }
    }

    pub fn zone(&self) -> FilterZone {
        match self {
            Self::Text(f) => f.zone,
            Self::Select(f) => f.zone,
            Self::DateRange(f) => f.zone,
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Text(_) => FilterKind::Text,
            Self::Select(_) => FilterKind::Select,
            Self::DateRange(_) => FilterKind::DateRange,
        }
    }

    pub fn is_date_range(&self) -> bool {
        self.kind() == FilterKind::DateRange
    }
}

impl FilterConfig {
    /// Create a group laying out `items` in `columns` columns
    pub fn group(
        id: impl Into<String>,
        columns: u32,
        items: impl IntoIterator<Item = SimpleFilterConfig>,
    ) -> Self {
        Self::Group(GroupFilter {
            id: id.into(),
            columns,
            items: items.into_iter().collect(),
            zone: FilterZone::default(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Text(f) => &f.id,
            Self::Select(f) => &f.id,
            Self::DateRange(f) => &f.id,
            Self::Group(g) => &g.id,
        }
    }

    pub fn zone(&self) -> FilterZone {
        match self {
            Self::Text(f) => f.zone,
            Self::Select(f) => f.zone,
            Self::DateRange(f) => f.zone,
            Self::Group(g) => g.zone,
        }
    }

    pub fn hideable(mut self) -> Self {
        match &mut self {
            Self::Text(f) => f.zone = FilterZone::Hideable,
            Self::Select(f) => f.zone = FilterZone::Hideable,
            Self::DateRange(f) => f.zone = FilterZone::Hideable,
            Self::Group(g) => g.zone = FilterZone::Hideable,
        }
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// The leaf config, or `None` for groups
    pub fn as_simple(&self) -> Option<SimpleFilterConfig> {
        match self {
            Self::Text(f) => Some(SimpleFilterConfig::Text(f.clone())),
            Self::Select(f) => Some(SimpleFilterConfig::Select(f.clone())),
            Self::DateRange(f) => Some(SimpleFilterConfig::DateRange(f.clone())),
            Self::Group(_) => None,
        }
    }
}

impl From<SimpleFilterConfig> for FilterConfig {
    fn from(config: SimpleFilterConfig) -> Self {
        match config {
            SimpleFilterConfig::Text(f) => Self::Text(f),
            SimpleFilterConfig::Select(f) => Self::Select(f),
            SimpleFilterConfig::DateRange(f) => Self::DateRange(f),
        }
    }
}

/// Expand groups into their leaf filters, preserving order
pub fn flatten_filters(filters: &[FilterConfig]) -> Vec<SimpleFilterConfig> {
    let mut leaves = Vec::with_capacity(filters.len());
    for filter in filters {
        match filter {
            FilterConfig::Group(group) => leaves.extend(group.items.iter().cloned()),
            other => leaves.extend(other.as_simple()),
        }
    }
    leaves
}

/// Check ids for emptiness, uniqueness, and query parameter collisions
pub fn validate_schema(filters: &[FilterConfig]) -> ConsoleResult<()> {
    let mut errors = SchemaErrors::new();
    let leaves = flatten_filters(filters);

    let mut seen = HashSet::new();
    for leaf in &leaves {
        let id = leaf.id();
        if id.is_empty() {
            errors.add_base(format!("filter '{}' has an empty id", leaf.label()));
            continue;
        }
        if !seen.insert(id) {
            errors.add(id, "is defined more than once");
        }
        if id == SORT_BY_PARAM || id == SORT_ORDER_PARAM {
            errors.add(id, "collides with a reserved sort parameter");
        }
    }

    // `${id}From` / `${id}To` must not shadow another filter's parameter
    for leaf in leaves.iter().filter(|l| l.is_date_range()) {
        for suffix in ["From", "To"] {
            let param = format!("{}{}", leaf.id(), suffix);
            if seen.contains(param.as_str()) {
                errors.add(param, format!("collides with the date range '{}'", leaf.id()));
            }
        }
    }

    for filter in filters {
        if let FilterConfig::Group(g) = filter {
            if g.columns == 0 {
                errors.add(g.id.as_str(), "must lay out at least one column");
            }
        }
    }

    errors.into_result()
}

/// An ordered filter schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSchema {
    filters: Vec<FilterConfig>,
}

impl FilterSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a filter and return self (builder pattern)
    pub fn with(mut self, filter: impl Into<FilterConfig>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Parse a schema from its JSON form and validate it
    pub fn from_json(json: &str) -> ConsoleResult<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn filters(&self) -> &[FilterConfig] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn flatten(&self) -> Vec<SimpleFilterConfig> {
        flatten_filters(&self.filters)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        validate_schema(&self.filters)
    }

    /// Find a leaf filter by id
    pub fn leaf(&self, id: &str) -> Option<SimpleFilterConfig> {
        self.flatten().into_iter().find(|f| f.id() == id)
    }

    /// Top-level entries placed in the given zone
    pub fn in_zone(&self, zone: FilterZone) -> Vec<&FilterConfig> {
        self.filters.iter().filter(|f| f.zone() == zone).collect()
    }

    /// Whether the schema has anything for the hideable panel
    pub fn has_hideable(&self) -> bool {
        self.filters.iter().any(|f| f.zone() == FilterZone::Hideable)
    }
}

impl From<Vec<FilterConfig>> for FilterSchema {
    fn from(filters: Vec<FilterConfig>) -> Self {
        Self { filters }
    }
}
