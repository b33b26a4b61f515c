//! Filter Values
//!
//! Current value per filter id. An absent key, an empty string, an empty list
//! and a range without bounds all mean "no filter applied", so writes
//! normalize them away and only populated values are ever stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bounds of a date range filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    /// Range with only a lower bound
    pub fn since(from: impl Into<String>) -> Self {
        Self::new(Some(from.into()), None)
    }

    /// Range with only an upper bound
    pub fn until(to: impl Into<String>) -> Self {
        Self::new(None, Some(to.into()))
    }

    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Some(from.into()), Some(to.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    fn normalized(self) -> Option<Self> {
        let keep = |bound: Option<String>| bound.filter(|b| !b.is_empty());
        let range = Self::new(keep(self.from), keep(self.to));
        (!range.is_empty()).then_some(range)
    }
}

/// Value of a single filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Text or single select value
    Text(String),
    /// Multi select values
    List(Vec<String>),
    /// Date range
    Range(DateRange),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn range(range: DateRange) -> Self {
        Self::Range(range)
    }

    /// Whether this value actually filters anything
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::List(values) => values.iter().any(|v| !v.is_empty()),
            Self::Range(range) => range.clone().normalized().is_some(),
        }
    }

    /// Drop empty parts; `None` when nothing is left
    pub fn normalized(self) -> Option<Self> {
        match self {
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(Self::Text(s)),
            Self::List(values) => {
                let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
                (!values.is_empty()).then_some(Self::List(values))
            }
            Self::Range(range) => range.normalized().map(Self::Range),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&DateRange> {
        match self {
            Self::Range(range) => Some(range),
            _ => None,
        }
    }

    /// Get as list of strings
    pub fn as_strings(&self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s.clone()],
            Self::List(values) => values.clone(),
            Self::Range(_) => vec![],
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateRange> for FilterValue {
    fn from(range: DateRange) -> Self {
        Self::Range(range)
    }
}

/// Filter values keyed by filter id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, FilterValue>",
    into = "BTreeMap<String, FilterValue>"
)]
pub struct FilterValues {
    values: BTreeMap<String, FilterValue>,
}

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value and return self (builder pattern)
    pub fn with(mut self, id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(id, Some(value.into()));
        self
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.values.get(id)
    }

    /// Store `value` for `id`, or clear it when the value is unset or empty.
    /// Returns whether anything changed.
    pub fn set(&mut self, id: impl Into<String>, value: Option<FilterValue>) -> bool {
        let id = id.into();
        match value.and_then(FilterValue::normalized) {
            Some(value) => self.values.insert(id, value.clone()) != Some(value),
            None => self.values.remove(&id).is_some(),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<FilterValue> {
        self.values.remove(id)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Copy every entry of `other` over this one; `other` wins per key
    pub fn overlay(&mut self, other: &FilterValues) {
        for (id, value) in &other.values {
            self.values.insert(id.clone(), value.clone());
        }
    }

    /// `other` merged over a copy of `self`
    pub fn overlaid_with(&self, other: &FilterValues) -> FilterValues {
        let mut merged = self.clone();
        merged.overlay(other);
        merged
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(id, value)| (id.as_str(), value))
    }
}

impl From<BTreeMap<String, FilterValue>> for FilterValues {
    fn from(map: BTreeMap<String, FilterValue>) -> Self {
        map.into_iter().collect()
    }
}

impl From<FilterValues> for BTreeMap<String, FilterValue> {
    fn from(values: FilterValues) -> Self {
        values.values
    }
}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterValues {
    fn from_iter<I: IntoIterator<Item = (K, FilterValue)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (id, value) in iter {
            values.set(id, Some(value));
        }
        values
    }
}
