//! Data fetcher contract
//!
//! A table view never talks to the engine itself. It computes a
//! [`FetchRequest`] from its state and hands it to a [`DataFetcher`].

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use oc_core::{ConsoleResult, PartitionedPage, SortDirection};
use serde::{Deserialize, Serialize};

use crate::values::FilterValues;

/// Parameters of one table fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Page number (0-indexed)
    pub page: u32,
    /// Page size
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortDirection>,
}

impl FetchRequest {
    /// Offset of the first requested item
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// Source of table rows, usually the engine REST client.
///
/// Errors are returned to the caller as-is; no layer above retries.
#[async_trait]
pub trait DataFetcher<T>: Send + Sync {
    async fn fetch_data(&self, request: FetchRequest) -> ConsoleResult<PartitionedPage<T>>;
}

/// A fetch issued by a table view; completions are matched by generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub(crate) generation: u64,
    pub request: FetchRequest,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

type RowFilter<T> = Box<dyn Fn(&T, &FilterValues) -> bool + Send + Sync>;

/// Fetcher over an in-memory list, returned as a single partition
pub struct InMemoryFetcher<T> {
    items: Vec<T>,
    row_filter: Option<RowFilter<T>>,
    calls: AtomicUsize,
}

impl<T> InMemoryFetcher<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            row_filter: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Keep only rows accepted by `filter` for the requested filter values
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T, &FilterValues) -> bool + Send + Sync + 'static,
    {
        self.row_filter = Some(Box::new(filter));
        self
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> DataFetcher<T> for InMemoryFetcher<T>
where
    T: Clone + Send + Sync,
{
    async fn fetch_data(&self, request: FetchRequest) -> ConsoleResult<PartitionedPage<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let empty = FilterValues::new();
        let filters = request.filters.as_ref().unwrap_or(&empty);
        let matching: Vec<&T> = self
            .items
            .iter()
            .filter(|item| match &self.row_filter {
                Some(filter) => filter(item, filters),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let page: Vec<T> = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(PartitionedPage::single(page, request.page, request.size, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = FetchRequest {
            page: 1,
            size: 20,
            filters: Some(FilterValues::new().with("state", "ACTIVE")),
            sort_by: Some("dueDate".into()),
            sort_order: Some(SortDirection::Desc),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "page": 1,
                "size": 20,
                "filters": {"state": "ACTIVE"},
                "sortBy": "dueDate",
                "sortOrder": "desc"
            })
        );
        assert_eq!(request.offset(), 20);

        let minimal = serde_json::to_value(FetchRequest {
            page: 0,
            size: 10,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(minimal, serde_json::json!({"page": 0, "size": 10}));
    }

    #[tokio::test]
    async fn test_in_memory_fetcher_pages_and_filters() {
        let fetcher = InMemoryFetcher::new((1..=25).collect::<Vec<u32>>()).with_filter(
            |item: &u32, filters: &FilterValues| match filters.get("parity").and_then(|v| v.as_text()) {
                Some("even") => item % 2 == 0,
                _ => true,
            },
        );

        let page = fetcher
            .fetch_data(FetchRequest {
                page: 2,
                size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items().copied().collect::<Vec<_>>(), vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_count, 25);

        let even = fetcher
            .fetch_data(FetchRequest {
                page: 0,
                size: 5,
                filters: Some(FilterValues::new().with("parity", "even")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(even.items().copied().collect::<Vec<_>>(), vec![2, 4, 6, 8, 10]);
        assert_eq!(even.total_count, 12);

        let past_end = fetcher
            .fetch_data(FetchRequest {
                page: 9,
                size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(fetcher.calls(), 3);
    }
}
