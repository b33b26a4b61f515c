//! Page source backed by a JSON file
//!
//! The file holds either a stored partitioned page, served as is, or a plain
//! list of rows that is filtered, sorted and paged per request.

use std::cmp::Ordering;
use std::path::PathBuf;

use async_trait::async_trait;
use oc_core::{ConsoleError, ConsoleResult, PartitionedPage, SortDirection};
use oc_tables::{DataFetcher, FetchRequest, FilterValue, FilterValues};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageDocument {
    Rows(Vec<Value>),
    Page(PartitionedPage<Value>),
}

pub struct JsonFileFetcher {
    resource: String,
    path: PathBuf,
}

impl JsonFileFetcher {
    pub fn new(resource: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            resource: resource.into(),
            path: path.into(),
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> ConsoleError {
        ConsoleError::fetch(self.resource.as_str(), format!("{}: {}", self.path.display(), message))
    }
}

#[async_trait]
impl DataFetcher<Value> for JsonFileFetcher {
    async fn fetch_data(&self, request: FetchRequest) -> ConsoleResult<PartitionedPage<Value>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.error(e))?;
        let document: PageDocument = serde_json::from_str(&raw).map_err(|e| self.error(e))?;

        match document {
            PageDocument::Page(page) => {
                tracing::debug!(path = %self.path.display(), "serving stored page");
                Ok(page)
            }
            PageDocument::Rows(rows) => Ok(page_rows(rows, &request)),
        }
    }
}

fn page_rows(rows: Vec<Value>, request: &FetchRequest) -> PartitionedPage<Value> {
    let mut matching: Vec<Value> = match &request.filters {
        Some(filters) => rows.into_iter().filter(|row| row_matches(row, filters)).collect(),
        None => rows,
    };

    if let Some(sort_by) = request.sort_by.as_deref() {
        matching.sort_by(|a, b| compare_fields(a.get(sort_by), b.get(sort_by)));
        if request.sort_order == Some(SortDirection::Desc) {
            matching.reverse();
        }
    }

    let total = matching.len() as u64;
    let items: Vec<Value> = matching
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.size as usize)
        .collect();

    PartitionedPage::single(items, request.page, request.size, total)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn row_matches(row: &Value, filters: &FilterValues) -> bool {
    filters.iter().all(|(id, wanted)| {
        let Some(field) = row.get(id).filter(|v| !v.is_null()).map(render) else {
            return false;
        };
        match wanted {
            FilterValue::Text(text) => field == *text,
            FilterValue::List(options) => options.iter().any(|o| *o == field),
            // ISO dates and datetimes order lexicographically
            FilterValue::Range(range) => {
                range.from.as_deref().map_or(true, |from| field.as_str() >= from)
                    && range.to.as_deref().map_or(true, |to| field.as_str() <= to)
            }
        }
    })
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => render(a).cmp(&render(b)),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
