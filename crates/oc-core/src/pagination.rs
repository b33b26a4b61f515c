//! Pagination types for engine responses
//!
//! The engine answers table fetches with a partitioned page: the result set is
//! split into server-defined partitions, each with its own optional item count.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Parse the wire form (`asc` / `desc`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Get the opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One server-defined shard of a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition<T> {
    pub partition: u32,
    pub items: Vec<T>,
    /// Items in this partition across all pages, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> Partition<T> {
    pub fn new(partition: u32, items: Vec<T>) -> Self {
        Self {
            partition,
            items,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// Partitioned page returned by a data fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionedPage<T> {
    pub partitions: Vec<Partition<T>>,
    /// Page number (0-indexed)
    pub page: u32,
    /// Page size
    pub size: u32,
    /// Number of items in this page
    pub count: u64,
    /// Total number of items across all pages and partitions
    pub total_count: u64,
}

impl<T> PartitionedPage<T> {
    /// Build a single-partition page
    pub fn single(items: Vec<T>, page: u32, size: u32, total_count: u64) -> Self {
        let count = items.len() as u64;
        Self {
            partitions: vec![Partition::new(0, items).with_count(total_count)],
            page,
            size,
            count,
            total_count,
        }
    }

    /// An empty page, which is also what out-of-range requests get back
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            partitions: vec![],
            page,
            size,
            count: 0,
            total_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(|p| p.items.is_empty())
    }

    pub fn partition(&self, partition: u32) -> Option<&Partition<T>> {
        self.partitions.iter().find(|p| p.partition == partition)
    }

    /// Iterate over all items, partition by partition
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flat_map(|p| p.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("DESC"), None);
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.to_string(), "desc");
    }

    #[test]
    fn test_partitioned_page_wire_format() {
        let json = r#"{
            "partitions": [
                {"partition": 0, "items": ["a", "b"], "count": 12},
                {"partition": 1, "items": ["c"]}
            ],
            "page": 0,
            "size": 2,
            "count": 3,
            "totalCount": 13
        }"#;

        let page: PartitionedPage<String> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, 13);
        assert_eq!(page.partition(0).and_then(|p| p.count), Some(12));
        assert_eq!(page.partition(1).and_then(|p| p.count), None);
        assert_eq!(page.items().count(), 3);

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["totalCount"], 13);
        assert!(value["partitions"][1].get("count").is_none());
    }

    #[test]
    fn test_single_and_empty_pages() {
        let page = PartitionedPage::single(vec![1, 2, 3], 1, 3, 9);
        assert_eq!(page.count, 3);
        assert_eq!(page.partition(0).and_then(|p| p.count), Some(9));
        assert!(!page.is_empty());

        let empty: PartitionedPage<i32> = PartitionedPage::empty(4, 10);
        assert!(empty.is_empty());
        assert_eq!(empty.page, 4);
    }
}
