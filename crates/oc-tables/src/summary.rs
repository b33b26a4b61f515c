//! Partition pagination summary
//!
//! Each partition shows "start–end of count" for the current page. There is
//! no count endpoint, so a partition can shrink between two pages; when the
//! current page starts past its end the summary says so explicitly.

use std::fmt;

/// What to show under a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationSummary {
    /// Nothing to show (count unknown or zero)
    Hidden,
    /// `start–end of count`
    Range { start: u64, end: u64, count: u64 },
    /// The page starts after the last item: `start > count`
    OutOfRange { start: u64, count: u64 },
}

impl PaginationSummary {
    /// Summarize `count` items viewed at `page` (0-based) of `page_size`
    pub fn compute(count: Option<u64>, page: u32, page_size: u32) -> Self {
        let count = match count {
            Some(count) if count > 0 => count,
            _ => return Self::Hidden,
        };

        let page = u64::from(page);
        let page_size = u64::from(page_size);
        let start = page * page_size + 1;

        if start > count {
            return Self::OutOfRange { start, count };
        }

        let end = ((page + 1) * page_size).min(count);
        Self::Range { start, end, count }
    }

    /// Whether the summary should be styled as an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

impl fmt::Display for PaginationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => Ok(()),
            Self::Range { start, end, count } => write!(f, "{}–{} of {}", start, end, count),
            Self::OutOfRange { start, count } => write!(f, "{} > {}", start, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let summary = PaginationSummary::compute(Some(25), 0, 10);
        assert_eq!(summary.to_string(), "1–10 of 25");
        assert!(!summary.is_error());
    }

    #[test]
    fn test_last_partial_page() {
        assert_eq!(
            PaginationSummary::compute(Some(25), 2, 10).to_string(),
            "21–25 of 25"
        );
    }

    #[test]
    fn test_past_the_end() {
        let summary = PaginationSummary::compute(Some(25), 3, 10);
        assert_eq!(summary, PaginationSummary::OutOfRange { start: 31, count: 25 });
        assert_eq!(summary.to_string(), "31 > 25");
        assert!(summary.is_error());
    }

    #[test]
    fn test_unknown_or_empty_count() {
        assert!(PaginationSummary::compute(None, 0, 10).is_hidden());
        assert!(PaginationSummary::compute(Some(0), 4, 10).is_hidden());
        assert_eq!(PaginationSummary::compute(Some(0), 0, 10).to_string(), "");
    }

    #[test]
    fn test_exact_page_boundary() {
        assert_eq!(
            PaginationSummary::compute(Some(20), 1, 10).to_string(),
            "11–20 of 20"
        );
        assert!(PaginationSummary::compute(Some(20), 2, 10).is_error());
    }
}
