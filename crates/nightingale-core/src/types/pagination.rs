//! Offset pagination shared by the list endpoints and repositories.

use serde::{Deserialize, Serialize};

/// Page size applied when a request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 25;
/// Ceiling on page size; oversized requests are clamped, not refused.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page selection, normalized on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Normalize raw query values: page 0 becomes 1 and the size is
    /// clamped into `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip to reach this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Rows to fetch for this page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results with its navigation bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Wrap one page of `items`, deriving the navigation fields from
    /// the total row count. An empty collection still reports one page
    /// so clients can render "page 1 of 1".
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size.max(1)).max(1);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// A page with no rows at all.
    pub fn empty(page: &PageRequest) -> Self {
        Self::new(Vec::new(), page.page, page.page_size, 0)
    }
}

fn first_page() -> u64 {
    1
}

fn default_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_skips_earlier_pages() {
        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_out_of_range_values_are_normalized() {
        let page = PageRequest::new(0, 10_000);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, 0).page_size, 1);
    }

    #[test]
    fn test_partial_last_page_rounds_up() {
        let resp = PageResponse::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next);
        assert!(!resp.has_previous);
    }

    #[test]
    fn test_middle_page_links_both_ways() {
        let resp = PageResponse::new(vec![4, 5, 6], 2, 3, 7);
        assert!(resp.has_next);
        assert!(resp.has_previous);
    }

    #[test]
    fn test_empty_collection_is_one_page() {
        let resp: PageResponse<i32> = PageResponse::empty(&PageRequest::default());
        assert_eq!(resp.total_pages, 1);
        assert_eq!(resp.total_items, 0);
        assert!(!resp.has_next);
    }
}
