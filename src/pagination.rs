//! This modules defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A validated page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The one-based page number.
    pub page: u64,
    /// The maximum number of items on the page.
    pub limit: u64,
}

impl PageRequest {
    /// The number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl PaginationConfig {
    /// Resolve the page and page size requested by a client.
    ///
    /// Values that are missing, are not positive integers, or exceed
    /// [PaginationConfig::max_page_size] fall back to the defaults.
    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        let page = page
            .and_then(|page| page.trim().parse::<u64>().ok())
            .filter(|&page| page >= 1)
            .unwrap_or(self.default_page);

        let limit = limit
            .and_then(|limit| limit.trim().parse::<u64>().ok())
            .filter(|&limit| (1..=self.max_page_size).contains(&limit))
            .unwrap_or(self.default_page_size);

        PageRequest { page, limit }
    }
}

/// The pagination metadata sent alongside a page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The one-based number of the page being returned.
    pub current_page: u64,
    /// The number of pages needed to show every item.
    pub total_pages: u64,
    /// The number of items across all pages.
    pub total_items: u64,
    /// The page size.
    pub items_per_page: u64,
    /// Whether there is a page after this one.
    pub has_next_page: bool,
    /// Whether there is a page before this one.
    pub has_previous_page: bool,
}

impl Pagination {
    /// Describe where `request` sits among `total_items` items.
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.limit);

        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.limit,
            has_next_page: request.page < total_pages,
            has_previous_page: request.page > 1,
        }
    }
}

#[cfg(test)]
mod pagination_tests {
    use super::{PageRequest, Pagination, PaginationConfig};

    #[test]
    fn page_request_uses_defaults() {
        let config = PaginationConfig::default();

        let got = config.page_request(None, None);

        assert_eq!(got, PageRequest { page: 1, limit: 10 });
        assert_eq!(got.offset(), 0);
    }

    #[test]
    fn page_request_parses_values() {
        let config = PaginationConfig::default();

        let got = config.page_request(Some("3"), Some("25"));

        assert_eq!(got, PageRequest { page: 3, limit: 25 });
    }

    #[test]
    fn page_request_ignores_invalid_values() {
        let config = PaginationConfig::default();

        assert_eq!(config.page_request(Some("0"), Some("0")), PageRequest { page: 1, limit: 10 });
        assert_eq!(
            config.page_request(Some("two"), Some("-5")),
            PageRequest { page: 1, limit: 10 }
        );
    }

    #[test]
    fn page_request_ignores_oversized_limit() {
        let config = PaginationConfig::default();

        assert_eq!(config.page_request(None, Some("100")).limit, 100);
        assert_eq!(config.page_request(None, Some("101")).limit, 10);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest { page: 3, limit: 20 };

        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let got = Pagination::new(PageRequest { page: 2, limit: 10 }, 21);

        assert_eq!(
            got,
            Pagination {
                current_page: 2,
                total_pages: 3,
                total_items: 21,
                items_per_page: 10,
                has_next_page: true,
                has_previous_page: true,
            }
        );
    }

    #[test]
    fn pagination_with_no_items_has_no_pages() {
        let got = Pagination::new(PageRequest { page: 1, limit: 10 }, 0);

        assert_eq!(got.total_pages, 0);
        assert!(!got.has_next_page);
        assert!(!got.has_previous_page);
    }
}
