//! Pagination conventions shared by every listing endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_ITEMS_PER_PAGE: i64 = 10;
const MAX_ITEMS_PER_PAGE: i64 = 100;

/// Listing request: free-text search plus a page window.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: i64,
}

const fn default_page() -> i64 {
    1
}

const fn default_items_per_page() -> i64 {
    DEFAULT_ITEMS_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            search: None,
            page: default_page(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl PageRequest {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.items_per_page.clamp(1, MAX_ITEMS_PER_PAGE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// `ILIKE` pattern matching the search term anywhere, or everything
    /// when no term was given.
    #[must_use]
    pub fn search_pattern(&self) -> String {
        match self.search.as_deref() {
            Some(term) if !term.is_empty() => format!("%{term}%"),
            _ => "%".to_string(),
        }
    }
}

/// One page of results in the API's envelope shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub current_page: i64,
    pub items_per_page: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            data,
            total,
            current_page: request.page.max(1),
            items_per_page: request.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_starts_at_zero_for_first_page() {
        let request = PageRequest::default();

        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn offset_advances_by_page_size() {
        let request = PageRequest {
            search: None,
            page: 3,
            items_per_page: 25,
        };

        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn limit_is_clamped() {
        let request = PageRequest {
            search: None,
            page: 1,
            items_per_page: 100_000,
        };

        assert_eq!(request.limit(), 100);
    }

    #[test]
    fn search_pattern_matches_everything_when_empty() {
        let request = PageRequest::default();

        assert_eq!(request.search_pattern(), "%");
    }

    #[test]
    fn search_pattern_wraps_term() {
        let request = PageRequest {
            search: Some("mrna".to_string()),
            page: 1,
            items_per_page: 10,
        };

        assert_eq!(request.search_pattern(), "%mrna%");
    }
}
