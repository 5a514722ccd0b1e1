//! Offset pagination helpers.
//!
//! Listings use 1-based page numbers with a per-page size. The helpers
//! here clamp raw query input and compute the LIMIT/OFFSET pair used by
//! the repositories.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Hard upper bound on page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Raw pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page, clamped to `1..=MAX_PER_PAGE`.
    pub per_page: u32,
}

impl PageWindow {
    /// Normalize raw parameters into a valid window.
    pub fn from_params(params: PageParams) -> Self {
        let page = params.page.unwrap_or(1).max(1);
        let per_page = params
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    /// Row offset for a LIMIT/OFFSET query.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * (self.per_page as i64)
    }

    /// Row limit for a LIMIT/OFFSET query.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Pagination metadata returned alongside listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl PageMeta {
    pub fn new(window: PageWindow, total: i64) -> Self {
        Self {
            page: window.page,
            per_page: window.per_page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let window = PageWindow::from_params(PageParams::default());
        assert_eq!(window.page, 1);
        assert_eq!(window.per_page, DEFAULT_PER_PAGE);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_offset_computation() {
        let window = PageWindow::from_params(PageParams {
            page: Some(3),
            per_page: Some(25),
        });
        assert_eq!(window.offset(), 50);
        assert_eq!(window.limit(), 25);
    }

    #[test]
    fn test_page_zero_clamped_to_one() {
        let window = PageWindow::from_params(PageParams {
            page: Some(0),
            per_page: None,
        });
        assert_eq!(window.page, 1);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_per_page_clamped_to_max() {
        let window = PageWindow::from_params(PageParams {
            page: None,
            per_page: Some(10_000),
        });
        assert_eq!(window.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_per_page_zero_clamped_to_one() {
        let window = PageWindow::from_params(PageParams {
            page: None,
            per_page: Some(0),
        });
        assert_eq!(window.per_page, 1);
    }

    #[test]
    fn test_page_meta() {
        let window = PageWindow::from_params(PageParams {
            page: Some(2),
            per_page: Some(10),
        });
        let meta = PageMeta::new(window, 42);
        assert_eq!(meta.page, 2);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total, 42);
    }
}
