//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
const DEFAULT_PER_PAGE: u32 = 50;

/// Upper bound on page size to keep result sets bounded.
const MAX_PER_PAGE: u32 = 500;

/// Query parameters for paginated list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page, clamped to [1, 500].
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageParams {
    /// SQL LIMIT value after clamping.
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE) as i64
    }

    /// SQL OFFSET value after clamping.
    pub fn offset(&self) -> i64 {
        let page = self.page.max(1) as i64;
        (page - 1) * self.limit()
    }
}

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_count: i64,
    pub has_more: bool,
}

impl PageInfo {
    /// Build page metadata from the request parameters and total row count.
    pub fn new(params: &PageParams, total_count: i64) -> Self {
        let per_page = params.per_page.clamp(1, MAX_PER_PAGE);
        let page = params.page.max(1);
        let has_more = (page as i64) * (per_page as i64) < total_count;
        Self {
            page,
            per_page,
            total_count,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PageParams::default();
        assert_eq!(params.limit(), 50);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let params = PageParams {
            page: 3,
            per_page: 25,
        };
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_per_page_clamped_to_max() {
        let params = PageParams {
            page: 1,
            per_page: 10_000,
        };
        assert_eq!(params.limit(), 500);
    }

    #[test]
    fn test_zero_values_clamped() {
        let params = PageParams {
            page: 0,
            per_page: 0,
        };
        assert_eq!(params.limit(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_page_info_has_more() {
        let params = PageParams {
            page: 1,
            per_page: 50,
        };
        let info = PageInfo::new(&params, 120);
        assert!(info.has_more);
        assert_eq!(info.total_count, 120);

        let last = PageParams {
            page: 3,
            per_page: 50,
        };
        let info = PageInfo::new(&last, 120);
        assert!(!info.has_more);
    }

    #[test]
    fn test_page_params_deserialize_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 50);
    }
}
