//! Offset pagination for list endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default items per page.
const DEFAULT_PER_PAGE: u32 = 20;

/// Maximum items per page.
const MAX_PER_PAGE: u32 = 100;

/// A page request with 1-based page numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct PageRequest {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (capped)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Create a page request for the given page with the default size.
    pub fn page(page: u32) -> Self {
        Self {
            page,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Effective page size after capping.
    pub fn limit(&self) -> usize {
        self.per_page.clamp(1, MAX_PER_PAGE) as usize
    }

    /// Item offset of the first element on this page.
    pub fn offset(&self) -> usize {
        let page = self.page.max(1) as usize;
        (page - 1) * self.limit()
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// 1-based page number
    pub page: u32,

    /// Requested page size
    pub per_page: u32,

    /// Total number of items across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Build a page from the full request and total count.
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page.max(1),
            per_page: request.limit() as u32,
            total,
        }
    }
}
