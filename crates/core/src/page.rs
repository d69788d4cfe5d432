//! Offset pagination arithmetic for catalog listings.

use serde::Serialize;

/// Page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Largest page a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// A normalized page request. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Normalize raw query values: a missing or non-positive page becomes 1,
    /// a missing per_page becomes `default_per_page`, and per_page is clamped
    /// to `[1, max_per_page]`.
    pub fn new(
        page: Option<i64>,
        per_page: Option<i64>,
        default_per_page: u32,
        max_per_page: u32,
    ) -> Self {
        let page = u32::try_from(page.unwrap_or(1).max(1)).unwrap_or(u32::MAX);
        let max_per_page = max_per_page.max(1);
        let per_page = per_page
            .unwrap_or_else(|| i64::from(default_per_page))
            .clamp(1, i64::from(max_per_page));
        let per_page = u32::try_from(per_page).unwrap_or(max_per_page);
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PER_PAGE, MAX_PER_PAGE)
    }
}

/// Navigation summary returned alongside a page of results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page());
        let pages = total.div_ceil(per_page);
        let current = u64::from(request.page());
        Self {
            total,
            pages,
            current_page: request.page(),
            per_page: request.per_page(),
            has_next: current < pages,
            has_prev: current > 1,
        }
    }
}
