//! Offset pagination for list endpoints.

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for paginated listings. Pages are 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// Clamps the request into valid bounds: `page >= 1`,
    /// `1 <= page_size <= MAX_PAGE_SIZE`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { page: self.page.max(1), page_size: self.page_size.clamp(1, MAX_PAGE_SIZE) }
    }

    /// Row offset for `LIMIT`/`START` style queries.
    #[must_use]
    pub fn offset(self) -> usize {
        let clamped = self.clamped();
        (clamped.page - 1) * clamped.page_size
    }

    /// Number of pages needed for `total` rows, at least 1.
    #[must_use]
    pub fn total_pages(self, total: usize) -> usize {
        let page_size = self.clamped().page_size;
        total.div_ceil(page_size).max(1)
    }
}
