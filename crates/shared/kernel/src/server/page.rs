//! Wire shape for paginated list responses.

use vhub_domain::pagination::PageRequest;

/// Pagination block attached to list responses.
#[vhub_derive::api_model]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// A page of rows together with its [`PageInfo`].
#[vhub_derive::api_model]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    /// Wraps one page of rows, deriving the pagination block from the
    /// clamped request and the total row count.
    pub fn new(data: Vec<T>, request: PageRequest, total: usize) -> Self {
        let clamped = request.clamped();
        Self {
            data,
            pagination: PageInfo {
                page: clamped.page,
                page_size: clamped.page_size,
                total,
                total_pages: clamped.total_pages(total),
            },
        }
    }
}
