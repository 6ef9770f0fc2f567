//! Page/size clamping shared by every list operation.

use serde::{Deserialize, Serialize};

/// Page size used when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a 1-based page number; anything below 1 becomes 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a page size into `1..=MAX_PAGE_SIZE`, defaulting to [`DEFAULT_PAGE_SIZE`].
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Paging parameters for list operations (`?page=&page_size=&include_deleted=`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            include_deleted: false,
        }
    }

    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn page(&self) -> i64 {
        clamp_page(self.page)
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        clamp_page_size(self.page_size)
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one_and_floors() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page(Some(4)), 4);
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(clamp_page_size(None), 20);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(500)), 100);
        assert_eq!(clamp_page_size(Some(50)), 50);
    }

    #[test]
    fn offset_follows_page_and_size() {
        let req = PageRequest::new(3, 25);
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn include_deleted_defaults_to_false() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.include_deleted);
        assert!(req.including_deleted().include_deleted);
    }
}
