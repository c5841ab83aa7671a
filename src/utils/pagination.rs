use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&limit=` as sent by clients
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// page < 1 becomes 1; limit outside 1..=100 becomes the default of 20.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page, query.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 { 0 } else { (total + request.limit - 1) / request.limit };
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_out_of_range_values() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(-3), Some(101)), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(3), Some(100)), PageRequest { page: 3, limit: 100 });
    }

    #[test]
    fn computes_offset_and_total_pages() {
        let request = PageRequest::new(Some(3), Some(10));
        assert_eq!(request.offset(), 20);
        assert_eq!(Pagination::new(&request, 21).total_pages, 3);
        assert_eq!(Pagination::new(&request, 20).total_pages, 2);
        assert_eq!(Pagination::new(&request, 0).total_pages, 0);
    }
}
