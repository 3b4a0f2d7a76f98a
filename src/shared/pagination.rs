//! Pagination
//!
//! Offset pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub page_no: Option<i64>,
    pub page_size: Option<i64>,
    /// Free-text filter, matched case-insensitively
    pub q: Option<String>,
}

impl SearchRequest {
    pub fn new(page_no: i64, page_size: i64) -> Self {
        Self {
            page_no: Some(page_no),
            page_size: Some(page_size),
            q: None,
        }
    }

    /// One-based page number, never below 1.
    pub fn page_no(&self) -> i64 {
        self.page_no.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset of the page; saturates so huge page numbers yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page_no() - 1).saturating_mul(self.page_size())
    }

    pub fn limit(&self) -> i64 {
        self.page_size()
    }

    /// `ILIKE` pattern for the query, or `%` when no query was given.
    pub fn pattern(&self) -> String {
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let escaped = q
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            }
            _ => "%".to_string(),
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult<T> {
    pub values: Vec<T>,
    pub total_entries: i64,
    pub page_no: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub is_first: bool,
    pub is_last: bool,
}

impl<T> SearchResult<T> {
    pub fn new(values: Vec<T>, total_entries: i64, request: &SearchRequest) -> Self {
        let page_size = request.page_size();
        let page_no = request.page_no();
        let total_pages = if total_entries <= 0 {
            0
        } else {
            (total_entries + page_size - 1) / page_size
        };

        Self {
            values,
            total_entries,
            page_no,
            page_size,
            total_pages,
            is_first: page_no == 1,
            is_last: page_no >= total_pages,
        }
    }

    pub fn empty(request: &SearchRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Convert the values while keeping paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> SearchResult<U> {
        SearchResult {
            values: self.values.into_iter().map(f).collect(),
            total_entries: self.total_entries,
            page_no: self.page_no,
            page_size: self.page_size,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, None, 1, 10, 0 ; "defaults")]
    #[test_case(Some(3), Some(20), 3, 20, 40 ; "explicit")]
    #[test_case(Some(0), Some(1000), 1, 100, 0 ; "clamped")]
    #[test_case(Some(-4), Some(0), 1, 1, 0 ; "negative")]
    fn test_request_bounds(page_no: Option<i64>, page_size: Option<i64>, no: i64, size: i64, offset: i64) {
        let req = SearchRequest { page_no, page_size, q: None };
        assert_eq!(req.page_no(), no);
        assert_eq!(req.page_size(), size);
        assert_eq!(req.offset(), offset);
    }

    #[test]
    fn test_offset_saturates_on_huge_page_number() {
        let req: SearchRequest =
            serde_json::from_str(r#"{"page_no": 9223372036854775807, "page_size": 100}"#).unwrap();
        assert_eq!(req.offset(), i64::MAX);
        assert!(req.offset() >= 0);

        let result: SearchResult<i32> = SearchResult::new(vec![], 5, &req);
        assert!(result.is_last);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = SearchRequest::new(2, 10);
        let result = SearchResult::new(vec![1, 2, 3], 23, &req);
        assert_eq!(result.total_pages, 3);
        assert!(!result.is_first);
        assert!(!result.is_last);
    }

    #[test]
    fn test_empty_result_is_first_and_last() {
        let result: SearchResult<i32> = SearchResult::empty(&SearchRequest::default());
        assert_eq!(result.total_pages, 0);
        assert!(result.is_first);
        assert!(result.is_last);
    }

    #[test]
    fn test_pattern_escapes_wildcards() {
        let req = SearchRequest { q: Some(" 50%_off ".into()), ..Default::default() };
        assert_eq!(req.pattern(), "%50\\%\\_off%");
        assert_eq!(SearchRequest::default().pattern(), "%");
    }

    #[test]
    fn test_map_keeps_metadata() {
        let req = SearchRequest::new(1, 2);
        let result = SearchResult::new(vec![1, 2], 4, &req).map(|v| v * 10);
        assert_eq!(result.values, vec![10, 20]);
        assert_eq!(result.total_pages, 2);
    }
}
