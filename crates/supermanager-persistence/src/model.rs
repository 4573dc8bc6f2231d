//! Pagination and ordering types shared by every list endpoint

use serde::{Deserialize, Serialize};

/// Page size used when the request does not carry a usable `limit`
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Upper bound for `limit`
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Limit/offset window requested by a client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Clamps `limit` into `[1, MAX_PAGE_LIMIT]`.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }

    /// Builds a window from raw query values.
    ///
    /// A missing, non-numeric, or non-positive `limit` falls back to
    /// `default_limit`; a bad `offset` falls back to 0.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>, default_limit: u64) -> Self {
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v as u64)
            .unwrap_or(default_limit);
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v as u64)
            .unwrap_or(0);

        Self::new(limit, offset)
    }
}

/// One window of results together with the total match count
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub limit: u64,
    pub offset: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: u64, request: PageRequest, results: Vec<T>) -> Self {
        Self {
            count,
            limit: request.limit,
            offset: request.offset,
            results,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(0, request, Vec::new())
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            count: self.count,
            limit: self.limit,
            offset: self.offset,
            results: self.results.into_iter().map(f).collect(),
        }
    }

    /// Offset of the following window, if any rows remain
    pub fn next_offset(&self) -> Option<u64> {
        let next = self.offset + self.limit;
        (next < self.count).then_some(next)
    }

    /// Offset of the preceding window; `Some(0)` means the first page
    pub fn previous_offset(&self) -> Option<u64> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// A single `ordering` term such as `-created_at`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingTerm {
    pub field: String,
    pub descending: bool,
}

/// Parses a comma separated `ordering` value; blank terms are skipped.
pub fn parse_ordering(raw: &str) -> Vec<OrderingTerm> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| match term.strip_prefix('-') {
            Some(field) => OrderingTerm {
                field: field.trim().to_string(),
                descending: true,
            },
            None => OrderingTerm {
                field: term.to_string(),
                descending: false,
            },
        })
        .filter(|term| !term.field.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::from_params(None, None, DEFAULT_PAGE_LIMIT);
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn test_page_request_clamps_limit() {
        assert_eq!(PageRequest::from_params(Some("500"), None, 10).limit, 100);
        assert_eq!(PageRequest::from_params(Some("0"), None, 10).limit, 10);
        assert_eq!(PageRequest::from_params(Some("-3"), None, 10).limit, 10);
        assert_eq!(PageRequest::from_params(Some("abc"), None, 10).limit, 10);
        assert_eq!(PageRequest::from_params(Some("25"), Some("x"), 10).offset, 0);
        assert_eq!(PageRequest::from_params(Some("25"), Some("40"), 10).offset, 40);
    }

    #[test]
    fn test_page_offsets() {
        let page: Page<i32> = Page::new(25, PageRequest::new(10, 0), vec![]);
        assert_eq!(page.next_offset(), Some(10));
        assert_eq!(page.previous_offset(), None);

        let page: Page<i32> = Page::new(25, PageRequest::new(10, 20), vec![]);
        assert_eq!(page.next_offset(), None);
        assert_eq!(page.previous_offset(), Some(10));

        let page: Page<i32> = Page::new(25, PageRequest::new(10, 5), vec![]);
        assert_eq!(page.previous_offset(), Some(0));
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(2, PageRequest::default(), vec![1, 2]).map(|v| v * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.count, 2);
    }

    #[test]
    fn test_parse_ordering() {
        let terms = parse_ordering("title, -created_at,,-");
        assert_eq!(
            terms,
            vec![
                OrderingTerm {
                    field: "title".to_string(),
                    descending: false
                },
                OrderingTerm {
                    field: "created_at".to_string(),
                    descending: true
                },
            ]
        );
        assert!(parse_ordering("").is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_limit_always_in_bounds(limit in proptest::prelude::any::<i64>(), offset in proptest::prelude::any::<i64>()) {
            let req = PageRequest::from_params(Some(&limit.to_string()), Some(&offset.to_string()), DEFAULT_PAGE_LIMIT);
            proptest::prop_assert!(req.limit >= 1 && req.limit <= MAX_PAGE_LIMIT);
        }
    }
}
