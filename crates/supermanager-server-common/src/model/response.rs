//! HTTP response types for SuperManager server

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use url::Url;

use supermanager_persistence::{Page, PageRequest};

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// `{"detail": ...}` body used by most error responses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
        }
    }

    pub fn with_code(detail: impl Into<String>, code: &str) -> Self {
        Self {
            detail: detail.into(),
            code: Some(code.to_string()),
        }
    }
}

/// Limit/offset envelope with absolute links to the neighbouring windows
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(req: &HttpRequest, page: Page<T>) -> Self {
        let url = req.full_url();

        let next = page
            .next_offset()
            .map(|offset| page_link(&url, page.limit, Some(offset)));
        let previous = page.previous_offset().map(|offset| {
            if offset == 0 {
                page_link(&url, page.limit, None)
            } else {
                page_link(&url, page.limit, Some(offset))
            }
        });

        Self {
            count: page.count,
            next,
            previous,
            results: page.results,
        }
    }

    pub fn http_response(req: &HttpRequest, page: Page<T>) -> HttpResponse {
        HttpResponse::Ok().json(Self::new(req, page))
    }
}

/// Rewrites `limit`/`offset` on `url`, keeping every other query parameter.
/// `offset = None` drops the parameter, which is how the first window is linked.
pub fn page_link(url: &Url, limit: u64, offset: Option<u64>) -> String {
    let kept = url
        .query_pairs()
        .filter(|(k, _)| k != LIMIT_PARAM && k != OFFSET_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<(String, String)>>();

    let mut link = url.clone();
    link.set_query(None);
    {
        let mut query = link.query_pairs_mut();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query.append_pair(LIMIT_PARAM, &limit.to_string());
        if let Some(offset) = offset {
            query.append_pair(OFFSET_PARAM, &offset.to_string());
        }
    }

    link.to_string()
}

/// Window requested by the `limit`/`offset` query parameters.
pub fn page_request(params: &HashMap<String, String>, default_limit: u64) -> PageRequest {
    PageRequest::from_params(
        params.get(LIMIT_PARAM).map(String::as_str),
        params.get(OFFSET_PARAM).map(String::as_str),
        default_limit,
    )
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn page(count: u64, limit: u64, offset: u64) -> Page<i32> {
        Page::new(count, PageRequest::new(limit, offset), vec![1, 2])
    }

    #[test]
    fn test_page_link_keeps_other_params() {
        let url = Url::parse("http://localhost:8000/devices/?status=1&limit=5&offset=10").unwrap();
        assert_eq!(
            page_link(&url, 5, Some(15)),
            "http://localhost:8000/devices/?status=1&limit=5&offset=15"
        );
        assert_eq!(
            page_link(&url, 5, None),
            "http://localhost:8000/devices/?status=1&limit=5"
        );
    }

    #[test]
    fn test_first_window_has_no_previous() {
        let req = TestRequest::get()
            .uri("/device-types/?limit=2")
            .insert_header(("host", "inventory.local"))
            .to_http_request();

        let paginated = Paginated::new(&req, page(5, 2, 0));
        assert_eq!(paginated.count, 5);
        assert!(paginated.previous.is_none());
        assert_eq!(
            paginated.next.as_deref(),
            Some("http://inventory.local/device-types/?limit=2&offset=2")
        );
    }

    #[test]
    fn test_middle_and_last_windows() {
        let req = TestRequest::get()
            .uri("/device-types/?limit=2&offset=2")
            .insert_header(("host", "inventory.local"))
            .to_http_request();

        let middle = Paginated::new(&req, page(5, 2, 2));
        assert_eq!(
            middle.previous.as_deref(),
            Some("http://inventory.local/device-types/?limit=2")
        );
        assert_eq!(
            middle.next.as_deref(),
            Some("http://inventory.local/device-types/?limit=2&offset=4")
        );

        let last = Paginated::new(&req, page(5, 2, 4));
        assert!(last.next.is_none());
        assert_eq!(
            last.previous.as_deref(),
            Some("http://inventory.local/device-types/?limit=2&offset=2")
        );
    }

    #[test]
    fn test_page_request_from_params() {
        let mut params = HashMap::new();
        params.insert("limit".to_string(), "500".to_string());
        params.insert("offset".to_string(), "3".to_string());

        let request = page_request(&params, 10);
        assert_eq!(request.limit, 100);
        assert_eq!(request.offset, 3);

        params.insert("limit".to_string(), "abc".to_string());
        assert_eq!(page_request(&params, 10).limit, 10);
    }

    #[test]
    fn test_detail_serialization() {
        let json = serde_json::to_value(Detail::new("Not found.")).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Not found."}));

        let json = serde_json::to_value(Detail::with_code("Token is invalid.", "token_not_valid")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"detail": "Token is invalid.", "code": "token_not_valid"})
        );
    }
}
