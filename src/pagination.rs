//! Page windows and navigation links for collection endpoints.
//!
//! Query values arrive as raw strings so that non-numeric input can be
//! reported as a JSON validation error instead of an extractor rejection.

use axum::http::{HeaderMap, Uri, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw `page`/`limit`/`q` query parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("{0} must be a whole number")]
    NotNumeric(&'static str),
}

/// A validated `(page, limit)` pair. Both are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Parse raw query values, clamping to `1..` for page and `1..=MAX_LIMIT`
    /// for limit. Missing or empty values fall back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        Ok(Self {
            page: parse_clamped(page, "page", DEFAULT_PAGE, u32::MAX)?,
            limit: parse_clamped(limit, "limit", DEFAULT_LIMIT, MAX_LIMIT)?,
        })
    }

    pub fn from_query(query: &PageQuery) -> Result<Self, PaginationError> {
        Self::parse(query.page.as_deref(), query.limit.as_deref())
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

fn parse_clamped(
    raw: Option<&str>,
    field: &'static str,
    default: u32,
    max: u32,
) -> Result<u32, PaginationError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };
    let value = raw
        .parse::<i64>()
        .map_err(|_| PaginationError::NotNumeric(field))?;
    Ok(value.clamp(1, i64::from(max)) as u32)
}

/// Where a page sits within a collection of `total` rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageWindow {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let limit = i64::from(request.limit);
        let pages = (total + limit - 1) / limit;
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages,
            has_next: i64::from(request.page) < pages,
            has_previous: request.page > 1,
        }
    }
}

/// One page of rows plus its window.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
}

impl PageLinks {
    /// Build next/previous links by substituting `limit` and `page` into
    /// `base`. A search term is carried along so links stay on the same
    /// result set.
    pub fn build(base: &Url, window: &PageWindow, q: Option<&str>) -> Self {
        let link = |page: u32| {
            let mut url = base.clone();
            {
                let mut pairs = url.query_pairs_mut();
                pairs.clear();
                pairs.append_pair("limit", &window.limit.to_string());
                pairs.append_pair("page", &page.to_string());
                if let Some(q) = q {
                    pairs.append_pair("q", q);
                }
            }
            url.to_string()
        };

        Self {
            next_page: window.has_next.then(|| link(window.page + 1)),
            previous_page: window.has_previous.then(|| link(window.page - 1)),
        }
    }
}

/// Reconstruct the absolute URL of the current request, without its query.
pub fn request_base_url(headers: &HeaderMap, uri: &Uri) -> Result<Url, url::ParseError> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let mut url = Url::parse(&format!("http://{}", host))?;
    url.set_path(uri.path());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_parameters_are_missing() {
        assert_eq!(PageRequest::parse(None, None).unwrap(), PageRequest::default());
        assert_eq!(
            PageRequest::parse(Some(""), Some(" ")).unwrap(),
            PageRequest { page: 1, limit: 10 }
        );
    }

    #[test]
    fn values_are_clamped_to_positive_range() {
        let req = PageRequest::parse(Some("0"), Some("-4")).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 1 });

        let req = PageRequest::parse(Some("2"), Some("5000")).unwrap();
        assert_eq!(req, PageRequest { page: 2, limit: MAX_LIMIT });
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        assert_eq!(
            PageRequest::parse(Some("two"), None),
            Err(PaginationError::NotNumeric("page"))
        );
        assert_eq!(
            PageRequest::parse(None, Some("1.5")),
            Err(PaginationError::NotNumeric("limit"))
        );
    }

    #[test]
    fn window_for_first_and_last_page_of_twenty_five() {
        let first = PageWindow::new(PageRequest { page: 1, limit: 10 }, 25);
        assert_eq!(first.pages, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last = PageWindow::new(PageRequest { page: 3, limit: 10 }, 25);
        assert!(!last.has_next);
        assert!(last.has_previous);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset(), 20);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let window = PageWindow::new(PageRequest::default(), 0);
        assert_eq!(window.pages, 0);
        assert!(!window.has_next);
        assert!(!window.has_previous);
    }

    #[test]
    fn links_substitute_page_and_limit() {
        let base = Url::parse("http://example.com/api/v1.0/bucketlists/").unwrap();
        let window = PageWindow::new(PageRequest { page: 2, limit: 10 }, 25);

        let links = PageLinks::build(&base, &window, None);
        assert_eq!(
            links.next_page.as_deref(),
            Some("http://example.com/api/v1.0/bucketlists/?limit=10&page=3")
        );
        assert_eq!(
            links.previous_page.as_deref(),
            Some("http://example.com/api/v1.0/bucketlists/?limit=10&page=1")
        );
    }

    #[test]
    fn links_are_absent_on_single_page_and_keep_search_term() {
        let base = Url::parse("http://example.com/api/v1.0/bucketlists/").unwrap();
        let window = PageWindow::new(PageRequest { page: 1, limit: 10 }, 3);
        let links = PageLinks::build(&base, &window, Some("Travel"));
        assert_eq!(links.next_page, None);
        assert_eq!(links.previous_page, None);

        let window = PageWindow::new(PageRequest { page: 1, limit: 1 }, 3);
        let links = PageLinks::build(&base, &window, Some("Road trip"));
        assert_eq!(
            links.next_page.as_deref(),
            Some("http://example.com/api/v1.0/bucketlists/?limit=1&page=2&q=Road+trip")
        );
    }

    #[test]
    fn base_url_uses_host_header_and_path() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "api.test:8080".parse().unwrap());
        let uri: Uri = "/api/v1.0/bucketlists/?page=2".parse().unwrap();

        let url = request_base_url(&headers, &uri).unwrap();
        assert_eq!(url.as_str(), "http://api.test:8080/api/v1.0/bucketlists/");
    }
}
