//! Alert and pagination response headers.
//!
//! # Invariants
//! - Header names are derived from a validated application name, so building
//!   them cannot fail after [`AlertHeaders::new`] succeeds.
//! - Link targets carry only numbers and form-encoded text.

use axum::http::header::LINK;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use dictionary_core::Page;
use thiserror::Error;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Error)]
#[error("application name `{0}` must be non-empty ASCII letters, digits, `-` or `_`")]
pub struct InvalidAppName(pub String);

/// Builds `X-<app>-alert` / `X-<app>-error` / `X-<app>-params` headers.
#[derive(Debug, Clone)]
pub struct AlertHeaders {
    app_name: String,
    alert: HeaderName,
    error: HeaderName,
    params: HeaderName,
}

impl AlertHeaders {
    pub fn new(app_name: &str) -> Result<Self, InvalidAppName> {
        let valid = !app_name.is_empty()
            && app_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(InvalidAppName(app_name.to_string()));
        }

        let name = |suffix: &str| {
            HeaderName::from_bytes(format!("x-{app_name}-{suffix}").as_bytes())
                .map_err(|_| InvalidAppName(app_name.to_string()))
        };

        Ok(Self {
            app_name: app_name.to_string(),
            alert: name("alert")?,
            error: name("error")?,
            params: name("params")?,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn created(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(format!("{}.{entity}.created", self.app_name), id)
    }

    pub fn updated(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(format!("{}.{entity}.updated", self.app_name), id)
    }

    pub fn deleted(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(format!("{}.{entity}.deleted", self.app_name), id)
    }

    /// Failure alert naming the entity and a reason code such as `idexists`.
    pub fn failure(&self, entity: &str, error_key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        put(&mut headers, self.error.clone(), format!("error.{error_key}"));
        put(&mut headers, self.params.clone(), entity.to_string());
        headers
    }

    fn alert(&self, message: String, param: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        put(&mut headers, self.alert.clone(), message);
        put(&mut headers, self.params.clone(), param.to_string());
        headers
    }
}

/// `X-Total-Count` plus an RFC 5988 `Link` header for a listing.
pub fn pagination_headers<T>(page: &Page<T>, base_url: &str) -> HeaderMap {
    link_headers(page, |number, size| {
        format!("{base_url}?page={number}&size={size}")
    })
}

/// Same as [`pagination_headers`] with the search query echoed in each link.
pub fn search_pagination_headers<T>(query: &str, page: &Page<T>, base_url: &str) -> HeaderMap {
    let encoded = serde_urlencoded::to_string([("query", query)]).unwrap_or_default();
    link_headers(page, |number, size| {
        format!("{base_url}?page={number}&size={size}&{encoded}")
    })
}

fn link_headers<T, F>(page: &Page<T>, uri: F) -> HeaderMap
where
    F: Fn(u64, u32) -> String,
{
    let number = u64::from(page.number);
    let mut links = Vec::with_capacity(4);

    if page.has_next() {
        links.push(format!("<{}>; rel=\"next\"", uri(number + 1, page.size)));
    }
    if page.has_previous() {
        links.push(format!("<{}>; rel=\"prev\"", uri(number - 1, page.size)));
    }
    let last = page.total_pages().saturating_sub(1);
    links.push(format!("<{}>; rel=\"last\"", uri(last, page.size)));
    links.push(format!("<{}>; rel=\"first\"", uri(0, page.size)));

    let mut headers = HeaderMap::new();
    put(
        &mut headers,
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        page.total_elements.to_string(),
    );
    put(&mut headers, LINK, links.join(","));
    headers
}

fn put(headers: &mut HeaderMap, name: HeaderName, value: String) {
    if let Ok(value) = HeaderValue::try_from(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::{pagination_headers, search_pagination_headers, AlertHeaders};
    use axum::http::header::LINK;
    use dictionary_core::{Page, PageRequest};

    fn header<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> &'a str {
        headers.get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn alert_headers_name_the_app_and_entity() {
        let alerts = AlertHeaders::new("dictionaryApp").unwrap();

        let created = alerts.created("word", "12");
        assert_eq!(header(&created, "x-dictionaryapp-alert"), "dictionaryApp.word.created");
        assert_eq!(header(&created, "x-dictionaryapp-params"), "12");

        let failure = alerts.failure("word", "idexists");
        assert_eq!(header(&failure, "x-dictionaryapp-error"), "error.idexists");
        assert_eq!(header(&failure, "x-dictionaryapp-params"), "word");
    }

    #[test]
    fn alert_headers_reject_unsafe_app_names() {
        assert!(AlertHeaders::new("").is_err());
        assert!(AlertHeaders::new("my app").is_err());
        assert!(AlertHeaders::new("app\r\n").is_err());
    }

    #[test]
    fn middle_page_links_all_relations() {
        let page = Page::new(vec![(); 10], &PageRequest::new(1, 10), 35);
        let headers = pagination_headers(&page, "/api/words");

        assert_eq!(header(&headers, "x-total-count"), "35");
        assert_eq!(
            headers.get(LINK).unwrap().to_str().unwrap(),
            "</api/words?page=2&size=10>; rel=\"next\",\
             </api/words?page=0&size=10>; rel=\"prev\",\
             </api/words?page=3&size=10>; rel=\"last\",\
             </api/words?page=0&size=10>; rel=\"first\""
        );
    }

    #[test]
    fn empty_result_links_first_and_last_only() {
        let page: Page<()> = Page::empty(&PageRequest::default());
        let headers = pagination_headers(&page, "/api/words");

        assert_eq!(header(&headers, "x-total-count"), "0");
        assert_eq!(
            headers.get(LINK).unwrap().to_str().unwrap(),
            "</api/words?page=0&size=20>; rel=\"last\",</api/words?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn search_links_echo_the_encoded_query() {
        let page = Page::new(vec![()], &PageRequest::new(0, 1), 2);
        let headers = search_pagination_headers("rus:дом AND id:1", &page, "/api/_search/words");

        let link = headers.get(LINK).unwrap().to_str().unwrap();
        assert!(link.starts_with(
            "</api/_search/words?page=1&size=1&query=rus%3A%D0%B4%D0%BE%D0%BC+AND+id%3A1>; rel=\"next\""
        ));
    }
}
