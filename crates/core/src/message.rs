//! Request and response value types.
//!
//! A `Response` owns its body as immutable [`Bytes`], so cloning yields a
//! fully independent copy. The router keeps one copy in a partition and hands
//! the other to the caller.

use bytes::Bytes;

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method as issued by the page.
    pub method: String,
    /// Absolute URL or origin-relative path.
    pub url: String,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: url.into() }
    }

    /// Build a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// A full response payload: status, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Empty-bodied 404 used when no strategy can produce a real response.
    pub fn not_found() -> Self {
        Self::new(404, Bytes::new())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Status in the 200..=299 range.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method_case_insensitive() {
        assert!(Request::new("get", "/").is_get());
        assert!(Request::get("/").is_get());
        assert!(!Request::new("POST", "/").is_get());
    }

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new(200, "x").is_ok());
        assert!(Response::new(204, "").is_ok());
        assert!(!Response::new(304, "").is_ok());
        assert!(!Response::not_found().is_ok());
        assert_eq!(Response::not_found().status, 404);
        assert!(Response::not_found().body.is_empty());
    }

    #[test]
    fn test_response_header_lookup() {
        let response = Response::new(200, "body").with_header("Content-Type", "text/html");
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_response_clone_is_independent() {
        let original = Response::new(200, "payload");
        let mut copy = original.clone();
        copy.body = Bytes::from_static(b"changed");
        copy.status = 500;
        assert_eq!(original.body, Bytes::from_static(b"payload"));
        assert_eq!(original.status, 200);
    }
}
