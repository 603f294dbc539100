//! HTTP exchange types shared by the client and its transports.
//!
//! # Design
//! Requests and responses are plain data. `CouchClient` builds `HttpRequest`
//! values and parses `HttpResponse` values; a `Transport` (or the caller, when
//! driving the `build_*` / `parse_*` pairs directly) performs the I/O in
//! between. All fields are owned so values can be stored, logged, or handed to
//! another HTTP stack without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute. When `body` is present the matching content type is
/// carried in `headers` under `content-type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A request without payload.
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a payload together with its content type.
    pub fn with_body(mut self, body: impl Into<String>, content_type: &str) -> Self {
        self.headers
            .push(("content-type".to_string(), content_type.to_string()));
        self.body = Some(body.into());
        self
    }

    /// The `content-type` header value, if one was set.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_body_has_no_content_type() {
        let req = HttpRequest::new(HttpMethod::Get, "http://localhost:5984/_all_dbs".to_string());
        assert!(req.body.is_none());
        assert!(req.content_type().is_none());
    }

    #[test]
    fn with_body_sets_content_type_header() {
        let req = HttpRequest::new(HttpMethod::Post, "http://localhost:5984/db".to_string())
            .with_body(r#"{"a":1}"#, "application/json");
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(req.content_type(), Some("application/json"));
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn content_type_lookup_ignores_header_case() {
        let mut req = HttpRequest::new(HttpMethod::Post, "http://x/db".to_string());
        req.headers
            .push(("Content-Type".to_string(), "application/javascript".to_string()));
        assert_eq!(req.content_type(), Some("application/javascript"));
    }

    #[test]
    fn success_covers_2xx_only() {
        let response = |status| HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response(200).is_success());
        assert!(response(201).is_success());
        assert!(!response(304).is_success());
        assert!(!response(404).is_success());
        assert!(!response(412).is_success());
    }

    #[test]
    fn method_renders_as_wire_token() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
