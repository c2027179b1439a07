//! Read-only view over the request head.

use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method};

/// Method, path and headers of an inbound request.
///
/// Built once per request by the transport layer. The body is not reachable
/// from here.
#[derive(Debug, Clone)]
pub struct HeaderView {
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl HeaderView {
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
        }
    }

    /// Snapshot the head of an axum request.
    pub fn from_parts(parts: &Parts) -> Self {
        Self::new(parts.method.clone(), parts.uri.path(), parts.headers.clone())
    }

    /// Return a copy with one more header set.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text. Lookup is case-insensitive; values that are
    /// not visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
