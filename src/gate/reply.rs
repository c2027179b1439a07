//! Terminal reply of the pipeline.

use std::borrow::Cow;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Status, headers and body of a finished request.
///
/// The only value that ever leaves the pipeline. Builder methods consume
/// `self`, so a reply handed to someone else cannot be changed under them.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Plain-text reply.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, body.into()).with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )
    }

    /// `200 OK` with body `OK`.
    pub fn ok() -> Self {
        Self::text(StatusCode::OK, "OK")
    }

    /// JSON reply. A value that fails to serialize becomes a 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::new(status, bytes).with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize reply body");
                Self::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}
