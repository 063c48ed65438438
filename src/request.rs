//! Incoming HTTP request type.

use http::{HeaderMap, Method, Uri};

use crate::body::Body;

/// An incoming HTTP request.
///
/// The server builds one per request from the hyper connection; tests build
/// them directly via [`Request::new`].
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Body) -> Self {
        Self { method, uri, headers, body }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup, skipping non-UTF-8 values.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the body — reading consumes it.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
