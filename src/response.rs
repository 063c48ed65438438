//! Response sink capability and the buffered implementation behind it.
//!
//! Handlers and middleware never hold a concrete response type — they write
//! through [`ResponseSink`], which is what lets the logging middleware slip
//! a status-observing decorator between a handler and the real sink without
//! either side noticing.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

// ── ResponseSink ──────────────────────────────────────────────────────────────

/// Write half of a request: status, headers, body.
///
/// All operations are synchronous relative to the request task. Status
/// follows `WriteHeader` semantics: the first assignment wins, whether it
/// arrives explicitly through [`set_status`](Self::set_status) or implicitly
/// as `200 OK` on the first [`write`](Self::write).
pub trait ResponseSink: Send {
    /// Sets the response status. Ignored once a status is already fixed.
    fn set_status(&mut self, status: StatusCode);

    /// Sets a response header, replacing any previous value for the name.
    fn insert_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Appends a chunk to the response body. The first write fixes the
    /// status at `200 OK` if none was set.
    fn write(&mut self, chunk: &[u8]);
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The buffered [`ResponseSink`] the server hands to the outermost handler.
///
/// Collects status, headers, and body in memory, then converts into the
/// `http::Response` hyper writes to the wire. A response nobody touched
/// flushes as `200 OK` with an empty body — the transport default.
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl Response {
    pub fn new() -> Self {
        Self { status: None, headers: HeaderMap::new(), body: BytesMut::new() }
    }

    /// The status this response will be sent with.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts into the response hyper serializes.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for Response {
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}
