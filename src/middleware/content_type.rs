//! Response content-type middleware.

use std::sync::Arc;

use http::header::{HeaderValue, CONTENT_TYPE};

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseSink;

/// Unconditionally sets the `content-type` header before delegating.
///
/// Apply to route groups where every endpoint returns the same type, instead
/// of repeating the header in each handler. Handlers can still override it:
/// the sink keeps the last value inserted for a header name.
pub struct SetContentType {
    value: HeaderValue,
}

impl SetContentType {
    /// Middleware setting `content-type` to `value`. Any valid header value
    /// is accepted, including the empty string.
    pub fn new(value: HeaderValue) -> Self {
        Self { value }
    }

    /// Middleware setting `content-type: application/json`.
    pub fn json() -> Self {
        Self::new(HeaderValue::from_static("application/json"))
    }
}

impl Middleware for SetContentType {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(SetContentTypeHandler { value: self.value.clone(), next })
    }
}

struct SetContentTypeHandler {
    value: HeaderValue,
    next: BoxedHandler,
}

impl Handler for SetContentTypeHandler {
    fn call<'a>(&'a self, sink: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
        sink.insert_header(CONTENT_TYPE, self.value.clone());
        self.next.call(sink, req)
    }
}
