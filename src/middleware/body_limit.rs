//! Request-body size limiting middleware.

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseSink;

/// Ceiling substituted when the limiter is constructed with `0`.
pub const DEFAULT_MAX_BYTES: u64 = 1_048_576;

/// Caps how much request body the inner handler may read.
///
/// The cap is installed on the request's [`Body`](crate::Body) before
/// delegation; enforcement is lazy, happening only as the handler reads.
/// A read that would cross the ceiling fails with
/// [`BodyError::TooLarge`](crate::BodyError) — an error value returned to
/// the reader, not an HTTP response. Mapping it to a client-visible status
/// (conventionally `413`) is the inner handler's call:
///
/// ```rust
/// use joist::{BodyError, BoxFuture, Request, ResponseSink};
/// use http::StatusCode;
///
/// fn upload<'a>(w: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
///     Box::pin(async move {
///         match req.body_mut().read_to_end().await {
///             Ok(body) => w.write(&body),
///             Err(BodyError::TooLarge) => w.set_status(StatusCode::PAYLOAD_TOO_LARGE),
///             Err(_) => w.set_status(StatusCode::BAD_REQUEST),
///         }
///     })
/// }
/// ```
pub struct BodyLimit {
    max_bytes: u64,
}

impl BodyLimit {
    /// A limiter allowing at most `max_bytes` of body. `0` substitutes the
    /// 1 MiB default.
    pub fn new(max_bytes: u64) -> Self {
        let max_bytes = if max_bytes == 0 { DEFAULT_MAX_BYTES } else { max_bytes };
        Self { max_bytes }
    }
}

impl Middleware for BodyLimit {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(BodyLimitHandler { max_bytes: self.max_bytes, next })
    }
}

struct BodyLimitHandler {
    max_bytes: u64,
    next: BoxedHandler,
}

impl Handler for BodyLimitHandler {
    fn call<'a>(&'a self, sink: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
        req.body_mut().limit(self.max_bytes);
        self.next.call(sink, req)
    }
}
