//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! Middleware must wrap handlers of *different* concrete types behind one
//! interface, so handlers live behind **trait objects** (`dyn Handler`) and
//! are shared as `BoxedHandler = Arc<dyn Handler>`.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! fn hello(w, req) -> BoxFuture<'_> { … }          ← user writes this
//!        ↓ handler_fn(hello)
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn Handler>
//! handler.call(w, req)  at request time            ← one vtable dispatch
//! ```
//!
//! The only runtime cost per request is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible compared to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseSink;

/// A heap-allocated, type-erased future borrowing the request and sink for
/// the duration of one call.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send` lets tokio move the future across threads safely.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// The minimal request-processing capability: read the request, write to the
/// response sink.
///
/// Every middleware both consumes and produces a `Handler`. Implement it
/// directly on a struct when the handler carries state; for a plain function
/// use [`handler_fn`].
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, sink: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a>;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives us cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Wraps a plain function in a [`BoxedHandler`].
///
/// The function borrows the sink and request for one call and returns a
/// boxed future, mirroring hyper's `service_fn`:
///
/// ```rust
/// use joist::{handler_fn, BoxFuture, Request, ResponseSink};
///
/// fn hello<'a>(w: &'a mut dyn ResponseSink, _req: &'a mut Request) -> BoxFuture<'a> {
///     Box::pin(async move {
///         w.write(b"hello");
///     })
/// }
///
/// let handler = handler_fn(hello);
/// ```
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: for<'a> Fn(&'a mut dyn ResponseSink, &'a mut Request) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnHandler(f))
}

/// Newtype wrapper that holds a concrete function `F` and implements
/// [`Handler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut dyn ResponseSink, &'a mut Request) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(&'a self, sink: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
        (self.0)(sink, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::response::Response;
    use http::{Method, StatusCode, Uri};

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"), http::HeaderMap::new(), Body::empty())
    }

    fn echo_path<'a>(w: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(async move {
            let path = req.path().to_owned();
            w.write(path.as_bytes());
        })
    }

    #[tokio::test]
    async fn function_handlers_dispatch_through_erasure() {
        let handler = handler_fn(echo_path);
        let mut req = request();
        let mut resp = Response::new();

        handler.call(&mut resp, &mut req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.body(), b"/");
    }
}
