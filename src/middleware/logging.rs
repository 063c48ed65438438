//! Request logging middleware with response-status observation.

use std::sync::Arc;
use std::time::Instant;

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use tracing::{debug, info};

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseSink;

/// Logs one debug event as a request comes in and one info event once the
/// inner handler has returned, carrying method, path, observed status, and
/// elapsed wall-clock time.
///
/// The status is observed through a decorator over the response sink that
/// records the first status transition: an explicit `set_status`, or an
/// implicit `200` on the first body write. A handler that produces no output
/// at all is logged with the transport default, `200`.
///
/// Panics in the inner handler propagate unmodified; the completion event is
/// not emitted in that case.
///
/// Events go through the global `tracing` dispatcher. Install it once at
/// startup (see [`logging::init`](crate::logging::init)) before serving
/// traffic.
pub struct Logging;

impl Logging {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Logging {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(LoggingHandler { next })
    }
}

struct LoggingHandler {
    next: BoxedHandler,
}

impl Handler for LoggingHandler {
    fn call<'a>(&'a self, sink: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();

            debug!(method = %req.method(), path = req.path(), "handling request");

            let mut observed = StatusCapture::new(sink);
            self.next.call(&mut observed, &mut *req).await;

            let elapsed = start.elapsed();
            let status = observed.status().unwrap_or(StatusCode::OK);

            info!(
                method = %req.method(),
                path = req.path(),
                status = status.as_u16(),
                duration_ms = elapsed.as_millis() as u64,
                "request complete"
            );
        })
    }
}

// ── StatusCapture ─────────────────────────────────────────────────────────────

/// Decorator over a [`ResponseSink`] that records the first status
/// transition while forwarding every call untouched.
///
/// One is allocated per request and dropped when the log event has been
/// emitted; nothing is shared across requests.
struct StatusCapture<'a> {
    inner: &'a mut dyn ResponseSink,
    status: Option<StatusCode>,
}

impl<'a> StatusCapture<'a> {
    fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self { inner, status: None }
    }

    /// The first status set, if any. `None` means the handler neither set a
    /// status nor wrote a body.
    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl ResponseSink for StatusCapture<'_> {
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
        self.inner.set_status(status);
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.insert_header(name, value);
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.inner.write(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Mutex;

    use crate::body::Body;
    use crate::handler::handler_fn;
    use crate::response::Response;
    use http::{Method, Uri};
    use tracing_subscriber::fmt::MakeWriter;

    /// Cloneable writer collecting formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn request(path: &'static str) -> Request {
        Request::new(Method::GET, Uri::from_static(path), http::HeaderMap::new(), Body::empty())
    }

    /// Runs `handler` under a scoped subscriber writing into the returned
    /// buffer, and returns the buffered response alongside the log output.
    fn run_logged(handler: BoxedHandler, path: &'static str) -> (Response, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let resp = tracing::subscriber::with_default(subscriber, || {
            rt.block_on(async {
                let mut req = request(path);
                let mut resp = Response::new();
                handler.call(&mut resp, &mut req).await;
                resp
            })
        });

        (resp, buffer.contents())
    }

    fn logged(
        handler: for<'a> fn(&'a mut dyn ResponseSink, &'a mut Request) -> BoxFuture<'a>,
    ) -> BoxedHandler {
        Logging::new().wrap(handler_fn(handler))
    }

    #[test]
    fn implicit_status_is_logged_as_200() {
        fn write_only<'a>(w: &'a mut dyn ResponseSink, _: &'a mut Request) -> BoxFuture<'a> {
            Box::pin(async move { w.write(b"hello") })
        }

        let (resp, log) = run_logged(logged(write_only), "/items");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(log.contains("handling request"), "missing debug event: {log}");
        assert!(log.contains("request complete"), "missing info event: {log}");
        assert!(log.contains("200"), "expected status 200 in: {log}");
        assert!(log.contains("/items"));
    }

    #[test]
    fn explicit_status_is_logged() {
        fn not_found<'a>(w: &'a mut dyn ResponseSink, _: &'a mut Request) -> BoxFuture<'a> {
            Box::pin(async move {
                w.set_status(StatusCode::NOT_FOUND);
                w.write(b"no such thing");
            })
        }

        let (resp, log) = run_logged(logged(not_found), "/missing");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(log.contains("404"), "expected status 404 in: {log}");
    }

    #[test]
    fn silent_handler_still_gets_completion_event() {
        fn silent<'a>(_: &'a mut dyn ResponseSink, _: &'a mut Request) -> BoxFuture<'a> {
            Box::pin(async move {})
        }

        let (resp, log) = run_logged(logged(silent), "/quiet");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(log.contains("request complete"));
        assert!(log.contains("200"));
    }

    #[test]
    fn handler_panic_propagates_without_completion_event() {
        fn boom<'a>(_: &'a mut dyn ResponseSink, _: &'a mut Request) -> BoxFuture<'a> {
            Box::pin(async move { panic!("handler blew up") })
        }

        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();

        let handler = logged(boom);
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = tracing::subscriber::with_default(subscriber, || {
            catch_unwind(AssertUnwindSafe(|| {
                rt.block_on(async {
                    let mut req = request("/boom");
                    let mut resp = Response::new();
                    handler.call(&mut resp, &mut req).await;
                })
            }))
        });

        assert!(result.is_err(), "panic must propagate");
        let log = buffer.contents();
        assert!(log.contains("handling request"));
        assert!(!log.contains("request complete"), "no after-event on panic: {log}");
    }

    #[test]
    fn capture_records_first_explicit_status() {
        let mut resp = Response::new();
        let mut capture = StatusCapture::new(&mut resp);
        capture.set_status(StatusCode::FORBIDDEN);
        capture.set_status(StatusCode::OK);
        assert_eq!(capture.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn capture_forwards_all_calls() {
        let mut resp = Response::new();
        let mut capture = StatusCapture::new(&mut resp);
        capture.set_status(StatusCode::CREATED);
        capture.insert_header(
            http::header::LOCATION,
            HeaderValue::from_static("/items/1"),
        );
        capture.write(b"created");

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get(http::header::LOCATION).unwrap(), "/items/1");
        assert_eq!(resp.body(), b"created");
    }

    #[test]
    fn capture_defaults_to_200_on_write() {
        let mut resp = Response::new();
        let mut capture = StatusCapture::new(&mut resp);
        assert_eq!(capture.status(), None);
        capture.write(b"x");
        assert_eq!(capture.status(), Some(StatusCode::OK));
    }
}
