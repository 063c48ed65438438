//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! # Timeout mapping
//!
//! hyper has no direct equivalents of `http.Server`-style read/write/idle
//! timeouts, so [`Settings`] maps onto the knobs it does have:
//!
//! - `read_timeout` → http1 header-read timeout (which also bounds how long
//!   an idle http1 keep-alive connection may sit waiting for its next
//!   request)
//! - `write_timeout` → a per-request deadline around handler dispatch; a
//!   request that exceeds it gets no response and the connection is closed
//! - `idle_timeout` → http2 keep-alive ping interval

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::body::Body;
use crate::config::Settings;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Configures a server from validated [`Settings`]. Nothing binds until
    /// [`serve`](Server::serve) is called.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Starts accepting connections and dispatching them through `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: BoxedHandler) -> Result<(), Error> {
        let addr = self.settings.socket_addr();
        let listener = TcpListener::bind(addr).await?;

        info!(
            addr = %addr,
            environment = %self.settings.environment,
            "joist listening"
        );

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        // Pin the shutdown future so we can poll it in a loop.
        // Futures in Rust must not move in memory after the first poll — that
        // is what `Pin` enforces. `tokio::pin!` pins the future on the stack.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom instead of
                // randomly. We check shutdown first so a SIGTERM immediately
                // stops accepting new connections, even if more are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let settings = self.settings.clone();
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper
                    // IO traits.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // `service_fn` turns a plain async function into a
                        // hyper `Service`. The closure is called once per
                        // request on the connection, not once per connection.
                        let write_timeout = settings.write_timeout;
                        let svc = service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            async move {
                                match tokio::time::timeout(write_timeout, dispatch(handler, req)).await {
                                    Ok(response) => Ok::<_, Error>(response),
                                    Err(_) => Err(Error::Deadline),
                                }
                            }
                        });

                        // `auto::Builder` transparently handles both HTTP/1.1
                        // and HTTP/2 — whatever the client negotiates.
                        let mut conn = ConnBuilder::new(TokioExecutor::new());
                        conn.http1()
                            .timer(TokioTimer::new())
                            .header_read_timeout(settings.read_timeout);
                        conn.http2()
                            .timer(TokioTimer::new())
                            .keep_alive_interval(settings.idle_timeout);

                        if let Err(e) = conn.serve_connection(io, svc).await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("joist stopped");
        Ok(())
    }
}

/// Runs `handler` with `settings`, blocking until graceful shutdown.
///
/// The one-call entry point for services that need nothing beyond
/// bind-serve-drain:
///
/// ```rust,no_run
/// use joist::{handler_fn, logging, middleware::{Logging, Stack}, BoxFuture, Middleware, Request, ResponseSink, Settings};
///
/// # fn app<'a>(w: &'a mut dyn ResponseSink, _req: &'a mut Request) -> BoxFuture<'a> {
/// #     Box::pin(async move { w.write(b"ok") })
/// # }
/// #[tokio::main]
/// async fn main() -> Result<(), joist::Error> {
///     let settings = Settings::from_env()?;
///     logging::init(&settings);
///
///     let stack = Stack::new().layer(Logging::new());
///     joist::run(stack.wrap(handler_fn(app)), settings).await
/// }
/// ```
pub async fn run(handler: BoxedHandler, settings: Settings) -> Result<(), Error> {
    Server::new(settings).serve(handler).await
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: runs one request through the handler chain and produces
/// the response hyper writes out.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
) -> http::Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let request = Request::new(parts.method, parts.uri, parts.headers, Body::from(body));
    respond(handler, request).await
}

async fn respond(handler: BoxedHandler, mut request: Request) -> http::Response<Full<Bytes>> {
    let mut response = Response::new();
    handler.call(&mut response, &mut request).await;
    response.into_http()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` is a future that never resolves — on non-Unix platforms
    // the SIGTERM arm is effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
