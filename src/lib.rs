//! # joist
//!
//! Composable middleware and server scaffolding for hyper-based HTTP
//! services. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! You bring the handler — a router, a single function, anything that reads
//! a [`Request`] and writes to a [`ResponseSink`]. joist brings the parts
//! that are the same in every service and tedious to rewrite:
//!
//! - **Middleware composition** — ordered, nestable [`middleware::Stack`]s
//!   of independent units: request logging with status observation, lazy
//!   request-body size limits, response content-type stamping
//! - **Settings from the environment** — [`Settings::from_env`], validated
//!   once, read-only after
//! - **Logging setup** — [`logging::init`], debug/info level from settings,
//!   plain text locally, JSON in test/production
//! - **Serving** — [`run`], graceful shutdown on SIGTERM / Ctrl-C, drains
//!   in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use joist::middleware::{BodyLimit, Logging, SetContentType, Stack};
//! use joist::{handler_fn, logging, BoxFuture, Middleware, Request, ResponseSink, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), joist::Error> {
//!     let settings = Settings::from_env()?;
//!     logging::init(&settings);
//!
//!     let stack = Stack::new()
//!         .layer(Logging::new())
//!         .layer(BodyLimit::new(10 * 1024 * 1024))
//!         .layer(SetContentType::json());
//!
//!     joist::run(stack.wrap(handler_fn(hello)), settings).await
//! }
//!
//! fn hello<'a>(w: &'a mut dyn ResponseSink, _req: &'a mut Request) -> BoxFuture<'a> {
//!     Box::pin(async move {
//!         w.write(br#"{"message":"hello"}"#);
//!     })
//! }
//! ```
//!
//! Middleware order is the stack order: `Logging` above wraps everything,
//! so its completion event sees the status whatever sits below it produced.

mod body;
mod config;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod logging;
pub mod middleware;

pub use body::{Body, BodyError};
pub use config::{ConfigError, Environment, Settings};
pub use error::Error;
pub use handler::{handler_fn, BoxFuture, BoxedHandler, Handler};
pub use middleware::{Middleware, Stack};
pub use request::Request;
pub use response::{Response, ResponseSink};
pub use server::{run, Server};
