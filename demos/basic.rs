//! Minimal joist example — a JSON echo service behind a full middleware
//! stack.
//!
//! Run with:
//!   VERBOSE=true PORT=3000 cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -X POST http://localhost:3000/echo -d '{"name":"alice"}'
//!   head -c 2000000 /dev/zero | curl -X POST http://localhost:3000/echo \
//!        --data-binary @-    # 413 via the body limit

use http::StatusCode;
use joist::middleware::{BodyLimit, Logging, SetContentType, Stack};
use joist::{handler_fn, logging, BodyError, BoxFuture, Middleware, Request, ResponseSink, Settings};

#[tokio::main]
async fn main() -> Result<(), joist::Error> {
    let settings = Settings::from_env()?;
    logging::init(&settings);

    // Order matters: Logging is outermost, so its completion event sees the
    // status the layers below produced — including the 413 mapped from the
    // body limit.
    let stack = Stack::new()
        .layer(Logging::new())
        .layer(BodyLimit::new(0)) // 0 → 1 MiB default
        .layer(SetContentType::json());

    joist::run(stack.wrap(handler_fn(echo)), settings).await
}

// Echoes the request body back, mapping the limiter's read error to 413.
fn echo<'a>(w: &'a mut dyn ResponseSink, req: &'a mut Request) -> BoxFuture<'a> {
    Box::pin(async move {
        match req.body_mut().read_to_end().await {
            Ok(body) if body.is_empty() => w.write(br#"{"message":"hello"}"#),
            Ok(body) => w.write(&body),
            Err(BodyError::TooLarge) => {
                w.set_status(StatusCode::PAYLOAD_TOO_LARGE);
                w.write(br#"{"error":"request body too large"}"#);
            }
            Err(_) => w.set_status(StatusCode::BAD_REQUEST),
        }
    })
}
