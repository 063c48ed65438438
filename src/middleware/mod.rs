//! Middleware layer.
//!
//! A middleware unit is a transformation from "next handler" to "wrapping
//! handler". Units are independent of one another and are combined with
//! [`Stack`], which collapses an ordered sequence into a single unit.
//!
//! # Ordering
//!
//! The first layer pushed onto a stack is the **outermost** wrapper: its
//! before-logic runs first on the way in and its after-logic runs last on
//! the way out. A stack built from `[U1, U2, U3]` around handler `H`
//! executes as:
//!
//! ```text
//! U1:before → U2:before → U3:before → H → U3:after → U2:after → U1:after
//! ```
//!
//! Units are constructed once at startup and never mutated afterwards; all
//! per-request state lives in the futures they produce.

mod body_limit;
mod content_type;
mod logging;

pub use body_limit::{BodyLimit, DEFAULT_MAX_BYTES};
pub use content_type::SetContentType;
pub use logging::Logging;

use crate::handler::BoxedHandler;

/// A middleware unit: wraps one handler to produce another.
///
/// Composition cannot fail — `wrap` has no error path. Side effects happen
/// only when the produced handler runs.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

/// An ordered stack of middleware units, itself usable as one unit.
///
/// ```rust
/// use joist::middleware::{BodyLimit, Logging, SetContentType, Stack};
///
/// let stack = Stack::new()
///     .layer(Logging::new())
///     .layer(BodyLimit::new(10 * 1024 * 1024))
///     .layer(SetContentType::json());
/// ```
///
/// Because `Stack` implements [`Middleware`], stacks nest: using a composed
/// stack as a layer of an outer stack behaves exactly like flattening the
/// two sequences.
pub struct Stack {
    layers: Vec<Box<dyn Middleware>>,
}

impl Stack {
    /// An empty stack — the identity transformation.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends a layer. Earlier layers end up outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Box::new(middleware));
        self
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Stack {
    /// Folds the layers from last to first, so the first layer wraps all
    /// the others. Zero layers return `handler` unchanged.
    fn wrap(&self, handler: BoxedHandler) -> BoxedHandler {
        let mut next = handler;
        for layer in self.layers.iter().rev() {
            next = layer.wrap(next);
        }
        next
    }
}
