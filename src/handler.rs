//! Handler trait, type erasure, and per-method chain execution.
//!
//! # How async handlers are stored
//!
//! A route needs to hold handlers of *different* types in a single
//! `HashMap<Method, MethodHandler>`. Rust collections can only hold one
//! concrete type, so we use **trait objects** (`dyn ErasedHandler`) to hide
//! the concrete handler type behind a common interface and store everything
//! uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(params: Params) -> Response { … }   ← user writes this
//!        ↓ route.on(Method::Get, hello)
//! hello.into_boxed_handler()                         ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                         ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(params)  at dispatch time             ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(params).await.into_response() })  ← BoxFuture
//! ```
//!
//! The only runtime cost per invocation is **one Arc clone** (atomic inc) +
//! **one virtual call** — negligible next to the handler's own work.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::middleware::{Flow, Middleware};
use crate::request::Params;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, params: Params) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across invocations.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`. `Arc` lets
/// the declarative registration surface bind one handler to several methods
/// without copying it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(params: Params) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

/// Implement the sealing trait for any function with the right signature.
///
/// `Fn(Params) -> Fut` covers:
///   - named `async fn` items
///   - `async` closures
///   - any struct that implements `Fn`
impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature.
impl<F, Fut, R> Handler for F
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Params) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, params: Params) -> BoxFuture {
        // Call the wrapped function — this returns the concrete `Fut`.
        // We then map it to `Response` via `IntoResponse` and box the whole
        // thing so the return type matches the trait signature.
        let fut = (self.0)(params);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── MethodHandler ─────────────────────────────────────────────────────────────

/// One bound handler plus its ordered middleware chain.
///
/// Created at configuration time, once per (path, method) pair, and never
/// mutated while serving. The chain is append-only and executes in
/// registration order.
pub struct MethodHandler {
    handler: BoxedHandler,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MethodHandler {
    pub(crate) fn new(handler: BoxedHandler) -> Self {
        Self { handler, middlewares: Vec::new() }
    }

    pub(crate) fn push_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Folds `params` through the chain, then invokes the handler once.
    ///
    /// A [`Flow::Respond`] stops the chain immediately: later middleware and
    /// the handler never run. A middleware `Err` propagates untouched — the
    /// dispatch boundary is the sole recovery point.
    pub async fn execute(&self, mut params: Params) -> Result<Response, Error> {
        for middleware in &self.middlewares {
            match middleware.process_request(params)? {
                Flow::Continue(next) => params = next,
                Flow::Respond(response) => return Ok(response),
            }
        }
        Ok(self.handler.call(params).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    async fn echo(params: Params) -> Response {
        Response::ok(Value::Object(params.fields().clone()))
    }

    /// Appends its tag to the `trail` array field.
    struct Tag(&'static str);

    impl Middleware for Tag {
        fn process_request(&self, mut params: Params) -> Result<Flow, Error> {
            let trail = params.remove("trail").unwrap_or_else(|| json!([]));
            let mut trail = trail.as_array().cloned().unwrap_or_default();
            trail.push(json!(self.0));
            params.insert("trail", Value::Array(trail));
            Ok(Flow::Continue(params))
        }
    }

    struct Halt;

    impl Middleware for Halt {
        fn process_request(&self, _params: Params) -> Result<Flow, Error> {
            Ok(Flow::Respond(Response::status(crate::Status::Forbidden)))
        }
    }

    struct Fail;

    impl Middleware for Fail {
        fn process_request(&self, _params: Params) -> Result<Flow, Error> {
            Err(Error::middleware("chain failure"))
        }
    }

    fn chain(middlewares: Vec<Arc<dyn Middleware>>) -> MethodHandler {
        let mut handler = MethodHandler::new(echo.into_boxed_handler());
        for middleware in middlewares {
            handler.push_middleware(middleware);
        }
        handler
    }

    #[tokio::test]
    async fn chain_runs_in_registration_order() {
        let handler = chain(vec![Arc::new(Tag("first")), Arc::new(Tag("second"))]);
        let response = handler.execute(Params::default()).await.unwrap();
        assert_eq!(response.body()["trail"], json!(["first", "second"]));
    }

    #[tokio::test]
    async fn short_circuit_skips_rest_of_chain_and_handler() {
        // Tag("after") sits behind Halt; if the chain kept going, the echo
        // handler would answer 200 with a trail.
        let handler = chain(vec![Arc::new(Halt), Arc::new(Tag("after"))]);
        let response = handler.execute(Params::default()).await.unwrap();
        assert_eq!(response.status_code(), 403);
    }

    #[tokio::test]
    async fn middleware_error_propagates() {
        let handler = chain(vec![Arc::new(Fail), Arc::new(Tag("after"))]);
        let err = handler.execute(Params::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "chain failure");
    }

    #[tokio::test]
    async fn empty_chain_invokes_handler_directly() {
        let handler = chain(Vec::new());
        let response = handler.execute(Params::default()).await.unwrap();
        assert_eq!(response.status_code(), 200);
    }
}
