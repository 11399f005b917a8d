//! The application dispatcher.
//!
//! [`App`] replaces the accept-loop of a conventional server: the Lambda host
//! owns transport, concurrency, and lifecycle, and hands over one parsed
//! event per invocation. [`App::handle`] runs the whole pipeline — normalize,
//! route, chain, encode — and always returns a well-formed envelope, whatever
//! went wrong on the way.
//!
//! Configure the app once at cold start, then share it immutably: `handle`
//! takes `&self`, so concurrent invocations need no locking.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::Error;
use crate::event::{self, EventSource};
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::Middleware;
use crate::response::Response;
use crate::router::{Route, Router};

/// The top-level orchestrator: one configured event source, one route table.
///
/// Multiple independently configured `App`s can coexist in one process —
/// nothing here is global state.
///
/// ```rust
/// use portico::{App, EventSource, Method, Params, Response};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut app = App::new(EventSource::ApiGatewayProxy);
/// app.route("/hello").on(Method::Get, hello);
///
/// // Inside your Lambda entry point:
/// let envelope = app
///     .handle(json!({ "path": "/hello", "httpMethod": "GET" }))
///     .await;
/// assert_eq!(envelope["statusCode"], 200);
/// # }
///
/// async fn hello(_params: Params) -> Response {
///     Response::text("hi")
/// }
/// ```
pub struct App {
    source: EventSource,
    router: Router,
    log_requests: bool,
    log_responses: bool,
}

impl App {
    /// An app wired to the given trigger variant, with request and response
    /// logging enabled.
    pub fn new(source: EventSource) -> Self {
        Self {
            source,
            router: Router::new(),
            log_requests: true,
            log_responses: true,
        }
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn with_response_logging(mut self, enabled: bool) -> Self {
        self.log_responses = enabled;
        self
    }

    /// The trigger variant this app was configured for.
    pub fn source(&self) -> EventSource {
        self.source
    }

    /// Returns the route for `path`, creating it (GET-only) if unknown.
    /// See [`Router::route`].
    pub fn route(&mut self, path: &str) -> &mut Route {
        self.router.route(path)
    }

    /// Returns the route for `path`, creating it with the given method set if
    /// unknown. See [`Router::route_with`].
    pub fn route_with(&mut self, path: &str, methods: &[Method]) -> &mut Route {
        self.router.route_with(path, methods)
    }

    /// Read access to the route table, for introspection.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Declarative registration: binds `handler` to every listed method on
    /// `path` and attaches the shared middleware chain to each, in order.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use portico::{App, EventSource, Flow, Method, Middleware, Params, Response};
    ///
    /// # struct Trace;
    /// # impl Middleware for Trace {
    /// #     fn process_request(&self, params: Params) -> Result<Flow, portico::Error> {
    /// #         Ok(Flow::Continue(params))
    /// #     }
    /// # }
    /// # async fn upsert(_params: Params) -> Response { Response::text("") }
    /// let mut app = App::new(EventSource::FunctionUrl);
    /// let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(Trace)];
    /// app.register("/items", &[Method::Put, Method::Post], chain, upsert);
    /// ```
    pub fn register(
        &mut self,
        path: &str,
        methods: &[Method],
        middlewares: Vec<Arc<dyn Middleware>>,
        handler: impl Handler,
    ) -> &mut Self {
        let handler = handler.into_boxed_handler();
        let route = self.router.route_with(path, methods);
        for &method in methods {
            route.bind(method, Arc::clone(&handler));
            for middleware in &middlewares {
                route.attach(method, Arc::clone(middleware));
            }
        }
        self
    }

    /// Runs one event through the full pipeline and returns the envelope for
    /// the configured trigger.
    ///
    /// Every internal outcome — success, 404, 405, or a failure recovered at
    /// this boundary — funnels through the same encoder, so the output is
    /// always well-formed. Nothing is retried.
    pub async fn handle(&self, event: Value) -> Value {
        let response = match self.dispatch(&event).await {
            Ok(response) => response,
            // The sole recovery point: normalization, middleware, and
            // handler failures all collapse to the 500 error shape here.
            Err(err) => Response::from_error(&err),
        };

        if self.log_responses {
            info!(status = response.status_code(), body = ?response.body(), "response");
        }
        response.into_envelope(self.source)
    }

    async fn dispatch(&self, event: &Value) -> Result<Response, Error> {
        let request = event::normalize(event, self.source)?;

        if self.log_requests {
            info!(
                method = %request.method(),
                path = %request.path(),
                params = ?request.params(),
                "request"
            );
        }

        let Some((route, path_params)) = self.router.lookup(request.path()) else {
            return Ok(Response::not_found());
        };

        let method = request.method().to_ascii_uppercase();
        let mut params = request.into_params();
        for (name, value) in path_params {
            params.insert(name, Value::String(value));
        }

        route.handle_request(&method, params).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(EventSource::FunctionUrl)
    }
}
