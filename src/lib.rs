//! # portico
//!
//! A minimal request framework for AWS Lambda HTTP events.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The Lambda platform handles transport, TLS, scaling, throttling, and
//! invocation timeouts. portico does not. The host does host things. The
//! framework does framework things. Every feature portico skips is one the
//! platform already ships, tested at scale, at no cost to you.
//!
//! What the platform already owns — portico intentionally ignores:
//!
//! - **Transport** — the runtime delivers each event already parsed
//! - **Concurrency** — one invocation, one event, isolated by the host
//! - **Timeouts / retries** — invocation lifecycle belongs to the platform
//! - **TLS / throttling** — API Gateway and Function URL configuration
//!
//! What's left for portico — the only part that changes between functions:
//!
//! - Normalizing the two trigger event shapes into one request model
//! - Path + method routing with `{name}` parameters via [`matchit`]
//! - An ordered middleware chain with short-circuit responses
//! - Encoding every outcome into the envelope the active trigger expects
//!
//! ## Quick start
//!
//! ```rust
//! use portico::{App, EventSource, Method, Params, Response};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut app = App::new(EventSource::ApiGatewayProxy);
//! app.route("/hello").on(Method::Get, hello);
//!
//! // Inside your Lambda entry point, hand the raw event over:
//! let event = json!({
//!     "path": "/hello",
//!     "httpMethod": "GET",
//!     "queryStringParameters": { "name": "alice" },
//! });
//! let envelope = app.handle(event).await;
//! assert_eq!(envelope["statusCode"], 200);
//! # }
//!
//! async fn hello(params: Params) -> Response {
//!     let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("world");
//!     Response::ok(json!({ "greeting": format!("hi {name}") }))
//! }
//! ```

mod app;
mod error;
mod event;
mod handler;
mod method;
mod middleware;
mod request;
mod response;
mod router;
mod status;

pub use app::App;
pub use error::Error;
pub use event::{EventSource, normalize};
pub use handler::{Handler, MethodHandler};
pub use method::Method;
pub use middleware::{Flow, Middleware};
pub use request::{BASE64_KEY, HEADERS_KEY, Params, Request};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Route, Router};
pub use status::Status;
