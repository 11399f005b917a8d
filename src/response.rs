//! Outgoing response type, the [`IntoResponse`] conversion trait, and
//! envelope encoding.
//!
//! Build a [`Response`] in your handler and return it — or return a raw
//! value (`&str`, `String`, `serde_json::Value`, a map, a `Result`) and let
//! [`IntoResponse`] wrap it. A `Response`, once produced by any stage, is
//! terminal: no later middleware and no handler runs after it.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::event::EventSource;
use crate::status::Status;

/// Body substituted when a response reaches the encoder with nothing to say.
const GENERIC_FAILURE: &str = "Unable To Process Request";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use portico::{Response, Status};
/// use serde_json::json;
///
/// Response::ok(json!({ "id": 1 }));
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use portico::{Response, Status};
/// use serde_json::json;
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/users/42")
///     .body(json!({ "id": 42 }));
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) body: Value,
    pub(crate) headers: Option<Map<String, Value>>,
    pub(crate) is_base64: bool,
}

impl Response {
    /// `200 OK` with a structured body.
    pub fn ok(body: impl Into<Value>) -> Self {
        Self { status: Status::Ok.into(), body: body.into(), headers: None, is_base64: false }
    }

    /// `200 OK` with a plain string body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok(Value::String(body.into()))
    }

    /// Response with the given status and an empty body.
    pub fn status(code: Status) -> Self {
        Self {
            status: code.into(),
            body: Value::String(String::new()),
            headers: None,
            is_base64: false,
        }
    }

    /// Builder for responses that need a custom status, headers, or the
    /// base64 marker.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: Status::Ok.into(), headers: None, is_base64: false }
    }

    /// `500` carrying the stringified failure: `{"error": "<message>"}`.
    ///
    /// This is the shape every request-scoped failure collapses into at the
    /// dispatch boundary.
    pub fn from_error(err: impl std::fmt::Display) -> Self {
        Self {
            status: Status::InternalServerError.into(),
            body: json!({ "error": err.to_string() }),
            headers: None,
            is_base64: false,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self {
            status: Status::NotFound.into(),
            body: Value::String("Route Not Found".to_owned()),
            headers: None,
            is_base64: false,
        }
    }

    pub(crate) fn method_not_allowed() -> Self {
        Self {
            status: Status::MethodNotAllowed.into(),
            body: Value::String("Method Not Allowed".to_owned()),
            headers: None,
            is_base64: false,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.headers.as_ref()
    }

    /// Whether the body is base64-encoded content.
    pub fn is_base64(&self) -> bool {
        self.is_base64
    }

    /// Shapes this response into the envelope the given trigger expects.
    ///
    /// API Gateway requires `body` to be a string: a structured body is
    /// serialized to its compact JSON text, a string body passes through
    /// unchanged. A Function URL envelope carries the body as-is — the host
    /// serializes the whole envelope itself. A `null` body is replaced by a
    /// generic failure message so the envelope is never incomplete.
    pub(crate) fn into_envelope(self, source: EventSource) -> Value {
        let body = match self.body {
            Value::Null => Value::String(GENERIC_FAILURE.to_owned()),
            body => body,
        };
        let body = match source {
            EventSource::ApiGatewayProxy => match body {
                Value::String(s) => Value::String(s),
                structured => Value::String(structured.to_string()),
            },
            EventSource::FunctionUrl => body,
        };
        json!({ "statusCode": self.status, "body": body })
    }
}

/// The generic failure placeholder: `500` with a `null` body, which the
/// encoder renders as `"Unable To Process Request"`.
impl Default for Response {
    fn default() -> Self {
        Self {
            status: Status::InternalServerError.into(),
            body: Value::Null,
            headers: None,
            is_base64: false,
        }
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by [`body`](ResponseBuilder::body) or
/// [`no_body`](ResponseBuilder::no_body).
pub struct ResponseBuilder {
    status: u16,
    headers: Option<Map<String, Value>>,
    is_base64: bool,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    /// Sets a raw numeric status for codes [`Status`] does not name.
    pub fn status_code(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(Map::new)
            .insert(name.to_owned(), value.into());
        self
    }

    /// Marks the body as base64-encoded content.
    pub fn base64(mut self, encoded: bool) -> Self {
        self.is_base64 = encoded;
        self
    }

    /// Terminates with the given body.
    pub fn body(self, body: impl Into<Value>) -> Response {
        Response {
            status: self.status,
            body: body.into(),
            headers: self.headers,
            is_base64: self.is_base64,
        }
    }

    /// Terminates with an empty body.
    pub fn no_body(self) -> Response {
        self.body(Value::String(String::new()))
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into a [`Response`].
///
/// A raw (non-`Response`) handler return value wraps as **status 200 with the
/// value as body** — that default is part of this module's contract and is
/// pinned by tests. `Err` values wrap as the standard `500`
/// `{"error": "<message>"}` shape.
///
/// Implement on your own types to return them directly from handlers:
///
/// ```rust
/// use portico::{IntoResponse, Response};
/// use serde_json::json;
///
/// struct User { id: u64, name: String }
///
/// impl IntoResponse for User {
///     fn into_response(self) -> Response {
///         Response::ok(json!({ "id": self.id, "name": self.name }))
///     }
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> Response {
        Response::ok(self)
    }
}

impl IntoResponse for Map<String, Value> {
    fn into_response(self) -> Response {
        Response::ok(Value::Object(self))
    }
}

impl IntoResponse for HashMap<String, Value> {
    fn into_response(self) -> Response {
        Response::ok(Value::Object(self.into_iter().collect()))
    }
}

/// Return a [`Status`] directly from a handler: `return Status::NoContent`.
impl IntoResponse for Status {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

/// Fallible handlers: `Ok` converts through its own `IntoResponse`, `Err`
/// becomes the boundary `500` shape.
impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: std::fmt::Display,
{
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => Response::from_error(err),
        }
    }
}
