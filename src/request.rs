//! The canonical request model.
//!
//! Both trigger variants normalize into the same two types: [`Request`],
//! carrying path, method, and host-supplied identity, and [`Params`] — the
//! single merged mapping middleware and handlers actually work with.

use bytes::Bytes;
use serde_json::{Map, Value};

/// Reserved key under which the request headers are attached to [`Params`].
pub const HEADERS_KEY: &str = "headers";

/// Marker field set in [`Params`] when the request body was base64-encoded.
pub const BASE64_KEY: &str = "base64";

// ── Params ────────────────────────────────────────────────────────────────────

/// The merged parameter mapping handed to middleware and handlers.
///
/// Keys are unique. Query-string parameters come first, fields of a JSON
/// request body override like-named query fields, path parameters from
/// `{name}` route segments override both, and the request headers always sit
/// under the reserved [`HEADERS_KEY`] entry.
///
/// A base64-encoded body is not merged field-by-field: the decoded bytes are
/// carried in [`Params::file`] and the [`BASE64_KEY`] marker is set instead.
///
/// Middleware receives `Params` by value and hands back the mapping for the
/// next stage — there is no shared mutation.
#[derive(Clone, Debug, Default)]
pub struct Params {
    fields: Map<String, Value>,
    file: Option<Bytes>,
}

impl Params {
    pub(crate) fn new(fields: Map<String, Value>, file: Option<Bytes>) -> Self {
        Self { fields, file }
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Inserts a field, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Removes a field, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// The request headers, as attached under [`HEADERS_KEY`].
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.fields.get(HEADERS_KEY).and_then(Value::as_object)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_str())
    }

    /// The decoded body bytes of a base64-encoded request.
    pub fn file(&self) -> Option<&Bytes> {
        self.file.as_ref()
    }

    /// Whether the request body arrived base64-encoded.
    pub fn is_base64(&self) -> bool {
        self.file.is_some()
    }

    /// Read access to the whole mapping.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// A normalized, trigger-agnostic incoming request.
///
/// Built by [`normalize`](crate::normalize) from a raw trigger event. The
/// dispatcher consumes it for routing; the middleware chain and the handler
/// only ever see its [`Params`].
#[derive(Clone, Debug)]
pub struct Request {
    path: String,
    method: String,
    params: Params,
    identity: Option<Map<String, Value>>,
}

impl Request {
    pub(crate) fn new(
        path: String,
        method: String,
        params: Params,
        identity: Option<Map<String, Value>>,
    ) -> Self {
        Self { path, method, params, identity }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The method string exactly as the event carried it. The dispatcher
    /// uppercases it before method lookup.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Identity fields supplied by the host, when the trigger provides them.
    pub fn identity(&self) -> Option<&Map<String, Value>> {
        self.identity.as_ref()
    }

    pub(crate) fn into_params(self) -> Params {
        self.params
    }
}
