//! Trigger event variants and normalization into the canonical request.
//!
//! A deployment is wired to exactly one trigger, and the two triggers ship
//! differently-shaped events:
//!
//! | Variant | Path / method live at | Extras |
//! |---|---|---|
//! | [`EventSource::FunctionUrl`] | `requestContext.http.{path,method}` | — |
//! | [`EventSource::ApiGatewayProxy`] | top-level `path` / `httpMethod` | `requestContext.identity` |
//!
//! Everything downstream of [`normalize`] is trigger-agnostic: query
//! parameters and parsed JSON body fields merge into one params mapping
//! (body fields override like-named query fields), headers ride along under
//! the reserved [`HEADERS_KEY`] entry, and a base64-encoded body is decoded
//! to raw bytes instead of being parsed.

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::request::{BASE64_KEY, HEADERS_KEY, Params, Request};

// ── EventSource ───────────────────────────────────────────────────────────────

/// Which of the two supported trigger event shapes a deployment receives.
///
/// Fixed once at [`App`](crate::App) construction. The wire names
/// (`"function_url"`, `"api_gateway_proxy"`) are accepted via `FromStr` and
/// serde, so the variant can come straight from a config file:
///
/// ```rust
/// use portico::EventSource;
///
/// let source: EventSource = "api_gateway_proxy".parse().unwrap();
/// assert_eq!(source, EventSource::ApiGatewayProxy);
/// assert!("sqs".parse::<EventSource>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// A Lambda Function URL invocation — the direct, gateway-less trigger.
    FunctionUrl,
    /// An API Gateway REST proxy integration.
    ApiGatewayProxy,
}

impl EventSource {
    /// Returns the wire name (e.g. `"function_url"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FunctionUrl => "function_url",
            Self::ApiGatewayProxy => "api_gateway_proxy",
        }
    }
}

impl FromStr for EventSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function_url" => Ok(Self::FunctionUrl),
            "api_gateway_proxy" => Ok(Self::ApiGatewayProxy),
            other => Err(Error::UnsupportedSource(other.to_owned())),
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Normalization ─────────────────────────────────────────────────────────────

/// Converts a raw trigger event into the canonical [`Request`].
///
/// Fails when the event lacks the fields the active variant requires, when a
/// JSON body does not parse to an object, or when a base64-marked body does
/// not decode. The dispatcher turns every such failure into a `500` response.
pub fn normalize(event: &Value, source: EventSource) -> Result<Request, Error> {
    match source {
        EventSource::FunctionUrl => normalize_function_url(event),
        EventSource::ApiGatewayProxy => normalize_api_gateway(event),
    }
}

fn normalize_function_url(event: &Value) -> Result<Request, Error> {
    let path = event
        .pointer("/requestContext/http/path")
        .and_then(Value::as_str)
        .ok_or(Error::MissingField("requestContext.http.path"))?
        .to_owned();
    let method = event
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .ok_or(Error::MissingField("requestContext.http.method"))?
        .to_owned();

    let params = aggregate_params(event)?;
    Ok(Request::new(path, method, params, None))
}

fn normalize_api_gateway(event: &Value) -> Result<Request, Error> {
    let path = event
        .get("path")
        .and_then(Value::as_str)
        .ok_or(Error::MissingField("path"))?
        .to_owned();
    let method = event
        .get("httpMethod")
        .and_then(Value::as_str)
        .ok_or(Error::MissingField("httpMethod"))?
        .to_owned();
    let identity = event
        .pointer("/requestContext/identity")
        .and_then(Value::as_object)
        .cloned();

    let params = aggregate_params(event)?;
    Ok(Request::new(path, method, params, identity))
}

/// Builds the merged params mapping shared by both variants.
///
/// Query params seed the mapping; a JSON body's fields override like-named
/// query fields; the headers always land under [`HEADERS_KEY`]. A base64
/// body is decoded, never parsed, and marked with [`BASE64_KEY`].
fn aggregate_params(event: &Value) -> Result<Params, Error> {
    let mut fields = object_field(event, "queryStringParameters");
    let headers = object_field(event, "headers");
    let is_base64 = event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut file = None;
    match event.get("body") {
        Some(Value::String(text)) if !text.is_empty() => {
            if is_base64 {
                file = Some(Bytes::from(STANDARD.decode(text)?));
                fields.insert(BASE64_KEY.to_owned(), Value::Bool(true));
            } else {
                match serde_json::from_str::<Value>(text)? {
                    Value::Object(body) => fields.extend(body),
                    other => return Err(Error::BodyShape(json_type(&other))),
                }
            }
        }
        // Hosts and test harnesses sometimes deliver the body pre-parsed.
        Some(Value::Object(body)) => fields.extend(body.clone()),
        Some(Value::Null) | Some(Value::String(_)) | None => {}
        Some(other) => return Err(Error::BodyShape(json_type(other))),
    }

    fields.insert(HEADERS_KEY.to_owned(), Value::Object(headers));
    Ok(Params::new(fields, file))
}

/// Null-tolerant object extraction: absent or `null` both mean "empty".
fn object_field(event: &Value, key: &str) -> Map<String, Value> {
    event
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
