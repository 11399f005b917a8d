//! Unified error type.
//!
//! Application-level outcomes (404, 405) are expressed as
//! [`Response`](crate::Response) values, not as `Error`s. This type surfaces
//! the failures that cross the dispatch boundary: a raw event that cannot be
//! normalized into a request, and a middleware that fails outright instead of
//! answering with a response. The dispatcher recovers every one of them in a
//! single place and turns it into a `500` response carrying the message.
//!
//! Configuration mistakes — an invalid route template, middleware attached to
//! a method with no handler — are programmer errors and panic at registration
//! time, before the first event is served.

/// The error type returned by portico's fallible operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured source is not one of the supported trigger variants.
    #[error("event source `{0}` is not supported")]
    UnsupportedSource(String),

    /// The raw event lacks a field the active source variant requires.
    #[error("event is missing `{0}`")]
    MissingField(&'static str),

    /// The request body claimed to be JSON but did not parse.
    #[error("request body is not valid JSON: {0}")]
    BodyParse(#[from] serde_json::Error),

    /// The request body parsed, but not into an object that can merge into
    /// the params mapping.
    #[error("request body must be a JSON object, got {0}")]
    BodyShape(&'static str),

    /// The body was marked base64-encoded but did not decode.
    #[error("request body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A middleware failed while processing the request.
    #[error("{0}")]
    Middleware(String),
}

impl Error {
    /// Wraps an arbitrary failure message from a middleware.
    pub fn middleware(message: impl Into<String>) -> Self {
        Self::Middleware(message.into())
    }
}
